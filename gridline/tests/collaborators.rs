use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gridline::{
    ActionBoard, CellValue, Column, DataTable, Element, ExportColumn, ExportRegistrar,
    ExportRegistry, FingerprintPolicy, ModalFlag, PresentationMode, PrintDocument, PrintRequester,
    ResizeBus, Role, TableConfig, TableProps, EXPORT_ACTION_ID,
};
use serde_json::{json, Value};

fn columns() -> Vec<Column<Value>> {
    vec![
        Column::computed("Name", |r: &Value| Element::text(r["name"].as_str().unwrap_or_default()))
            .export_with(|r: &Value| CellValue::from_json(&r["name"])),
        Column::field("Email", "email"),
        Column::field("Token", "token").hide_in_export(),
    ]
}

fn rows(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "name": format!("Tenant {i}"),
                "email": format!("t{i}@x.com"),
                "token": "s3cret",
            })
        })
        .collect()
}

/// Registrar that only counts publishes.
#[derive(Default)]
struct CountingRegistrar {
    publishes: AtomicUsize,
    last_rows: AtomicUsize,
}

impl ExportRegistrar<Value> for CountingRegistrar {
    fn publish(&self, data: &[Value], _columns: &[ExportColumn<Value>], _file_name: &str) {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        self.last_rows.store(data.len(), Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakePrinter {
    document: Mutex<Option<PrintDocument>>,
    requests: AtomicUsize,
    printing: AtomicBool,
}

impl PrintRequester for FakePrinter {
    fn attach(&self, document: PrintDocument) {
        *self.document.lock().unwrap() = Some(document);
    }

    fn request_print(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.printing.store(true, Ordering::SeqCst);
    }

    fn is_printing(&self) -> bool {
        self.printing.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_publishes_once_per_fingerprint() {
    let registrar = Arc::new(CountingRegistrar::default());
    let mut table =
        DataTable::<Value>::new("t", TableConfig::default()).export_registrar(registrar.clone());
    let columns = columns();
    let now = Instant::now();

    let data = rows(3);
    let props = TableProps::new(&columns, &data).export_file_name("tenants");
    table.update(&props, now);
    table.update(&props, now);
    assert_eq!(registrar.publishes.load(Ordering::SeqCst), 1);
    assert_eq!(table.export_fingerprint(), Some("3-tenants-Name,Email,Token"));

    // Same shape, new slice: still nothing to publish.
    let refetched = rows(3);
    table.update(&TableProps::new(&columns, &refetched).export_file_name("tenants"), now);
    assert_eq!(registrar.publishes.load(Ordering::SeqCst), 1);

    let grown = rows(4);
    table.update(&TableProps::new(&columns, &grown).export_file_name("tenants"), now);
    assert_eq!(registrar.publishes.load(Ordering::SeqCst), 2);
    assert_eq!(registrar.last_rows.load(Ordering::SeqCst), 4);
}

#[test]
fn test_content_fingerprint_sees_edits() {
    let registry = Arc::new(ExportRegistry::new());
    let config = TableConfig::default().fingerprint(FingerprintPolicy::Content);
    let mut table = DataTable::<Value>::new("t", config).export_registrar(registry.clone());
    let columns = columns();
    let now = Instant::now();

    let mut data = rows(2);
    table.update(&TableProps::new(&columns, &data), now);
    data[0]["email"] = json!("changed@x.com");
    table.update(&TableProps::new(&columns, &data), now);

    assert_eq!(registry.publish_count(), 2);
    let snapshot = registry.snapshot().unwrap();
    assert_eq!(snapshot.rows[0][1], CellValue::from("changed@x.com"));
}

#[test]
fn test_loading_or_empty_never_publishes() {
    let registry = Arc::new(ExportRegistry::new());
    let mut table =
        DataTable::<Value>::new("t", TableConfig::default()).export_registrar(registry.clone());
    let columns = columns();
    let now = Instant::now();

    let data = rows(5);
    table.update(&TableProps::new(&columns, &data).loading(true), now);
    let empty: Vec<Value> = Vec::new();
    table.update(&TableProps::new(&columns, &empty), now);
    assert_eq!(registry.publish_count(), 0);
    assert!(registry.snapshot().is_none());

    table.update(&TableProps::new(&columns, &data), now);
    assert_eq!(registry.publish_count(), 1);
}

#[test]
fn test_registry_projects_and_saves_csv() {
    let registry = Arc::new(ExportRegistry::new());
    let mut table =
        DataTable::<Value>::new("t", TableConfig::default()).export_registrar(registry.clone());
    let columns = columns();
    let data = rows(2);
    table.update(
        &TableProps::new(&columns, &data).export_file_name("tenants"),
        Instant::now(),
    );

    let snapshot = registry.snapshot().unwrap();
    assert_eq!(snapshot.headers, vec!["Name", "Email"]);
    assert_eq!(snapshot.rows[1], vec![CellValue::from("Tenant 1"), CellValue::from("t1@x.com")]);

    let dir = tempfile::tempdir().unwrap();
    let path = registry.save_csv(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "tenants.csv");
    let csv = std::fs::read_to_string(path).unwrap();
    assert_eq!(csv, "Name,Email\nTenant 0,t0@x.com\nTenant 1,t1@x.com\n");
}

#[test]
fn test_save_without_publish_fails() {
    let registry = ExportRegistry::new();
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(registry.save_csv(dir.path()), Err(gridline::ExportError::Empty)));
}

#[test]
fn test_missing_collaborators_degrade_silently() {
    let mut table = DataTable::<Value>::new("t", TableConfig::default());
    let columns = columns();
    let data = rows(2);
    let props = TableProps::new(&columns, &data);

    assert!(!table.update(&props, Instant::now()));
    assert!(!table.has_toolbar_action());
    assert_eq!(table.export_fingerprint(), None);
    let view = table.view(&props);
    assert_eq!(view.find_all(Role::Row).len(), 2);
    assert!(!view.contains_role(Role::Toolbar));
}

// ============================================================================
// Toolbar action
// ============================================================================

#[test]
fn test_action_tracks_non_empty_intervals() {
    let board = Arc::new(ActionBoard::new());
    let mut table =
        DataTable::<Value>::new("t", TableConfig::default()).action_registry(board.clone());
    let columns = columns();
    let empty: Vec<Value> = Vec::new();
    let full = rows(2);
    let now = Instant::now();

    table.update(&TableProps::new(&columns, &empty), now);
    assert_eq!(board.register_count(), 0);

    table.update(&TableProps::new(&columns, &full), now);
    table.update(&TableProps::new(&columns, &full), now);
    assert_eq!(board.register_count(), 1);
    assert_eq!(board.actions()[0].1.id, EXPORT_ACTION_ID);
    assert_eq!(board.actions()[0].1.label, "Export data");

    table.update(&TableProps::new(&columns, &empty), now);
    assert_eq!(board.unregister_count(), 1);
    assert!(board.is_empty());

    table.update(&TableProps::new(&columns, &full), now);
    assert_eq!(board.register_count(), 2);
    drop(table);
    assert_eq!(board.unregister_count(), 2);
    assert!(board.is_empty());
}

#[test]
fn test_action_opens_modal_and_steps_aside() {
    let board = Arc::new(ActionBoard::new());
    let modal = ModalFlag::new();
    let mut table = DataTable::<Value>::new("t", TableConfig::default())
        .action_registry(board.clone())
        .modal_flag(modal.clone());
    let columns = columns();
    let data = rows(1);
    let props = TableProps::new(&columns, &data);
    let now = Instant::now();

    table.update(&props, now);
    assert!(board.trigger(EXPORT_ACTION_ID));
    assert!(modal.is_open());

    table.update(&props, now);
    assert!(!table.has_toolbar_action());
    assert!(board.is_empty());

    modal.close();
    table.update(&props, now);
    assert!(table.has_toolbar_action());
    assert_eq!(board.register_count(), 2);
}

// ============================================================================
// Printing
// ============================================================================

#[test]
fn test_print_attaches_projection_and_resets_indicator() {
    let printer = Arc::new(FakePrinter::default());
    let config = TableConfig::default().print_reset_delay_ms(300);
    let mut table = DataTable::<Value>::new("t", config).print_requester(printer.clone());
    let columns = columns();
    let data = rows(2);
    let props = TableProps::new(&columns, &data).export_file_name("tenants");
    let start = Instant::now();

    let view = table.view(&props);
    assert_eq!(view.find("t-print").unwrap().text_content(), "[Print]");

    assert!(table.print(&props, start));
    assert!(table.is_printing());
    assert!(!table.print(&props, start));
    assert_eq!(printer.requests.load(Ordering::SeqCst), 1);

    let document = printer.document.lock().unwrap().clone().unwrap();
    assert_eq!(document.title, "tenants");
    assert_eq!(document.table.headers, vec!["Name", "Email"]);
    assert_eq!(document.table.rows.len(), 2);

    let view = table.view(&props);
    let button = view.find("t-print").unwrap();
    assert!(button.disabled);
    assert_eq!(button.text_content(), "[Printing…]");

    assert!(!table.update(&props, start + Duration::from_millis(500)));
    printer.printing.store(false, Ordering::SeqCst);
    assert!(!table.update(&props, start + Duration::from_millis(600)));
    assert!(table.update(&props, start + Duration::from_millis(900)));
    assert!(!table.is_printing());
}

#[test]
fn test_print_ignored_while_loading_or_empty() {
    let printer = Arc::new(FakePrinter::default());
    let mut table =
        DataTable::<Value>::new("t", TableConfig::default()).print_requester(printer.clone());
    let columns = columns();
    let data = rows(2);
    let empty: Vec<Value> = Vec::new();
    let now = Instant::now();

    assert!(!table.print(&TableProps::new(&columns, &data).loading(true), now));
    assert!(!table.print(&TableProps::new(&columns, &empty), now));
    assert_eq!(printer.requests.load(Ordering::SeqCst), 0);
    assert!(!table.view(&TableProps::new(&columns, &empty)).contains_role(Role::Toolbar));
}

// ============================================================================
// Viewport
// ============================================================================

#[test]
fn test_table_follows_resizes_and_unsubscribes() {
    let bus = Arc::new(ResizeBus::new(120));
    let config = TableConfig::default().breakpoint(100);
    let mut table = DataTable::<Value>::new("t", config).watch_viewport(bus.clone());
    let columns = columns();
    let data = rows(1);
    let props = TableProps::new(&columns, &data);
    let now = Instant::now();

    assert_eq!(table.mode(), PresentationMode::Expanded);
    assert!(table.view(&props).contains_role(Role::Grid));
    assert_eq!(bus.listener_count(), 1);

    bus.resize(80);
    assert_eq!(table.mode(), PresentationMode::Compact);
    assert!(table.update(&props, now));
    assert!(!table.update(&props, now));
    assert!(table.view(&props).contains_role(Role::CardList));

    bus.resize(90);
    assert!(!table.update(&props, now));

    drop(table);
    assert_eq!(bus.listener_count(), 0);
}
