use std::cell::RefCell;
use std::collections::BTreeSet;
use std::time::Instant;

use gridline::element::Content;
use gridline::{
    render, CellError, CellValue, Column, DataTable, Element, PaginationMeta, PresentationMode,
    Record, Role, TableConfig, TableEvent, TableProps,
};

#[derive(Debug, Clone)]
struct Tenant {
    name: String,
    email: String,
    plan: String,
    seats: u32,
}

impl Record for Tenant {
    fn field(&self, name: &str) -> Option<CellValue> {
        match name {
            "email" => Some(self.email.clone().into()),
            "plan" => Some(self.plan.clone().into()),
            "seats" => Some(self.seats.into()),
            _ => None,
        }
    }
}

fn tenant(name: &str, plan: &str, seats: u32) -> Tenant {
    Tenant {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        plan: plan.to_string(),
        seats,
    }
}

fn tenants() -> Vec<Tenant> {
    vec![tenant("Acme", "pro", 12), tenant("Globex", "free", 3)]
}

fn columns() -> Vec<Column<Tenant>> {
    vec![
        Column::computed("Name", |t: &Tenant| Element::text(&t.name)).sortable("name"),
        Column::field("Email", "email"),
        Column::field("Plan", "plan"),
        Column::field("Seats", "seats").fixed(6),
    ]
}

fn table(mode: PresentationMode) -> DataTable<Tenant> {
    DataTable::new("tenants", TableConfig::default()).with_mode(mode)
}

fn header_labels(view: &Element) -> BTreeSet<String> {
    view.find_all(Role::HeaderCell)
        .iter()
        .map(|cell| cell.children[0].text_content())
        .collect()
}

fn text_of(el: &Element) -> &str {
    match &el.content {
        Content::Text(text) => text,
        Content::None => "",
    }
}

// ============================================================================
// Parity
// ============================================================================

#[test]
fn test_compact_reaches_every_header_shown_in_grid() {
    let columns = columns();
    let data = tenants();

    let grid = table(PresentationMode::Expanded);
    let props = TableProps::new(&columns, &data);
    let expanded_headers = header_labels(&grid.view(&props));

    let mut cards = table(PresentationMode::Compact);
    for index in 0..data.len() {
        assert!(cards.handle(TableEvent::ToggleRow(index), &props));
    }
    let view = cards.view(&props);

    for card in view.find_all(Role::Card) {
        let mut reachable = BTreeSet::new();
        if card.contains_role(Role::CardPrimary) {
            reachable.insert(columns[0].header.clone());
        }
        if card.contains_role(Role::CardSecondary) {
            reachable.insert(columns[1].header.clone());
        }
        for detail in card.find_all(Role::CardDetail) {
            let label = text_of(&detail.children[0]).trim_end_matches(':').to_string();
            reachable.insert(label);
        }
        assert_eq!(reachable, expanded_headers);
    }
}

#[test]
fn test_both_modes_show_the_same_content() {
    let columns = columns();
    let data = tenants();
    let props = TableProps::new(&columns, &data);

    let grid = table(PresentationMode::Expanded).view(&props);
    let mut compact = table(PresentationMode::Compact);
    compact.handle(TableEvent::ToggleRow(0), &props);
    let cards = compact.view(&props);

    let row = grid.find("tenants-row-0").unwrap().text_content();
    let card = cards.find("tenants-card-0").unwrap().text_content();
    for value in ["Acme", "acme@example.com", "pro", "12"] {
        assert!(row.contains(value), "grid row is missing {value}");
        assert!(card.contains(value), "card is missing {value}");
    }
}

// ============================================================================
// Expanded grid
// ============================================================================

#[test]
fn test_grid_has_one_cell_per_column() {
    let columns = columns();
    let data = tenants();
    let view = table(PresentationMode::Expanded).view(&TableProps::new(&columns, &data));

    let rows = view.find_all(Role::Row);
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.find_all(Role::Cell).len(), columns.len());
    }
    assert!(!view.contains_role(Role::Card));
}

#[test]
fn test_header_stays_pinned_when_scrolled() {
    let columns = columns();
    let data: Vec<Tenant> = (0..20).map(|i| tenant(&format!("T{i}"), "pro", i)).collect();
    let view = table(PresentationMode::Expanded).view(&TableProps::new(&columns, &data));

    let header = view.find("tenants-header").unwrap();
    assert!(header.sticky);

    let frame = render(&view, 80);
    let visible = frame.viewport(5, 10);
    assert!(visible[0].sticky);
    assert!(visible[0].text().starts_with("Name"));
    assert!(visible[1].text().starts_with("T9"));
}

#[test]
fn test_failing_accessor_renders_placeholder() {
    let columns: Vec<Column<Tenant>> = vec![
        Column::computed("Name", |t: &Tenant| Element::text(&t.name)),
        Column::new(
            "Owner",
            gridline::Accessor::try_compute(|_: &Tenant| Err(CellError::compute("no owner"))),
        ),
        Column::computed("Region", |_: &Tenant| -> Element { panic!("region lookup failed") }),
        Column::field("Phone", "phone"),
    ];
    let data = tenants();
    let view = table(PresentationMode::Expanded).view(&TableProps::new(&columns, &data));

    let placeholders = view.find_all(Role::Placeholder);
    assert_eq!(placeholders.len(), 3 * data.len());
    assert!(placeholders.iter().all(|el| text_of(el) == "-"));
    assert!(view.find("tenants-row-1").unwrap().text_content().starts_with("Globex"));
}

#[test]
fn test_column_class_is_applied_to_cells() {
    let columns = vec![
        Column::computed("Name", |t: &Tenant| Element::text(&t.name)).class("name-col"),
        Column::field("Email", "email"),
    ];
    let data = tenants();
    let view = table(PresentationMode::Expanded).view(&TableProps::new(&columns, &data));

    let cell = view.find("tenants-cell-0-0").unwrap();
    assert_eq!(cell.classes, vec!["name-col".to_string()]);
    assert!(view.find("tenants-th-0").unwrap().classes.contains(&"name-col".to_string()));
}

// ============================================================================
// Compact cards
// ============================================================================

#[test]
fn test_two_column_card_has_no_toggle() {
    let columns: Vec<Column<serde_json::Value>> = vec![
        Column::computed("Name", |r: &serde_json::Value| {
            Element::text(r["name"].as_str().unwrap_or_default())
        }),
        Column::field("Email", "email"),
    ];
    let data = vec![serde_json::json!({ "name": "A", "email": "a@x.com" })];
    let props = TableProps::new(&columns, &data);
    let mut table =
        DataTable::new("t", TableConfig::default()).with_mode(PresentationMode::Compact);

    let view = table.view(&props);
    let card = view.find("t-card-0").unwrap();
    assert_eq!(card.find_all(Role::CardPrimary)[0].text_content(), "A");
    assert_eq!(card.find_all(Role::CardSecondary)[0].text_content(), "a@x.com");
    assert!(!view.contains_role(Role::ExpandToggle));
    assert!(!view.contains_role(Role::ActionTrigger));
    assert!(!table.handle(TableEvent::ToggleRow(0), &props));
}

#[test]
fn test_toggle_reveals_remaining_columns() {
    let columns = columns();
    let data = tenants();
    let props = TableProps::new(&columns, &data);
    let mut table = table(PresentationMode::Compact);

    let view = table.view(&props);
    assert!(!view.contains_role(Role::CardDetail));
    assert_eq!(view.find_all(Role::ExpandToggle).len(), 2);

    assert!(table.handle(TableEvent::ToggleRow(1), &props));
    let view = table.view(&props);
    let card = view.find("tenants-card-1").unwrap();
    let details: Vec<String> = card
        .find_all(Role::CardDetail)
        .iter()
        .map(|d| d.text_content())
        .collect();
    assert_eq!(details, vec!["Plan: free", "Seats: 3"]);
    assert!(!view.find("tenants-card-0").unwrap().contains_role(Role::CardDetail));

    assert!(table.handle(TableEvent::ToggleRow(1), &props));
    assert!(table.expanded_rows().is_empty());
    assert!(!table.handle(TableEvent::ToggleRow(7), &props));
}

#[test]
fn test_action_sheet_offers_supplied_operations() {
    let columns = columns();
    let data = tenants();
    let deleted = RefCell::new(Vec::new());
    let viewed = RefCell::new(Vec::new());
    let props = TableProps::new(&columns, &data)
        .on_view(|t: &Tenant| viewed.borrow_mut().push(t.name.clone()))
        .on_delete(|t: &Tenant| deleted.borrow_mut().push(t.name.clone()));
    let mut table = table(PresentationMode::Compact);

    assert!(!table.view(&props).contains_role(Role::ActionSheet));
    assert!(table.handle(TableEvent::OpenActions(1), &props));

    let view = table.view(&props);
    let sheet = view.find("tenants-sheet").unwrap();
    let buttons: Vec<&str> = sheet
        .find_all(Role::Button)
        .into_iter()
        .map(text_of)
        .collect();
    assert_eq!(buttons, vec!["[View]", "[Delete]", "[Cancel]"]);
    let delete = view.find("tenants-sheet-delete").unwrap();
    assert!(delete.classes.contains(&"destructive".to_string()));
    assert!(delete.style.foreground.is_some());

    assert!(!table.handle(TableEvent::Edit(1), &props));
    assert!(table.handle(TableEvent::Delete(1), &props));
    assert_eq!(*deleted.borrow(), vec!["Globex".to_string()]);
    assert_eq!(table.action_sheet(), None);
    assert!(viewed.borrow().is_empty());
}

#[test]
fn test_actions_need_a_callback() {
    let columns = columns();
    let data = tenants();
    let props = TableProps::new(&columns, &data);
    let mut table = table(PresentationMode::Compact);

    assert!(!table.handle(TableEvent::OpenActions(0), &props));
    assert!(!table.handle(TableEvent::View(0), &props));
    assert!(!table.handle(TableEvent::CloseActions, &props));
}

#[test]
fn test_new_dataset_resets_row_state() {
    let columns = columns();
    let first = tenants();
    let second = tenants();
    let mut table = table(PresentationMode::Compact);
    let now = Instant::now();

    let props = TableProps::new(&columns, &first).on_edit(|_: &Tenant| {});
    table.update(&props, now);
    table.handle(TableEvent::ToggleRow(0), &props);
    table.handle(TableEvent::OpenActions(1), &props);
    assert!(!table.update(&props, now));
    assert_eq!(table.expanded_rows().len(), 1);

    let props = TableProps::new(&columns, &second).on_edit(|_: &Tenant| {});
    assert!(table.update(&props, now));
    assert!(table.expanded_rows().is_empty());
    assert_eq!(table.action_sheet(), None);
}

#[test]
fn test_loading_frame_resets_row_state_between_pages() {
    let columns = columns();
    let mut table = table(PresentationMode::Compact);
    let now = Instant::now();

    {
        let first = tenants();
        let props = TableProps::new(&columns, &first).on_edit(|_: &Tenant| {});
        table.update(&props, now);
        table.handle(TableEvent::ToggleRow(0), &props);
        table.handle(TableEvent::OpenActions(1), &props);
    }

    let loading: Vec<Tenant> = Vec::new();
    assert!(table.update(&TableProps::new(&columns, &loading).loading(true), now));
    assert!(table.expanded_rows().is_empty());
    assert_eq!(table.action_sheet(), None);

    // The next page may land at the address the first one was freed from.
    let second = vec![tenant("Initech", "pro", 4), tenant("Umbrella", "free", 1)];
    let props = TableProps::new(&columns, &second);
    assert!(!table.update(&props, now));
    assert!(table.expanded_rows().is_empty());
}

#[test]
fn test_dataset_key_resets_row_state_on_refill_in_place() {
    let columns = columns();
    let mut rows = tenants();
    let mut table = table(PresentationMode::Compact);
    let now = Instant::now();

    {
        let props = TableProps::new(&columns, &rows).dataset_key(1);
        table.update(&props, now);
        table.handle(TableEvent::ToggleRow(1), &props);
        assert!(!table.update(&props, now));
    }
    assert_eq!(table.expanded_rows().len(), 1);

    rows.clear();
    rows.extend([tenant("Initech", "pro", 4), tenant("Umbrella", "free", 1)]);
    assert!(table.update(&TableProps::new(&columns, &rows).dataset_key(2), now));
    assert!(table.expanded_rows().is_empty());
}

// ============================================================================
// Loading and empty states
// ============================================================================

#[test]
fn test_loading_shows_only_the_skeleton() {
    let columns = columns();
    let data = tenants();
    let meta = PaginationMeta {
        current_page: 1,
        last_page: 3,
        per_page: 10,
        total: 23,
        from: Some(1),
        to: Some(10),
    };
    let config = TableConfig::default().skeleton_rows(4);
    let table = DataTable::new("t", config).with_mode(PresentationMode::Expanded);
    let view = table.view(&TableProps::new(&columns, &data).loading(true).pagination(&meta));

    let skeleton = view.find_all(Role::Skeleton);
    assert_eq!(skeleton.len(), 1);
    assert_eq!(skeleton[0].children.len(), 4);
    assert!(!view.contains_role(Role::Row));
    assert!(!view.contains_role(Role::HeaderRow));
    assert!(!view.contains_role(Role::Pagination));
    assert!(!view.text_content().contains("Acme"));
}

#[test]
fn test_empty_dataset_shows_only_the_message() {
    let columns = columns();
    let data: Vec<Tenant> = Vec::new();
    let meta = PaginationMeta {
        current_page: 1,
        last_page: 2,
        per_page: 10,
        total: 0,
        from: None,
        to: None,
    };
    let table = table(PresentationMode::Expanded);
    let view = table.view(
        &TableProps::new(&columns, &data)
            .empty_message("No tenants yet")
            .pagination(&meta),
    );

    assert_eq!(view.find_all(Role::Empty)[0].text_content(), "No tenants yet");
    assert!(!view.contains_role(Role::HeaderRow));
    assert!(!view.contains_role(Role::Pagination));
}
