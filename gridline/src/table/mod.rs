//! The table engine.
//!
//! A [`DataTable`] is a thin view over data it does not own. Each frame the
//! owner builds [`TableProps`] from its current dataset and callbacks, then:
//!
//! 1. calls [`DataTable::update`] to run side effects (export publish,
//!    toolbar registration, print indicator),
//! 2. calls [`DataTable::view`] to get the element tree to draw,
//! 3. hands activated elements' [`TableEvent`]s to [`DataTable::handle`].
//!
//! `view` is pure. Sorting and paging only ever reach the owner through its
//! callbacks; rows are shown in the order given.

mod cell;
mod chrome;
mod compact;
mod expanded;
mod state;

pub use state::TableState;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::column::{Column, Record};
use crate::config::TableConfig;
use crate::element::{Element, Role};
use crate::export::{export_columns, ExportBridge, ExportInput, ExportRegistrar, ExportTable};
use crate::pagination::{PageControl, PaginationMeta, PaginationNavigator};
use crate::print::{PrintDocument, PrintIndicator, PrintRequester};
use crate::sort::{SortCoordinator, SortOrder, SortState};
use crate::toolbar::{ActionRegistry, ModalFlag, QuickAction, ToolbarBridge, EXPORT_ACTION_ID};
use crate::viewport::{PresentationMode, ResizeSource, ViewportClassifier, ViewportWatcher};

/// Interaction attached to an element, handed back to [`DataTable::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Header with this sort key was clicked.
    Sort(String),
    Page(PageControl),
    /// Flip a card's expanded state.
    ToggleRow(usize),
    /// Open the action sheet for a row.
    OpenActions(usize),
    CloseActions,
    View(usize),
    Edit(usize),
    Delete(usize),
    Print,
}

// =============================================================================
// Props
// =============================================================================

type RecordCallback<'a, T> = Box<dyn Fn(&T) + 'a>;

/// Everything the owner supplies for one frame.
pub struct TableProps<'a, T> {
    pub columns: &'a [Column<T>],
    pub data: &'a [T],
    pub is_loading: bool,
    /// Owner-supplied dataset generation. When set, row state resets when it
    /// changes instead of when the slice changes.
    pub dataset_key: Option<u64>,
    pub empty_message: String,
    /// File name of the export and title of the printout.
    pub export_file_name: String,
    pub pagination: Option<&'a PaginationMeta>,
    pub current_sort: Option<&'a SortState>,
    pub on_page_change: Option<Box<dyn Fn(u32) + 'a>>,
    pub on_sort_change: Option<Box<dyn Fn(&str, SortOrder) + 'a>>,
    pub on_view: Option<RecordCallback<'a, T>>,
    pub on_edit: Option<RecordCallback<'a, T>>,
    pub on_delete: Option<RecordCallback<'a, T>>,
}

impl<'a, T> TableProps<'a, T> {
    pub fn new(columns: &'a [Column<T>], data: &'a [T]) -> Self {
        Self {
            columns,
            data,
            is_loading: false,
            dataset_key: None,
            empty_message: "No records found".to_string(),
            export_file_name: "export".to_string(),
            pagination: None,
            current_sort: None,
            on_page_change: None,
            on_sort_change: None,
            on_view: None,
            on_edit: None,
            on_delete: None,
        }
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    /// Identify the dataset by a generation the owner bumps on every
    /// replacement, including refills of the same buffer.
    pub fn dataset_key(mut self, key: u64) -> Self {
        self.dataset_key = Some(key);
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = name.into();
        self
    }

    pub fn pagination(mut self, meta: &'a PaginationMeta) -> Self {
        self.pagination = Some(meta);
        self
    }

    pub fn sort(mut self, sort: &'a SortState) -> Self {
        self.current_sort = Some(sort);
        self
    }

    pub fn on_page_change(mut self, f: impl Fn(u32) + 'a) -> Self {
        self.on_page_change = Some(Box::new(f));
        self
    }

    pub fn on_sort_change(mut self, f: impl Fn(&str, SortOrder) + 'a) -> Self {
        self.on_sort_change = Some(Box::new(f));
        self
    }

    pub fn on_view(mut self, f: impl Fn(&T) + 'a) -> Self {
        self.on_view = Some(Box::new(f));
        self
    }

    pub fn on_edit(mut self, f: impl Fn(&T) + 'a) -> Self {
        self.on_edit = Some(Box::new(f));
        self
    }

    pub fn on_delete(mut self, f: impl Fn(&T) + 'a) -> Self {
        self.on_delete = Some(Box::new(f));
        self
    }

    /// Whether any per-row operation was supplied.
    pub fn has_row_actions(&self) -> bool {
        self.on_view.is_some() || self.on_edit.is_some() || self.on_delete.is_some()
    }
}

/// Borrowed inputs of one `view` call, shared by the presentation builders.
struct ViewContext<'v, 'a, T> {
    id: &'v str,
    config: &'v TableConfig,
    props: &'v TableProps<'a, T>,
    state: &'v TableState,
}

// =============================================================================
// DataTable
// =============================================================================

enum Viewport {
    Fixed(PresentationMode),
    Watched(ViewportWatcher),
}

/// A responsive table instance.
///
/// Owns row UI state, the presentation mode and its collaborator
/// registrations. Dropping it releases the toolbar action and the resize
/// subscription.
pub struct DataTable<T> {
    id: String,
    config: TableConfig,
    state: TableState,
    viewport: Viewport,
    export: ExportBridge,
    toolbar: ToolbarBridge,
    printing: PrintIndicator,
    export_registrar: Option<Arc<dyn ExportRegistrar<T>>>,
    action_registry: Option<Arc<dyn ActionRegistry>>,
    print_requester: Option<Arc<dyn PrintRequester>>,
    modal: ModalFlag,
}

impl<T: Record + 'static> DataTable<T> {
    /// Create a table. `id` prefixes the ids of every generated element.
    pub fn new(id: impl Into<String>, config: TableConfig) -> Self {
        Self {
            id: id.into(),
            export: ExportBridge::new(config.fingerprint),
            config,
            state: TableState::new(),
            viewport: Viewport::Fixed(PresentationMode::Expanded),
            toolbar: ToolbarBridge::new(),
            printing: PrintIndicator::new(),
            export_registrar: None,
            action_registry: None,
            print_requester: None,
            modal: ModalFlag::new(),
        }
    }

    /// Follow `source` and classify its width against the configured
    /// breakpoint.
    pub fn watch_viewport(mut self, source: Arc<dyn ResizeSource>) -> Self {
        let watcher = ViewportClassifier::new(self.config.breakpoint).watch(source);
        self.viewport = Viewport::Watched(watcher);
        self
    }

    /// Pin the presentation mode.
    pub fn with_mode(mut self, mode: PresentationMode) -> Self {
        self.viewport = Viewport::Fixed(mode);
        self
    }

    pub fn export_registrar(mut self, registrar: Arc<dyn ExportRegistrar<T>>) -> Self {
        self.export_registrar = Some(registrar);
        self
    }

    pub fn action_registry(mut self, registry: Arc<dyn ActionRegistry>) -> Self {
        self.action_registry = Some(registry);
        self
    }

    pub fn print_requester(mut self, requester: Arc<dyn PrintRequester>) -> Self {
        self.print_requester = Some(requester);
        self
    }

    /// Share the owner's modal flag. The export action opens it.
    pub fn modal_flag(mut self, modal: ModalFlag) -> Self {
        self.modal = modal;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn mode(&self) -> PresentationMode {
        match &self.viewport {
            Viewport::Fixed(mode) => *mode,
            Viewport::Watched(watcher) => watcher.mode(),
        }
    }

    pub fn expanded_rows(&self) -> &HashSet<usize> {
        self.state.expanded()
    }

    /// Row whose action sheet is open.
    pub fn action_sheet(&self) -> Option<usize> {
        self.state.action_sheet()
    }

    pub fn is_printing(&self) -> bool {
        self.printing.is_active()
    }

    /// Whether the export action is currently in the toolbar.
    pub fn has_toolbar_action(&self) -> bool {
        self.toolbar.is_registered()
    }

    /// Fingerprint of the last export publish.
    pub fn export_fingerprint(&self) -> Option<&str> {
        self.export.last_fingerprint()
    }

    /// Clear row state. For owners that mutate their dataset in place rather
    /// than replacing it.
    pub fn reset_rows(&mut self) {
        self.state.clear();
    }

    /// Run the effect step for this frame.
    ///
    /// Returns `true` when something the view depends on changed outside the
    /// props (mode switch, row state reset, print indicator cleared).
    pub fn update(&mut self, props: &TableProps<'_, T>, now: Instant) -> bool {
        let mut changed = false;

        if props.is_loading {
            if self.state.forget_dataset() {
                log::debug!("table '{}': loading, row state reset", self.id);
                changed = true;
            }
        } else if self.state.observe_dataset(props.data, props.dataset_key) {
            log::debug!("table '{}': dataset replaced, row state reset", self.id);
            changed = true;
        }
        if let Viewport::Watched(watcher) = &self.viewport {
            changed |= watcher.take_changed();
        }

        self.export.sync(
            self.export_registrar.as_deref(),
            ExportInput {
                data: props.data,
                columns: props.columns,
                file_name: &props.export_file_name,
                is_loading: props.is_loading,
            },
        );

        let modal = self.modal.clone();
        let modal_open = modal.is_open();
        let label = self.config.labels.export_action.clone();
        self.toolbar.sync(
            self.action_registry.as_ref(),
            !props.data.is_empty(),
            modal_open,
            move || QuickAction::new(EXPORT_ACTION_ID, label, move || modal.open()),
        );

        if let Some(requester) = &self.print_requester {
            let delay = self.config.print_reset_delay();
            changed |= self.printing.tick(now, requester.is_printing(), delay);
        }
        changed
    }

    /// Build the element tree for this frame.
    pub fn view(&self, props: &TableProps<'_, T>) -> Element {
        let cx = ViewContext {
            id: &self.id,
            config: &self.config,
            props,
            state: &self.state,
        };
        let mode = self.mode();
        let mut root = Element::col()
            .id(self.id.clone())
            .role(Role::Table)
            .class(mode.to_string());

        if props.is_loading {
            return root.child(chrome::skeleton(&cx, mode));
        }
        if props.data.is_empty() {
            return root.child(chrome::empty(&cx));
        }

        root = root.gap(1);
        if self.print_requester.is_some() {
            root = root.child(chrome::print_bar(&cx, self.printing.is_active()));
        }
        root = match mode {
            PresentationMode::Expanded => root.child(expanded::grid(&cx)),
            PresentationMode::Compact => {
                let sheet = self
                    .state
                    .action_sheet()
                    .and_then(|index| compact::action_sheet(&cx, index));
                root.child(compact::cards(&cx)).children(sheet)
            }
        };
        if let Some(footer) = props.pagination.and_then(|meta| chrome::pagination(&cx, meta)) {
            root = root.child(footer);
        }
        root
    }

    /// Apply an interaction. Returns `false` if the event was ignored.
    pub fn handle(&mut self, event: TableEvent, props: &TableProps<'_, T>) -> bool {
        log::trace!("table '{}': {event:?}", self.id);
        match event {
            TableEvent::Sort(key) => {
                let known = props
                    .columns
                    .iter()
                    .any(|column| column.sort_target() == Some(key.as_str()));
                known
                    && SortCoordinator::new(props.current_sort, props.on_sort_change.as_deref())
                        .click(&key)
                        .is_some()
            }
            TableEvent::Page(control) => props.pagination.is_some_and(|meta| {
                PaginationNavigator::new(meta, props.on_page_change.as_deref())
                    .press(control)
                    .is_some()
            }),
            TableEvent::ToggleRow(index) => {
                if index >= props.data.len() || props.columns.len() <= 2 {
                    return false;
                }
                self.state.toggle(index);
                true
            }
            TableEvent::OpenActions(index) => {
                if index >= props.data.len() || !props.has_row_actions() {
                    return false;
                }
                self.state.open_sheet(index);
                true
            }
            TableEvent::CloseActions => self.state.close_sheet(),
            TableEvent::View(index) => self.row_action(index, props.on_view.as_deref(), props.data),
            TableEvent::Edit(index) => self.row_action(index, props.on_edit.as_deref(), props.data),
            TableEvent::Delete(index) => {
                self.row_action(index, props.on_delete.as_deref(), props.data)
            }
            TableEvent::Print => self.print(props, Instant::now()),
        }
    }

    fn row_action(&mut self, index: usize, callback: Option<&dyn Fn(&T)>, data: &[T]) -> bool {
        let (Some(callback), Some(record)) = (callback, data.get(index)) else {
            return false;
        };
        self.state.close_sheet();
        callback(record);
        true
    }

    /// Hand the printable projection to the print requester and raise the
    /// printing indicator.
    ///
    /// Ignored without a requester, while loading, with no rows, or while a
    /// print is already in progress.
    pub fn print(&mut self, props: &TableProps<'_, T>, now: Instant) -> bool {
        let Some(requester) = &self.print_requester else {
            return false;
        };
        if props.is_loading || props.data.is_empty() || self.printing.is_active() {
            return false;
        }

        let columns = export_columns(props.columns);
        let table = ExportTable::project(props.data, &columns, &props.export_file_name);
        requester.attach(PrintDocument::new(props.export_file_name.as_str(), table));
        requester.request_print();
        self.printing.raise(now);
        log::info!(
            "table '{}': print requested for {} rows",
            self.id,
            props.data.len()
        );
        true
    }
}

impl<T> fmt::Debug for DataTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("export", &self.export)
            .field("toolbar", &self.toolbar)
            .field("printing", &self.printing)
            .finish_non_exhaustive()
    }
}
