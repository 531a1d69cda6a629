//! The tenants screen: owns the dataset and every collaborator of the table.

use std::cell::{Cell, RefCell};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use gridline::render::Line;
use gridline::{
    render, render_with_focus, ActionBoard, Color, Column, DataTable, Element, ExportRegistry,
    ModalFlag, PageControl, PaginationMeta, ResizeBus, Role, Size, SortOrder, SortState, Style,
    TableEvent, TableProps, EXPORT_ACTION_ID,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::service::{Page, PageQuery, TenantService};
use crate::settings::Settings;
use crate::spooler::PrintSpooler;
use crate::tenant::{self, Tenant};
use crate::terminal::TerminalGuard;

const TICK: Duration = Duration::from_millis(100);
const EXPORT_FILE_NAME: &str = "tenants";

/// A page fetched for request `id`.
#[derive(Debug)]
pub struct Fetched {
    id: u64,
    page: Page,
}

/// What the owner currently shows. Supplied fresh to the table every frame.
struct Listing {
    columns: Vec<Column<Tenant>>,
    rows: Vec<Tenant>,
    meta: Option<PaginationMeta>,
    sort: SortState,
    loading: bool,
    /// Request id of the page in `rows`.
    generation: u64,
}

/// Requests raised by table callbacks while handling one event.
#[derive(Default)]
struct Intents {
    page: Cell<Option<u32>>,
    sort: RefCell<Option<(String, SortOrder)>>,
    view: Cell<Option<u32>>,
    edit: Cell<Option<u32>>,
    delete: Cell<Option<u32>>,
}

fn table_props<'a>(listing: &'a Listing, intents: &'a Intents) -> TableProps<'a, Tenant> {
    let mut props = TableProps::new(&listing.columns, &listing.rows)
        .loading(listing.loading)
        .dataset_key(listing.generation)
        .empty_message("No tenants match")
        .export_file_name(EXPORT_FILE_NAME)
        .sort(&listing.sort)
        .on_page_change(move |page| intents.page.set(Some(page)))
        .on_sort_change(move |key: &str, order| {
            *intents.sort.borrow_mut() = Some((key.to_string(), order));
        })
        .on_view(move |t: &Tenant| intents.view.set(Some(t.id)))
        .on_edit(move |t: &Tenant| intents.edit.set(Some(t.id)))
        .on_delete(move |t: &Tenant| intents.delete.set(Some(t.id)));
    if let Some(meta) = &listing.meta {
        props = props.pagination(meta);
    }
    props
}

pub struct App {
    settings: Settings,
    service: Arc<TenantService>,
    listing: Listing,
    table: DataTable<Tenant>,
    exports: Arc<ExportRegistry>,
    actions: Arc<ActionBoard>,
    modal: ModalFlag,
    spooler: Arc<PrintSpooler>,
    viewport: Arc<ResizeBus>,
    tx: UnboundedSender<Fetched>,
    request: u64,
    /// Current page as requested, before the response arrives.
    page: u32,
    view: Element,
    focus: Option<String>,
    scroll: usize,
    status: Option<String>,
    dirty: bool,
    quit: bool,
}

impl App {
    pub fn new(
        settings: Settings,
        width: u16,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<Fetched>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Arc::new(TenantService::seeded(
            settings.tenants,
            Duration::from_millis(settings.latency_ms),
        ));
        let exports = Arc::new(ExportRegistry::new());
        let actions = Arc::new(ActionBoard::new());
        let modal = ModalFlag::new();
        let spooler = Arc::new(PrintSpooler::new(settings.output_dir.clone(), runtime));
        let viewport = Arc::new(ResizeBus::new(width));

        let table = DataTable::<Tenant>::new("tenants", settings.table.clone())
            .watch_viewport(viewport.clone())
            .export_registrar(exports.clone())
            .action_registry(actions.clone())
            .print_requester(spooler.clone())
            .modal_flag(modal.clone());

        let app = Self {
            listing: Listing {
                columns: tenant::columns(),
                rows: Vec::new(),
                meta: None,
                sort: SortState::asc("name"),
                loading: true,
                generation: 0,
            },
            settings,
            service,
            table,
            exports,
            actions,
            modal,
            spooler,
            viewport,
            tx,
            request: 0,
            page: 1,
            view: Element::col(),
            focus: None,
            scroll: 0,
            status: None,
            dirty: true,
            quit: false,
        };
        (app, rx)
    }

    pub async fn run(
        mut self,
        mut rx: UnboundedReceiver<Fetched>,
        terminal: &mut TerminalGuard,
    ) -> io::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        self.fetch(1);
        loop {
            if self.dirty {
                self.draw(terminal)?;
            }
            if self.quit {
                log::info!("quit requested");
                return Ok(());
            }
            tokio::select! {
                Some(event) = events.next() => self.on_terminal_event(event?),
                Some(fetched) = rx.recv() => self.on_fetched(fetched),
                _ = ticker.tick() => self.on_tick(),
            }
        }
    }

    // =========================================================================
    // Data
    // =========================================================================

    fn fetch(&mut self, page: u32) {
        self.request += 1;
        self.page = page;
        self.listing.loading = true;
        self.dirty = true;

        let query = PageQuery {
            page,
            per_page: self.settings.page_size,
            sort: self.listing.sort.clone(),
        };
        let id = self.request;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        log::debug!("fetching page {page} (request {id})");
        tokio::spawn(async move {
            let page = service.fetch(query).await;
            // The receiver is gone once the app quits.
            let _ = tx.send(Fetched { id, page });
        });
    }

    fn on_fetched(&mut self, fetched: Fetched) {
        if fetched.id != self.request {
            log::debug!("dropping stale response for request {}", fetched.id);
            return;
        }
        self.page = fetched.page.meta.current_page;
        self.listing.rows = fetched.page.rows;
        self.listing.meta = Some(fetched.page.meta);
        self.listing.loading = false;
        self.listing.generation = fetched.id;
        self.scroll = 0;
        self.dirty = true;
    }

    fn apply(&mut self, intents: Intents) {
        if let Some((key, order)) = intents.sort.into_inner() {
            self.listing.sort = SortState::new(key, order);
            self.fetch(1);
        } else if let Some(page) = intents.page.get() {
            self.fetch(page);
        }
        if let Some(id) = intents.view.get() {
            if let Some(t) = self.tenant(id) {
                self.status = Some(format!(
                    "{} <{}> · {} plan · {} seats · since {}",
                    t.name,
                    t.email,
                    t.plan,
                    t.seats,
                    t.created.format("%d %b %Y")
                ));
            }
        }
        if let Some(id) = intents.edit.get() {
            if let Some(t) = self.tenant(id) {
                self.status = Some(format!("Editing {} is read-only in this console", t.name));
            }
        }
        if let Some(id) = intents.delete.get() {
            self.archive(id);
        }
    }

    fn tenant(&self, id: u32) -> Option<&Tenant> {
        self.listing.rows.iter().find(|t| t.id == id)
    }

    /// Soft delete: the record stays listed, marked archived.
    fn archive(&mut self, id: u32) {
        match self.service.archive(id) {
            Some(updated) => {
                self.status = Some(format!("Archived {}", updated.name));
                if let Some(row) = self.listing.rows.iter_mut().find(|t| t.id == id) {
                    *row = updated;
                }
            }
            None => self.status = Some(format!("Tenant {id} no longer exists")),
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    fn on_tick(&mut self) {
        if let Some(outcome) = self.spooler.take_finished() {
            self.status = Some(match outcome {
                Ok(path) => format!("Printed to {}", path.display()),
                Err(e) => format!("Print failed: {e}"),
            });
            self.dirty = true;
        }
        let intents = Intents::default();
        let props = table_props(&self.listing, &intents);
        if self.table.update(&props, Instant::now()) {
            self.dirty = true;
        }
    }

    fn on_terminal_event(&mut self, event: Event) {
        match event {
            Event::Resize(width, _) => {
                self.viewport.resize(width);
                self.dirty = true;
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key(key),
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.dirty = true;
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }
        if self.modal.is_open() {
            self.on_dialog_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => self.move_focus(-1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(),
            KeyCode::Esc => {
                self.dispatch(TableEvent::CloseActions);
                self.status = None;
            }
            KeyCode::Char('x') => {
                if !self.actions.trigger(EXPORT_ACTION_ID) {
                    self.status = Some("Nothing to export".to_string());
                }
            }
            KeyCode::Char('p') => {
                if !self.dispatch(TableEvent::Print) {
                    self.status = Some("Nothing to print".to_string());
                }
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                self.dispatch(TableEvent::Page(PageControl::Next));
            }
            KeyCode::Char('b') | KeyCode::PageUp => {
                self.dispatch(TableEvent::Page(PageControl::Previous));
            }
            _ => {}
        }
    }

    fn on_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.modal.close(),
            KeyCode::Char('c') => {
                self.status = Some(match self.exports.save_csv(&self.settings.output_dir) {
                    Ok(path) => format!("Exported to {}", path.display()),
                    Err(e) => {
                        log::error!("export failed: {e}");
                        format!("Export failed: {e}")
                    }
                });
                self.modal.close();
            }
            _ => {}
        }
    }

    /// Hand `event` to the table and act on whatever its callbacks requested.
    fn dispatch(&mut self, event: TableEvent) -> bool {
        let intents = Intents::default();
        let handled = {
            let props = table_props(&self.listing, &intents);
            self.table.handle(event, &props)
        };
        self.apply(intents);
        handled
    }

    fn activate(&mut self) {
        let Some(event) = self.focus.as_deref().and_then(|id| self.view.event_for(id)) else {
            return;
        };
        self.dispatch(event);
    }

    fn move_focus(&mut self, step: isize) {
        let order = self.view.focus_order();
        if order.is_empty() {
            self.focus = None;
            return;
        }
        let len = order.len() as isize;
        let next = match self.focus.as_ref().and_then(|id| order.iter().position(|o| o == id)) {
            Some(current) => (current as isize + step).rem_euclid(len),
            None if step > 0 => 0,
            None => len - 1,
        };
        self.focus = order.get(next as usize).cloned();
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    fn draw(&mut self, terminal: &mut TerminalGuard) -> io::Result<()> {
        let (width, height) = terminal.size()?;
        let height = usize::from(height);

        let intents = Intents::default();
        let props = table_props(&self.listing, &intents);
        self.table.update(&props, Instant::now());
        self.view = self.table.view(&props);
        drop(props);

        // Keep focus on an element that still exists.
        let order = self.view.focus_order();
        if let Some(id) = &self.focus {
            if !order.contains(id) {
                self.focus = order.first().cloned();
            }
        }

        let frame = render_with_focus(&self.view, width, self.focus.as_deref());
        let body_height = height.saturating_sub(2).max(1);
        if let Some(line) = self.focus.as_deref().and_then(|id| frame.line_of(id)) {
            if line < self.scroll + 1 {
                self.scroll = line.saturating_sub(1);
            } else if line >= self.scroll + body_height {
                self.scroll = line + 1 - body_height;
            }
        }

        let mut lines: Vec<Line> = Vec::with_capacity(height);
        lines.extend(render(&self.title_bar(), width).lines);
        lines.extend(frame.viewport(body_height, self.scroll).into_iter().cloned());
        lines.resize(height.saturating_sub(1), Line::default());
        lines.extend(render(&self.status_bar(), width).lines);

        if self.modal.is_open() {
            self.overlay_dialog(&mut lines, width);
        }
        lines.truncate(height);
        terminal.draw(&lines)?;
        self.dirty = false;
        Ok(())
    }

    fn title_bar(&self) -> Element {
        let page = match (&self.listing.meta, self.listing.loading) {
            (_, true) => format!("loading page {}…", self.page),
            (Some(meta), false) => format!("{} tenants", meta.total),
            (None, false) => String::new(),
        };
        let toolbar = self.actions.actions().into_iter().map(|(_, action)| {
            Element::text(format!("[x] {}", action.label))
                .style(Style::new().foreground(Color::var("accent")))
        });
        Element::row()
            .gap(2)
            .style(Style::new().bold())
            .child(Element::text("Tenants").style(Style::new().foreground(Color::var("primary"))))
            .child(Element::text(page).width(Size::Fill).style(Style::new().dim()))
            .children(toolbar)
    }

    fn status_bar(&self) -> Element {
        let text = self.status.clone().unwrap_or_else(|| {
            "tab/j/k focus · enter open · n/b page · p print · x export · esc close · q quit"
                .to_string()
        });
        Element::text(text).style(Style::new().dim())
    }

    fn overlay_dialog(&self, lines: &mut [Line], width: u16) {
        let body = match self.exports.snapshot() {
            Some(export) => format!(
                "{} rows × {} columns → {}.csv",
                export.rows.len(),
                export.headers.len(),
                export.file_name
            ),
            None => "Nothing has been registered for export".to_string(),
        };
        let dialog_width = width.min(56);
        let indent = (width - dialog_width) / 2;
        let dialog = Element::col()
            .role(Role::ActionSheet)
            .indent(indent)
            .style(Style::new().background(Color::var("dialog.bg")))
            .child(
                Element::text(self.table.config().labels.export_action.as_str())
                    .style(Style::new().bold()),
            )
            .child(Element::text(body))
            .child(Element::text("[c] save CSV   [esc] close").style(Style::new().dim()));
        let rendered = render(&dialog, width).lines;
        let top = lines.len().saturating_sub(rendered.len()) / 2;
        for (slot, line) in lines.iter_mut().skip(top).zip(rendered) {
            *slot = line;
        }
    }
}
