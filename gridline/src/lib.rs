pub mod column;
pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod pagination;
pub mod print;
pub mod render;
pub mod sort;
pub mod state;
pub mod table;
pub mod toolbar;
pub mod viewport;

pub use column::{
    resolving_cell, Accessor, CellValue, Column, ColumnWidth, Record, EXPORT_FALLBACK,
};
pub use config::{Labels, TableConfig};
pub use element::{Color, Element, Role, Size, Style};
pub use error::{CellError, ConfigError, ExportError};
pub use export::{
    export_columns, fingerprint, ExportBridge, ExportColumn, ExportRegistrar, ExportRegistry,
    ExportTable, FingerprintPolicy,
};
pub use pagination::{PageControl, PaginationMeta, PaginationNavigator};
pub use print::{PrintDocument, PrintIndicator, PrintRequester};
pub use render::{render, render_with_focus, Frame};
pub use sort::{next_sort, SortCoordinator, SortIndicator, SortOrder, SortState};
pub use state::State;
pub use table::{DataTable, TableEvent, TableProps};
pub use toolbar::{
    ActionBoard, ActionHandle, ActionRegistry, ModalFlag, QuickAction, ToolbarBridge,
    EXPORT_ACTION_ID,
};
pub use viewport::{
    PresentationMode, ResizeBus, ResizeSource, ViewportClassifier, ViewportWatcher,
    DEFAULT_BREAKPOINT,
};
