//! Column model: how one logical field is projected out of a record.
//!
//! A `Vec<Column<T>>` fully describes a table: what each cell shows, what the
//! export projection contains, which headers sort, and how wide each column
//! is. Columns are plain data; the engine reads them and never mutates them.
//!
//! # Example
//!
//! ```
//! use gridline::{CellValue, Column, Element, Record};
//!
//! struct Tenant {
//!     name: String,
//!     email: String,
//!     seats: u32,
//! }
//!
//! impl Record for Tenant {
//!     fn field(&self, name: &str) -> Option<CellValue> {
//!         match name {
//!             "email" => Some(self.email.clone().into()),
//!             "seats" => Some(self.seats.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let columns: Vec<Column<Tenant>> = vec![
//!     Column::computed("Name", |t: &Tenant| Element::text(&t.name))
//!         .export_with(|t: &Tenant| t.name.clone().into())
//!         .sortable("name"),
//!     Column::field("Email", "email"),
//!     Column::field("Seats", "seats").fixed(6),
//! ];
//! assert_eq!(columns[0].sort_target(), Some("name"));
//! ```

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::{Element, Size};
use crate::error::{panic_message, CellError};

/// Value used in the export projection when a column has nothing exportable.
pub const EXPORT_FALLBACK: &str = "-";

// =============================================================================
// CellValue
// =============================================================================

/// A primitive cell value, as used by field access and export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert a JSON value. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<u64> for CellValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Float(i as f64))
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<CellValue> for Element {
    fn from(value: CellValue) -> Self {
        Element::text(value.to_string())
    }
}

// =============================================================================
// Record
// =============================================================================

/// Named-field access into a record.
///
/// Field-name accessors and the export fallback go through this trait.
/// Records that are only ever shown through computed accessors can rely on
/// the default, which has no fields.
pub trait Record {
    /// Value of the named field, or `None` if the record has no such field.
    fn field(&self, name: &str) -> Option<CellValue> {
        let _ = name;
        None
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<CellValue> {
        self.as_object()?.get(name).map(CellValue::from_json)
    }
}

impl Record for BTreeMap<String, CellValue> {
    fn field(&self, name: &str) -> Option<CellValue> {
        self.get(name).cloned()
    }
}

impl Record for HashMap<String, CellValue> {
    fn field(&self, name: &str) -> Option<CellValue> {
        self.get(name).cloned()
    }
}

// =============================================================================
// Accessor
// =============================================================================

type ComputeFn<T> = Arc<dyn Fn(&T) -> Result<Element, CellError> + Send + Sync>;
type ExportFn<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// How a column reads its cell out of a record.
pub enum Accessor<T> {
    /// Computed or composite cell content.
    Compute(ComputeFn<T>),
    /// Direct passthrough of a named field.
    Field(String),
}

impl<T> Accessor<T> {
    pub fn compute<F, E>(f: F) -> Self
    where
        F: Fn(&T) -> E + Send + Sync + 'static,
        E: Into<Element>,
    {
        Accessor::Compute(Arc::new(move |record| Ok(f(record).into())))
    }

    pub fn try_compute<F>(f: F) -> Self
    where
        F: Fn(&T) -> Result<Element, CellError> + Send + Sync + 'static,
    {
        Accessor::Compute(Arc::new(f))
    }

    pub fn field(name: impl Into<String>) -> Self {
        Accessor::Field(name.into())
    }

    /// Name of the field for field accessors.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Accessor::Field(name) => Some(name),
            Accessor::Compute(_) => None,
        }
    }
}

impl<T: Record> Accessor<T> {
    /// Resolve the cell content for `record`.
    ///
    /// Panics inside computed accessors are caught and reported as
    /// [`CellError::Panicked`].
    pub fn resolve(&self, record: &T) -> Result<Element, CellError> {
        match self {
            Accessor::Field(name) => record
                .field(name)
                .map(Element::from)
                .ok_or_else(|| CellError::MissingField(name.clone())),
            Accessor::Compute(f) => {
                let _guard = ResolveGuard::enter();
                catch_unwind(AssertUnwindSafe(|| f(record))).unwrap_or_else(|payload| {
                    Err(CellError::Panicked(panic_message(payload.as_ref())))
                })
            }
        }
    }
}

thread_local! {
    static RESOLVING: Cell<bool> = const { Cell::new(false) };
}

/// Whether a computed accessor is running on this thread.
///
/// A panic raised while this is `true` is caught and shown as a cell error,
/// so a process-wide panic hook can leave the terminal alone.
pub fn resolving_cell() -> bool {
    RESOLVING.with(Cell::get)
}

struct ResolveGuard {
    previous: bool,
}

impl ResolveGuard {
    fn enter() -> Self {
        Self {
            previous: RESOLVING.with(|r| r.replace(true)),
        }
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVING.with(|r| r.set(self.previous));
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Compute(f) => Accessor::Compute(Arc::clone(f)),
            Accessor::Field(name) => Accessor::Field(name.clone()),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Compute(_) => f.write_str("Compute(<fn>)"),
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
        }
    }
}

impl<T> From<&str> for Accessor<T> {
    fn from(name: &str) -> Self {
        Accessor::field(name)
    }
}

impl<T> From<String> for Accessor<T> {
    fn from(name: String) -> Self {
        Accessor::Field(name)
    }
}

// =============================================================================
// Column
// =============================================================================

/// Column width specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Fixed width in cells.
    Fixed(u16),
    /// Flexible width with weight.
    Flex(u16),
    /// Natural width of the content.
    Auto,
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Flex(1)
    }
}

impl From<ColumnWidth> for Size {
    fn from(width: ColumnWidth) -> Self {
        match width {
            ColumnWidth::Fixed(w) => Size::Fixed(w),
            ColumnWidth::Flex(w) => Size::Flex(w),
            ColumnWidth::Auto => Size::Auto,
        }
    }
}

/// A table column definition.
///
/// `header` is also the column's identity in the export projection, so
/// headers should be unique within a table. This is not validated.
pub struct Column<T> {
    /// Header text; doubles as the export field identity.
    pub header: String,
    pub accessor: Accessor<T>,
    /// Value for the export/print projection.
    pub export_value: Option<ExportFn<T>>,
    pub sortable: bool,
    /// Identity sent to the sort coordinator. Used instead of `header`.
    pub sort_key: Option<String>,
    pub hide_in_export: bool,
    pub width: ColumnWidth,
    /// Class attached to every element generated for this column.
    pub class_name: Option<String>,
}

impl<T> Column<T> {
    pub fn new(header: impl Into<String>, accessor: impl Into<Accessor<T>>) -> Self {
        Self {
            header: header.into(),
            accessor: accessor.into(),
            export_value: None,
            sortable: false,
            sort_key: None,
            hide_in_export: false,
            width: ColumnWidth::default(),
            class_name: None,
        }
    }

    /// Column reading a named field straight off the record.
    pub fn field(header: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(header, Accessor::field(name))
    }

    /// Column computing its content from the whole record.
    pub fn computed<F, E>(header: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> E + Send + Sync + 'static,
        E: Into<Element>,
    {
        Self::new(header, Accessor::compute(f))
    }

    /// Set the value used for export and print.
    pub fn export_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        self.export_value = Some(Arc::new(f));
        self
    }

    /// Make the header interactive, sorting by `key`.
    pub fn sortable(mut self, key: impl Into<String>) -> Self {
        self.sortable = true;
        self.sort_key = Some(key.into());
        self
    }

    pub fn hide_in_export(mut self) -> Self {
        self.hide_in_export = true;
        self
    }

    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn flex(mut self, weight: u16) -> Self {
        self.width = ColumnWidth::Flex(weight);
        self
    }

    pub fn auto(mut self) -> Self {
        self.width = ColumnWidth::Auto;
        self
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Sort identity, if the header is interactive.
    pub fn sort_target(&self) -> Option<&str> {
        if self.sortable {
            self.sort_key.as_deref()
        } else {
            None
        }
    }
}

impl<T: Record> Column<T> {
    /// Export value for `record`: `export_value` first, then the raw field,
    /// then [`EXPORT_FALLBACK`].
    ///
    /// A computed accessor without `export_value` always exports the
    /// fallback; its rendered content is not stringified.
    pub fn export_cell(&self, record: &T) -> CellValue {
        if let Some(export) = &self.export_value {
            return export(record);
        }
        self.accessor
            .field_name()
            .and_then(|name| record.field(name))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| CellValue::Text(EXPORT_FALLBACK.to_string()))
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            export_value: self.export_value.clone(),
            sortable: self.sortable,
            sort_key: self.sort_key.clone(),
            hide_in_export: self.hide_in_export,
            width: self.width,
            class_name: self.class_name.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("has_export_value", &self.export_value.is_some())
            .field("sortable", &self.sortable)
            .field("sort_key", &self.sort_key)
            .field("hide_in_export", &self.hide_in_export)
            .field("width", &self.width)
            .field("class_name", &self.class_name)
            .finish()
    }
}
