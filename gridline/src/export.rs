//! Export projection and the bridge that keeps a shared registrar in sync.
//!
//! The bridge publishes `(data, export columns, file name)` to an
//! [`ExportRegistrar`] whenever the table shows data, but only when the
//! export fingerprint changed since the last publish. Under the default
//! [`FingerprintPolicy::Shape`] the fingerprint is row count, file name and
//! headers, so edits that keep the row count are not republished.
//! [`FingerprintPolicy::Content`] adds a digest of every exported cell.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::column::{CellValue, Column, Record};
use crate::error::ExportError;

// =============================================================================
// Export columns
// =============================================================================

type Resolver<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// One column of the export projection.
pub struct ExportColumn<T> {
    pub header: String,
    resolve: Resolver<T>,
}

impl<T> ExportColumn<T> {
    pub fn new<F>(header: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        Self {
            header: header.into(),
            resolve: Arc::new(resolve),
        }
    }

    pub fn value(&self, record: &T) -> CellValue {
        (self.resolve)(record)
    }
}

impl<T> Clone for ExportColumn<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            resolve: Arc::clone(&self.resolve),
        }
    }
}

impl<T> fmt::Debug for ExportColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportColumn")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// Build the export columns for `columns`.
///
/// Columns marked `hide_in_export` are skipped. When several columns share a
/// header, the header keeps its first position and the last column wins.
pub fn export_columns<T: Record + 'static>(columns: &[Column<T>]) -> Vec<ExportColumn<T>> {
    let mut out: Vec<ExportColumn<T>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for column in columns.iter().filter(|c| !c.hide_in_export) {
        let owned = column.clone();
        let export = ExportColumn::new(column.header.clone(), move |record: &T| {
            owned.export_cell(record)
        });
        match positions.get(column.header.as_str()) {
            Some(&index) => out[index] = export,
            None => {
                positions.insert(column.header.as_str(), out.len());
                out.push(export);
            }
        }
    }
    out
}

// =============================================================================
// Fingerprint
// =============================================================================

/// What the export fingerprint covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintPolicy {
    /// Row count, file name and headers.
    #[default]
    Shape,
    /// Shape plus a SHA-256 digest of every exported cell.
    Content,
}

/// Cheap key for "did anything the export cares about change".
pub fn fingerprint<T: Record + 'static>(
    policy: FingerprintPolicy,
    data: &[T],
    columns: &[Column<T>],
    file_name: &str,
) -> String {
    let headers = columns
        .iter()
        .map(|c| c.header.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let shape = format!("{}-{}-{}", data.len(), file_name, headers);

    match policy {
        FingerprintPolicy::Shape => shape,
        FingerprintPolicy::Content => {
            let mut hasher = Sha256::new();
            let export = export_columns(columns);
            for record in data {
                for column in &export {
                    hasher.update(column.value(record).to_string().as_bytes());
                    hasher.update(b"\x1f");
                }
                hasher.update(b"\x1e");
            }
            format!("{shape}-{:x}", hasher.finalize())
        }
    }
}

// =============================================================================
// Registrar
// =============================================================================

/// Shared collaborator that holds "what is currently exportable".
///
/// Each publish replaces the previous payload wholesale.
pub trait ExportRegistrar<T>: Send + Sync {
    fn publish(&self, data: &[T], columns: &[ExportColumn<T>], file_name: &str);
}

/// Flattened export: headers and stringifiable cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportTable {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ExportTable {
    pub fn project<T>(data: &[T], columns: &[ExportColumn<T>], file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            headers: columns.iter().map(|c| c.header.clone()).collect(),
            rows: data
                .iter()
                .map(|record| columns.iter().map(|c| c.value(record)).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row.iter().map(|value| value.to_string()))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write `<file_name>.csv` into `dir` and return its path.
    pub fn save_csv(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(format!("{}.csv", sanitize_file_name(&self.file_name)));
        let file = File::create(&path)?;
        self.write_csv(file)?;
        log::info!("exported {} rows to {}", self.rows.len(), path.display());
        Ok(path)
    }
}

/// A single path component safe to create inside an output directory.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.chars().all(|c| c == '.') {
        "export".to_string()
    } else {
        trimmed.to_string()
    }
}

/// In-memory registrar: keeps the last published table, flattened.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    current: Mutex<Option<ExportTable>>,
    publishes: AtomicUsize,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last published export, if any.
    pub fn snapshot(&self) -> Option<ExportTable> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Save the current export as CSV into `dir`.
    pub fn save_csv(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        self.snapshot().ok_or(ExportError::Empty)?.save_csv(dir)
    }
}

impl<T> ExportRegistrar<T> for ExportRegistry {
    fn publish(&self, data: &[T], columns: &[ExportColumn<T>], file_name: &str) {
        let table = ExportTable::project(data, columns, file_name);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(table);
        self.publishes.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Bridge
// =============================================================================

/// Inputs of one export sync.
pub struct ExportInput<'a, T> {
    pub data: &'a [T],
    pub columns: &'a [Column<T>],
    pub file_name: &'a str,
    pub is_loading: bool,
}

/// Publishes to a registrar only when the fingerprint changes.
#[derive(Debug, Default)]
pub struct ExportBridge {
    policy: FingerprintPolicy,
    last: Option<String>,
}

impl ExportBridge {
    pub fn new(policy: FingerprintPolicy) -> Self {
        Self { policy, last: None }
    }

    /// Fingerprint of the last successful publish.
    pub fn last_fingerprint(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Publish if the table shows data and the fingerprint changed.
    ///
    /// Returns `true` when the registrar was called. With no registrar this
    /// does nothing.
    pub fn sync<T: Record + 'static>(
        &mut self,
        registrar: Option<&dyn ExportRegistrar<T>>,
        input: ExportInput<'_, T>,
    ) -> bool {
        if input.is_loading || input.data.is_empty() {
            return false;
        }
        let Some(registrar) = registrar else {
            return false;
        };

        let fingerprint = fingerprint(self.policy, input.data, input.columns, input.file_name);
        if self.last.as_deref() == Some(fingerprint.as_str()) {
            log::trace!("export unchanged ({fingerprint}), skipping publish");
            return false;
        }

        let columns = export_columns(input.columns);
        registrar.publish(input.data, &columns, input.file_name);
        log::debug!(
            "export published: {} rows, {} columns as '{}'",
            input.data.len(),
            columns.len(),
            input.file_name
        );
        self.last = Some(fingerprint);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use serde_json::{json, Value};

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::computed("Name", |r: &Value| Element::text(r["name"].as_str().unwrap_or(""))),
            Column::field("Email", "email"),
            Column::field("Secret", "secret").hide_in_export(),
        ]
    }

    #[test]
    fn test_hidden_columns_are_not_exported() {
        let headers: Vec<_> = export_columns(&columns()).into_iter().map(|c| c.header).collect();
        assert_eq!(headers, vec!["Name", "Email"]);
    }

    #[test]
    fn test_duplicate_header_last_column_wins() {
        let cols: Vec<Column<Value>> = vec![
            Column::field("Contact", "email"),
            Column::field("Plan", "plan"),
            Column::field("Contact", "phone"),
        ];
        let export = export_columns(&cols);
        let record = json!({ "email": "a@x.com", "phone": "555", "plan": "pro" });
        assert_eq!(export.len(), 2);
        assert_eq!(export[0].header, "Contact");
        assert_eq!(export[0].value(&record), CellValue::from("555"));
    }

    #[test]
    fn test_shape_fingerprint_ignores_content() {
        let a = vec![json!({ "email": "a@x.com" })];
        let b = vec![json!({ "email": "b@x.com" })];
        let cols = columns();
        assert_eq!(
            fingerprint(FingerprintPolicy::Shape, &a, &cols, "tenants"),
            fingerprint(FingerprintPolicy::Shape, &b, &cols, "tenants"),
        );
        assert_ne!(
            fingerprint(FingerprintPolicy::Content, &a, &cols, "tenants"),
            fingerprint(FingerprintPolicy::Content, &b, &cols, "tenants"),
        );
    }

    #[test]
    fn test_csv_output() {
        let table = ExportTable {
            file_name: "tenants".into(),
            headers: vec!["Name".into(), "Seats".into()],
            rows: vec![vec!["Acme, Inc".into(), CellValue::Int(4)]],
        };
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Name,Seats\n\"Acme, Inc\",4\n");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_file_name("  "), "export");
        assert_eq!(sanitize_file_name(".."), "export");
        assert_eq!(sanitize_file_name("../up/x"), ".._up_x");
    }
}
