//! Table configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::export::FingerprintPolicy;
use crate::viewport::DEFAULT_BREAKPOINT;

/// Per-table configuration.
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides.
///
/// # Example
///
/// ```
/// use gridline::TableConfig;
///
/// let config = TableConfig::from_json(r#"{ "breakpoint": 100 }"#).unwrap();
/// assert_eq!(config.breakpoint, 100);
/// assert_eq!(config.skeleton_rows, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Widths below this use the compact presentation.
    pub breakpoint: u16,

    /// Placeholder rows shown while loading.
    pub skeleton_rows: usize,

    /// How long the printing indicator lingers after printing finishes.
    pub print_reset_delay_ms: u64,

    /// Shown in cells whose accessor cannot produce a value.
    pub placeholder: String,

    /// What the export fingerprint covers.
    pub fingerprint: FingerprintPolicy,

    pub labels: Labels,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            breakpoint: DEFAULT_BREAKPOINT,
            skeleton_rows: 5,
            print_reset_delay_ms: 300,
            placeholder: "-".to_string(),
            fingerprint: FingerprintPolicy::default(),
            labels: Labels::default(),
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.breakpoint == 0 {
            return Err(ConfigError::Invalid {
                field: "breakpoint",
                reason: "must be greater than zero".into(),
            });
        }
        if self.skeleton_rows == 0 {
            return Err(ConfigError::Invalid {
                field: "skeleton_rows",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn print_reset_delay(&self) -> Duration {
        Duration::from_millis(self.print_reset_delay_ms)
    }

    pub fn breakpoint(mut self, breakpoint: u16) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn skeleton_rows(mut self, rows: usize) -> Self {
        self.skeleton_rows = rows;
        self
    }

    pub fn print_reset_delay_ms(mut self, ms: u64) -> Self {
        self.print_reset_delay_ms = ms;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn fingerprint(mut self, policy: FingerprintPolicy) -> Self {
        self.fingerprint = policy;
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// User-visible strings.
///
/// `summary` understands `{from}`, `{to}` and `{total}`; `page` understands
/// `{current}` and `{last}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub export_action: String,
    pub summary: String,
    pub page: String,
    pub view: String,
    pub edit: String,
    pub delete: String,
    pub cancel: String,
    pub actions: String,
    pub print: String,
    pub printing: String,
    pub expand: String,
    pub collapse: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            export_action: "Export data".into(),
            summary: "{from}-{to} of {total} records".into(),
            page: "Page {current} of {last}".into(),
            view: "View".into(),
            edit: "Edit".into(),
            delete: "Delete".into(),
            cancel: "Cancel".into(),
            actions: "⋯".into(),
            print: "Print".into(),
            printing: "Printing…".into(),
            expand: "▶".into(),
            collapse: "▼".into(),
        }
    }
}

impl Labels {
    pub fn summary(&self, from: u64, to: u64, total: u64) -> String {
        self.summary
            .replace("{from}", &from.to_string())
            .replace("{to}", &to.to_string())
            .replace("{total}", &total.to_string())
    }

    pub fn page(&self, current: u32, last: u32) -> String {
        self.page
            .replace("{current}", &current.to_string())
            .replace("{last}", &last.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TableConfig::from_json(
            r#"{ "placeholder": "n/a", "fingerprint": "content", "labels": { "view": "Open" } }"#,
        )
        .unwrap();
        assert_eq!(config.placeholder, "n/a");
        assert_eq!(config.fingerprint, FingerprintPolicy::Content);
        assert_eq!(config.labels.view, "Open");
        assert_eq!(config.labels.edit, "Edit");
        assert_eq!(config.breakpoint, DEFAULT_BREAKPOINT);
    }

    #[test]
    fn test_zero_breakpoint_is_rejected() {
        let err = TableConfig::from_json(r#"{ "breakpoint": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "breakpoint", .. }));
    }

    #[test]
    fn test_labels_fill_placeholders() {
        let labels = Labels::default();
        assert_eq!(labels.summary(11, 20, 23), "11-20 of 23 records");
        assert_eq!(labels.page(2, 3), "Page 2 of 3");
    }
}
