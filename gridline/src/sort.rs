//! Single-column sort state and the header click rule.
//!
//! The table never reorders rows. Clicking a sortable header only computes
//! the next [`SortState`] and reports it; the data owner sorts and re-renders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active sort: one column, one direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    /// Sort key of the active column.
    pub column: String,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortOrder::Desc)
    }
}

/// What a header shows for its sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Unset,
    Active(SortOrder),
}

impl SortIndicator {
    pub fn of(current: Option<&SortState>, key: &str) -> Self {
        match current {
            Some(state) if state.column == key => SortIndicator::Active(state.order),
            _ => SortIndicator::Unset,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            SortIndicator::Unset => "",
            SortIndicator::Active(SortOrder::Asc) => "↑",
            SortIndicator::Active(SortOrder::Desc) => "↓",
        }
    }
}

/// Sort that results from clicking the header with `key`.
///
/// A new key starts ascending; the active key flips direction. There is no
/// click that clears the sort.
pub fn next_sort(current: Option<&SortState>, key: &str) -> SortState {
    match current {
        Some(state) if state.column == key => SortState::new(key, state.order.toggled()),
        _ => SortState::asc(key),
    }
}

/// Turns header clicks into sort-change requests for the data owner.
pub struct SortCoordinator<'a> {
    current: Option<&'a SortState>,
    on_change: Option<&'a dyn Fn(&str, SortOrder)>,
}

impl<'a> SortCoordinator<'a> {
    pub fn new(
        current: Option<&'a SortState>,
        on_change: Option<&'a dyn Fn(&str, SortOrder)>,
    ) -> Self {
        Self { current, on_change }
    }

    pub fn indicator(&self, key: &str) -> SortIndicator {
        SortIndicator::of(self.current, key)
    }

    /// Compute the next sort for `key` and emit it.
    ///
    /// Returns the requested state, or `None` when nobody listens.
    pub fn click(&self, key: &str) -> Option<SortState> {
        let on_change = self.on_change?;
        let next = next_sort(self.current, key);
        log::debug!("sort requested: {} {}", next.column, next.order);
        on_change(&next.column, next.order);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_key_starts_ascending() {
        assert_eq!(next_sort(None, "name"), SortState::asc("name"));
        assert_eq!(
            next_sort(Some(&SortState::desc("email")), "name"),
            SortState::asc("name")
        );
    }

    #[test]
    fn test_active_key_toggles() {
        assert_eq!(
            next_sort(Some(&SortState::asc("name")), "name"),
            SortState::desc("name")
        );
        assert_eq!(
            next_sort(Some(&SortState::desc("name")), "name"),
            SortState::asc("name")
        );
    }

    #[test]
    fn test_indicator_only_for_active_key() {
        let current = SortState::desc("name");
        assert_eq!(SortIndicator::of(Some(&current), "name").glyph(), "↓");
        assert_eq!(SortIndicator::of(Some(&current), "email"), SortIndicator::Unset);
    }
}
