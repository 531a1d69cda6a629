//! Row state owned by a table instance.

use std::collections::HashSet;

/// Transient per-row UI state.
///
/// Row indices refer to positions in the current dataset. Rows are never
/// reordered client-side, and a new dataset clears everything, so an index
/// stays valid for as long as it is stored.
#[derive(Debug, Default)]
pub struct TableState {
    expanded: HashSet<usize>,
    action_sheet: Option<usize>,
    dataset: Option<DatasetIdentity>,
}

/// How the last shown dataset is recognised.
///
/// An owner key wins. Without one the slice address and length are used,
/// which cannot tell apart a refill in place or a new allocation at a reused
/// address, so a loading frame also forgets the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatasetIdentity {
    Key(u64),
    Slice(usize, usize),
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn expanded(&self) -> &HashSet<usize> {
        &self.expanded
    }

    /// Flip `index` in or out of the expanded set.
    pub fn toggle(&mut self, index: usize) -> bool {
        if !self.expanded.remove(&index) {
            self.expanded.insert(index);
        }
        self.is_expanded(index)
    }

    pub fn action_sheet(&self) -> Option<usize> {
        self.action_sheet
    }

    pub fn open_sheet(&mut self, index: usize) {
        self.action_sheet = Some(index);
    }

    pub fn close_sheet(&mut self) -> bool {
        self.action_sheet.take().is_some()
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
        self.action_sheet = None;
    }

    /// Note the dataset being shown. A different dataset than last time
    /// clears all row state.
    ///
    /// Returns `true` when a previously seen dataset was replaced.
    pub fn observe_dataset<T>(&mut self, data: &[T], key: Option<u64>) -> bool {
        let identity = match key {
            Some(key) => DatasetIdentity::Key(key),
            None => DatasetIdentity::Slice(data.as_ptr() as usize, data.len()),
        };
        match self.dataset.replace(identity) {
            Some(previous) if previous == identity => false,
            Some(_) => {
                self.clear();
                true
            }
            None => false,
        }
    }

    /// Drop the dataset identity and all row state, as while a new page is
    /// loading. Returns `true` when any row state was cleared.
    pub fn forget_dataset(&mut self) -> bool {
        self.dataset = None;
        let had_rows = !self.expanded.is_empty() || self.action_sheet.is_some();
        self.clear();
        had_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_membership() {
        let mut state = TableState::new();
        assert!(state.toggle(3));
        assert!(state.is_expanded(3));
        assert!(!state.toggle(3));
        assert!(state.expanded().is_empty());
    }

    #[test]
    fn test_new_dataset_clears_rows() {
        let first = vec![1, 2, 3];
        let second = vec![4, 5, 6];
        let mut state = TableState::new();

        assert!(!state.observe_dataset(&first, None));
        state.toggle(1);
        state.open_sheet(2);
        assert!(!state.observe_dataset(&first, None));
        assert!(state.is_expanded(1));

        assert!(state.observe_dataset(&second, None));
        assert!(state.expanded().is_empty());
        assert_eq!(state.action_sheet(), None);
    }

    #[test]
    fn test_key_change_clears_rows_at_same_address() {
        let mut rows = vec![1, 2, 3];
        let mut state = TableState::new();

        assert!(!state.observe_dataset(&rows, Some(1)));
        state.toggle(0);

        rows.clear();
        rows.extend([7, 8, 9]);
        assert!(state.observe_dataset(&rows, Some(2)));
        assert!(state.expanded().is_empty());
    }

    #[test]
    fn test_same_key_keeps_rows_across_reallocation() {
        let first = vec![1, 2, 3];
        let second = vec![1, 2, 3, 4];
        let mut state = TableState::new();

        state.observe_dataset(&first, Some(5));
        state.toggle(2);
        assert!(!state.observe_dataset(&second, Some(5)));
        assert!(state.is_expanded(2));
    }

    #[test]
    fn test_forget_dataset_clears_rows_and_identity() {
        let rows = vec![1, 2, 3];
        let mut state = TableState::new();

        state.observe_dataset(&rows, None);
        assert!(!state.forget_dataset());
        state.observe_dataset(&rows, None);
        state.open_sheet(1);
        assert!(state.forget_dataset());
        assert_eq!(state.action_sheet(), None);
        // First sighting after a forget is not a replacement.
        assert!(!state.observe_dataset(&rows, None));
    }
}
