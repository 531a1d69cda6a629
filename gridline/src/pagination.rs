//! Page navigation over server-supplied pagination metadata.
//!
//! The navigator never fetches and never updates the displayed page itself:
//! it reports the requested page number and waits for the owner to render
//! again with new metadata.

use serde::{Deserialize, Serialize};

use crate::config::Labels;

/// Server-computed pagination metadata for the current page.
///
/// `from` and `to` are `null` in server responses for empty result sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
}

impl PaginationMeta {
    /// Whether there is more than one page. Single-page results show no
    /// navigation at all.
    pub fn has_pages(&self) -> bool {
        self.last_page > 1
    }

    pub fn summary(&self, labels: &Labels) -> String {
        labels.summary(self.from.unwrap_or(0), self.to.unwrap_or(0), self.total)
    }

    pub fn page_label(&self, labels: &Labels) -> String {
        labels.page(self.current_page, self.last_page)
    }
}

/// A navigation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageControl {
    First,
    Previous,
    Next,
    Last,
}

impl PageControl {
    pub const ALL: [PageControl; 4] = [
        PageControl::First,
        PageControl::Previous,
        PageControl::Next,
        PageControl::Last,
    ];

    /// Page this control navigates to.
    pub fn target(self, meta: &PaginationMeta) -> u32 {
        match self {
            PageControl::First => 1,
            PageControl::Previous => meta.current_page.saturating_sub(1).max(1),
            PageControl::Next => meta.current_page.saturating_add(1).min(meta.last_page),
            PageControl::Last => meta.last_page,
        }
    }

    pub fn is_enabled(self, meta: &PaginationMeta) -> bool {
        match self {
            PageControl::First | PageControl::Previous => meta.current_page > 1,
            PageControl::Next | PageControl::Last => meta.current_page < meta.last_page,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            PageControl::First => "«",
            PageControl::Previous => "‹",
            PageControl::Next => "›",
            PageControl::Last => "»",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            PageControl::First => "first",
            PageControl::Previous => "previous",
            PageControl::Next => "next",
            PageControl::Last => "last",
        }
    }
}

/// Turns control presses into page-change requests.
pub struct PaginationNavigator<'a> {
    meta: &'a PaginationMeta,
    on_page_change: Option<&'a dyn Fn(u32)>,
}

impl<'a> PaginationNavigator<'a> {
    pub fn new(meta: &'a PaginationMeta, on_page_change: Option<&'a dyn Fn(u32)>) -> Self {
        Self {
            meta,
            on_page_change,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.meta.has_pages()
    }

    /// Emit the target page of `control`.
    ///
    /// Disabled controls emit nothing and return `None`.
    pub fn press(&self, control: PageControl) -> Option<u32> {
        if !control.is_enabled(self.meta) {
            return None;
        }
        let on_page_change = self.on_page_change?;
        let page = control.target(self.meta);
        log::debug!("page requested: {page} via {}", control.slug());
        on_page_change(page);
        Some(page)
    }
}
