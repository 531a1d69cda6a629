//! Output tree produced by the table engine.
//!
//! The engine never draws anything itself. It builds an [`Element`] tree
//! describing structure, sizing, semantic roles and interactions, and a host
//! (the text renderer in [`crate::render`], a terminal, a test) decides how to
//! show it. Interactive elements carry a [`TableEvent`] the host hands back to
//! [`crate::DataTable::handle`] when the element is activated.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::table::TableEvent;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

// =============================================================================
// Style
// =============================================================================

/// A color, either a theme variable or a literal RGB value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    /// Named theme variable such as `"table.header_bg"` or `"danger"`.
    Var(String),
    /// Literal color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn var(name: impl Into<String>) -> Self {
        Color::Var(name.into())
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(r, g, b)
    }
}

/// Visual attributes of an element.
///
/// Styles cascade: a child's style is layered on top of its parent's with
/// [`Style::merge`], so only the attributes a child sets override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Layer `other` on top of `self`.
    pub fn merge(&self, other: &Style) -> Style {
        Style {
            foreground: other.foreground.clone().or_else(|| self.foreground.clone()),
            background: other.background.clone().or_else(|| self.background.clone()),
            bold: self.bold || other.bold,
            dim: self.dim || other.dim,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            reverse: self.reverse || other.reverse,
        }
    }
}

// =============================================================================
// Layout enums
// =============================================================================

/// Width of an element inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Size {
    /// Exactly this many cells.
    Fixed(u16),
    /// Share of the space left after fixed and auto children.
    Flex(u16),
    /// Natural width of the content.
    #[default]
    Auto,
    /// Equivalent to `Flex(1)`.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Row,
    #[default]
    Column,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Content {
    #[default]
    None,
    Text(String),
}

/// Semantic role of an element, for hosts and tests that need to find the
/// parts of a table without depending on generated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    None,
    Table,
    Grid,
    HeaderRow,
    HeaderCell,
    Row,
    Cell,
    CardList,
    Card,
    CardPrimary,
    CardSecondary,
    CardDetail,
    ExpandToggle,
    ActionTrigger,
    ActionSheet,
    Button,
    Pagination,
    PageSummary,
    Skeleton,
    Empty,
    Toolbar,
    Placeholder,
}

// =============================================================================
// Element
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub id: String,
    pub role: Role,
    pub content: Content,
    pub direction: Direction,
    pub width: Size,
    /// Blank cells (rows) or lines (columns) between children.
    pub gap: u16,
    /// Left indentation applied to every line of this element.
    pub indent: u16,
    pub style: Style,
    /// Stays visible while the surrounding content scrolls vertically.
    pub sticky: bool,
    pub disabled: bool,
    pub on_activate: Option<TableEvent>,
    pub classes: Vec<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn box_() -> Self {
        Self {
            id: generate_id("box"),
            ..Default::default()
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: generate_id("text"),
            content: Content::Text(content.into()),
            ..Default::default()
        }
    }

    pub fn col() -> Self {
        Self {
            id: generate_id("col"),
            direction: Direction::Column,
            ..Default::default()
        }
    }

    pub fn row() -> Self {
        Self {
            id: generate_id("row"),
            direction: Direction::Row,
            ..Default::default()
        }
    }

    /// A clickable text element.
    pub fn button(label: impl Into<String>, event: TableEvent) -> Self {
        Self {
            id: generate_id("button"),
            role: Role::Button,
            content: Content::Text(format!("[{}]", label.into())),
            on_activate: Some(event),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn width(mut self, width: Size) -> Self {
        self.width = width;
        self
    }

    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn indent(mut self, indent: u16) -> Self {
        self.indent = indent;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = self.style.merge(&style);
        self
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_activate(mut self, event: TableEvent) -> Self {
        self.on_activate = Some(event);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Whether activating this element does something.
    pub fn is_interactive(&self) -> bool {
        self.on_activate.is_some() && !self.disabled
    }

    /// Depth-first, pre-order traversal including `self`.
    pub fn walk(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(el.children.iter().rev());
        }
        out
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.walk().into_iter().find(|el| el.id == id)
    }

    pub fn find_all(&self, role: Role) -> Vec<&Element> {
        self.walk().into_iter().filter(|el| el.role == role).collect()
    }

    pub fn contains_role(&self, role: Role) -> bool {
        self.walk().iter().any(|el| el.role == role)
    }

    /// All text in this subtree, joined with single spaces.
    pub fn text_content(&self) -> String {
        self.walk()
            .into_iter()
            .filter_map(|el| match &el.content {
                Content::Text(t) if !t.is_empty() => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Ids of interactive elements in document order, for keyboard focus.
    pub fn focus_order(&self) -> Vec<String> {
        self.walk()
            .into_iter()
            .filter(|el| el.is_interactive())
            .map(|el| el.id.clone())
            .collect()
    }

    /// Event attached to the interactive element with this id.
    pub fn event_for(&self, id: &str) -> Option<TableEvent> {
        self.find(id)
            .filter(|el| el.is_interactive())
            .and_then(|el| el.on_activate.clone())
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Element::text(text)
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Element::text(text)
    }
}
