//! Text renderer: lays an [`Element`] tree out into styled lines.
//!
//! Columns stack their children and rows split their width by [`Size`].
//! Overlong text is truncated with an ellipsis. Widths are measured in
//! terminal cells with `unicode-width`.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::element::{Content, Direction, Element, Size, Style};

pub fn display_width(s: &str) -> usize {
    s.width()
}

pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width - 1;
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = char_width(ch);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

// =============================================================================
// Output
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
    /// Pinned to the top once scrolled past.
    pub sticky: bool,
    /// Ids of interactive elements that start on this line.
    pub anchors: Vec<String>,
}

impl Line {
    fn styled(text: String, style: Style) -> Self {
        Self {
            spans: vec![Span { text, style }],
            ..Default::default()
        }
    }

    fn push(&mut self, text: String, style: Style) {
        if text.is_empty() {
            return;
        }
        self.spans.push(Span { text, style });
    }

    fn pad_to(&mut self, width: usize, style: &Style) {
        let current = self.width();
        if current < width {
            self.push(" ".repeat(width - current), style.clone());
        }
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| display_width(&s.text)).sum()
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Rendered lines of a tree.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// All lines as plain text, trailing spaces removed.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Index of the line where the element with this id starts.
    pub fn line_of(&self, id: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.anchors.iter().any(|a| a == id))
    }

    /// Lines visible in a window of `height` lines scrolled by `offset`.
    ///
    /// Sticky lines scrolled past stay pinned at the top of the window.
    pub fn viewport(&self, height: usize, offset: usize) -> Vec<&Line> {
        let offset = offset.min(self.lines.len());
        let pinned: Vec<&Line> = self.lines[..offset].iter().filter(|l| l.sticky).collect();
        let room = height.saturating_sub(pinned.len());
        pinned
            .into_iter()
            .chain(self.lines[offset..].iter().take(room))
            .take(height)
            .collect()
    }
}

// =============================================================================
// Layout
// =============================================================================

pub fn render(root: &Element, width: u16) -> Frame {
    render_with_focus(root, width, None)
}

/// Render with the element `focused` shown in reverse video.
pub fn render_with_focus(root: &Element, width: u16, focused: Option<&str>) -> Frame {
    let renderer = Renderer { focused };
    Frame {
        lines: renderer.element(root, usize::from(width), &Style::default()),
    }
}

struct Renderer<'a> {
    focused: Option<&'a str>,
}

impl Renderer<'_> {
    fn element(&self, el: &Element, width: usize, inherited: &Style) -> Vec<Line> {
        let mut style = inherited.merge(&el.style);
        if el.disabled {
            style = style.merge(&Style::new().dim());
        }
        if self.focused == Some(el.id.as_str()) {
            style = style.merge(&Style::new().reverse());
        }

        let indent = usize::from(el.indent).min(width);
        let inner = width - indent;

        let mut lines = match &el.content {
            Content::Text(text) => {
                vec![Line::styled(truncate_to_width(text, inner), style.clone())]
            }
            Content::None => match el.direction {
                Direction::Column => self.column(el, inner, &style),
                Direction::Row => self.row(el, inner, &style),
            },
        };

        if indent > 0 {
            for line in &mut lines {
                line.spans.insert(
                    0,
                    Span {
                        text: " ".repeat(indent),
                        style: inherited.clone(),
                    },
                );
            }
        }
        if el.sticky {
            for line in &mut lines {
                line.sticky = true;
            }
        }
        if el.is_interactive() {
            if let Some(first) = lines.first_mut() {
                first.anchors.insert(0, el.id.clone());
            }
        }
        lines
    }

    fn column(&self, el: &Element, width: usize, style: &Style) -> Vec<Line> {
        let mut lines = Vec::new();
        for (i, child) in el.children.iter().enumerate() {
            if i > 0 {
                lines.extend((0..el.gap).map(|_| Line::default()));
            }
            lines.extend(self.element(child, width, style));
        }
        lines
    }

    fn row(&self, el: &Element, width: usize, style: &Style) -> Vec<Line> {
        let widths = self.layout_widths(&el.children, width, usize::from(el.gap));
        let rendered: Vec<Vec<Line>> = el
            .children
            .iter()
            .zip(&widths)
            .map(|(child, &w)| self.element(child, w, style))
            .collect();
        let height = rendered.iter().map(Vec::len).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(height);
        for y in 0..height {
            let mut line = Line::default();
            for (i, (child_lines, &w)) in rendered.iter().zip(&widths).enumerate() {
                if i > 0 && el.gap > 0 {
                    line.push(" ".repeat(usize::from(el.gap)), style.clone());
                }
                let start = line.width();
                if let Some(child_line) = child_lines.get(y) {
                    line.spans.extend(child_line.spans.iter().cloned());
                    line.sticky |= child_line.sticky;
                    line.anchors.extend(child_line.anchors.iter().cloned());
                }
                line.pad_to(start + w, style);
            }
            lines.push(line);
        }
        lines
    }

    fn natural_width(&self, el: &Element) -> usize {
        let content = match &el.content {
            Content::Text(text) => display_width(text),
            Content::None => match el.direction {
                Direction::Row => {
                    let sum: usize = el.children.iter().map(|c| self.natural_width(c)).sum();
                    sum + usize::from(el.gap) * el.children.len().saturating_sub(1)
                }
                Direction::Column => el
                    .children
                    .iter()
                    .map(|c| self.natural_width(c))
                    .max()
                    .unwrap_or(0),
            },
        };
        content + usize::from(el.indent)
    }

    /// Split `available` between children: fixed and auto children first, in
    /// order, then the rest by flex weight.
    fn layout_widths(&self, children: &[Element], available: usize, gap: usize) -> Vec<usize> {
        let mut remaining = available.saturating_sub(gap * children.len().saturating_sub(1));
        let mut widths = vec![0; children.len()];
        let mut flex: Vec<(usize, usize)> = Vec::new();

        for (i, child) in children.iter().enumerate() {
            let wanted = match child.width {
                Size::Fixed(w) => usize::from(w),
                Size::Auto => self.natural_width(child),
                Size::Flex(weight) => {
                    flex.push((i, usize::from(weight)));
                    continue;
                }
                Size::Fill => {
                    flex.push((i, 1));
                    continue;
                }
            };
            widths[i] = wanted.min(remaining);
            remaining -= widths[i];
        }

        let total_weight: usize = flex.iter().map(|(_, w)| w).sum();
        if total_weight > 0 {
            let share = remaining;
            let mut given = 0;
            let last = flex.iter().rposition(|(_, w)| *w > 0);
            for (n, &(i, weight)) in flex.iter().enumerate() {
                let w = if Some(n) == last {
                    share - given
                } else {
                    share * weight / total_weight
                };
                widths[i] = w;
                given += w;
            }
        }
        widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn test_row_splits_fixed_and_flex() {
        let row = Element::row()
            .gap(1)
            .child(Element::text("id").width(Size::Fixed(4)))
            .child(Element::text("name").width(Size::Flex(1)))
            .child(Element::text("email").width(Size::Flex(1)));
        let frame = render(&row, 25);
        assert_eq!(frame.lines[0].text(), "id   name      email     ");
        assert_eq!(frame.lines[0].width(), 25);
    }

    #[test]
    fn test_indent_and_gap() {
        let col = Element::col()
            .gap(1)
            .child(Element::text("a"))
            .child(Element::text("b").indent(2));
        assert_eq!(render(&col, 10).text(), "a\n\n  b");
    }

    #[test]
    fn test_sticky_lines_pin_when_scrolled() {
        let col = Element::col()
            .child(Element::text("header").sticky(true))
            .children((0..5).map(|i| Element::text(format!("row {i}"))));
        let frame = render(&col, 20);
        let visible: Vec<String> = frame.viewport(3, 3).iter().map(|l| l.text()).collect();
        let visible: Vec<&str> = visible.iter().map(|s| s.trim_end()).collect();
        assert_eq!(visible, vec!["header", "row 2", "row 3"]);
    }
}
