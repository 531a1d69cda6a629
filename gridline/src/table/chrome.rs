//! Everything around the rows: skeleton, empty panel, print bar, pagination.

use crate::column::Record;
use crate::element::{Color, Element, Role, Size, Style};
use crate::pagination::{PageControl, PaginationMeta};
use crate::viewport::PresentationMode;

use super::{TableEvent, ViewContext};

const SKELETON_BAR: &str = "░░░░░░░░";

/// Fixed-count placeholder rows. Carries no data.
pub(super) fn skeleton<T>(cx: &ViewContext<'_, '_, T>, mode: PresentationMode) -> Element {
    let style = Style::new().foreground(Color::var("skeleton")).dim();
    let cells = match mode {
        PresentationMode::Expanded => cx.props.columns.len().max(1),
        PresentationMode::Compact => 1,
    };
    let rows = (0..cx.config.skeleton_rows).map(|i| {
        Element::row()
            .id(format!("{}-skeleton-{i}", cx.id))
            .gap(1)
            .children((0..cells).map(|_| {
                Element::text(SKELETON_BAR)
                    .width(Size::Flex(1))
                    .style(style.clone())
            }))
    });
    Element::col()
        .id(format!("{}-skeleton", cx.id))
        .role(Role::Skeleton)
        .children(rows)
}

pub(super) fn empty<T>(cx: &ViewContext<'_, '_, T>) -> Element {
    Element::col()
        .id(format!("{}-empty", cx.id))
        .role(Role::Empty)
        .child(Element::text(cx.props.empty_message.as_str()).style(Style::new().italic().dim()))
}

pub(super) fn print_bar<T: Record>(cx: &ViewContext<'_, '_, T>, printing: bool) -> Element {
    let labels = &cx.config.labels;
    let label = if printing { &labels.printing } else { &labels.print };
    Element::row()
        .id(format!("{}-toolbar", cx.id))
        .role(Role::Toolbar)
        .child(Element::box_().width(Size::Fill))
        .child(
            Element::button(label.as_str(), TableEvent::Print)
                .id(format!("{}-print", cx.id))
                .disabled(printing),
        )
}

/// Summary plus the four navigation controls. `None` for a single page.
pub(super) fn pagination<T>(cx: &ViewContext<'_, '_, T>, meta: &PaginationMeta) -> Option<Element> {
    if !meta.has_pages() {
        return None;
    }
    let labels = &cx.config.labels;
    let control = |control: PageControl| {
        Element::button(control.glyph(), TableEvent::Page(control))
            .id(format!("{}-page-{}", cx.id, control.slug()))
            .disabled(!control.is_enabled(meta))
    };

    Some(
        Element::row()
            .id(format!("{}-pagination", cx.id))
            .role(Role::Pagination)
            .gap(1)
            .child(
                Element::text(meta.summary(labels))
                    .role(Role::PageSummary)
                    .width(Size::Fill)
                    .style(Style::new().dim()),
            )
            .child(control(PageControl::First))
            .child(control(PageControl::Previous))
            .child(Element::text(meta.page_label(labels)).width(Size::Auto))
            .child(control(PageControl::Next))
            .child(control(PageControl::Last)),
    )
}
