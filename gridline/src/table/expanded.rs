//! Grid presentation: sticky header, one row per record, one cell per column.

use crate::column::{Column, Record};
use crate::element::{Color, Element, Role, Size, Style};
use crate::sort::SortIndicator;

use super::{cell, TableEvent, ViewContext};

pub(super) fn grid<T: Record>(cx: &ViewContext<'_, '_, T>) -> Element {
    let header = Element::row()
        .id(format!("{}-header", cx.id))
        .role(Role::HeaderRow)
        .gap(1)
        .sticky(true)
        .style(Style::new().bold().background(Color::var("table.header_bg")))
        .children(
            cx.props
                .columns
                .iter()
                .enumerate()
                .map(|(c, column)| header_cell(cx, c, column)),
        );

    let rows = cx.props.data.iter().enumerate().map(|(i, record)| {
        Element::row()
            .id(format!("{}-row-{i}", cx.id))
            .role(Role::Row)
            .gap(1)
            .children(cx.props.columns.iter().enumerate().map(|(c, column)| {
                let content = cell::content(column, record, &cx.config.placeholder);
                cell::classed(
                    Element::box_()
                        .id(format!("{}-cell-{i}-{c}", cx.id))
                        .role(Role::Cell)
                        .width(column.width.into())
                        .child(content),
                    column,
                )
            }))
    });

    Element::col()
        .id(format!("{}-grid", cx.id))
        .role(Role::Grid)
        .child(header)
        .children(rows)
}

fn header_cell<T>(cx: &ViewContext<'_, '_, T>, index: usize, column: &Column<T>) -> Element {
    let mut th = Element::row()
        .id(format!("{}-th-{index}", cx.id))
        .role(Role::HeaderCell)
        .width(column.width.into())
        .gap(1)
        .child(Element::text(column.header.as_str()).width(Size::Auto));

    if let Some(key) = column.sort_target() {
        let glyph = SortIndicator::of(cx.props.current_sort, key).glyph();
        if !glyph.is_empty() {
            th = th.child(Element::text(glyph).width(Size::Auto));
        }
        // Only clickable when someone listens for sort changes.
        if cx.props.on_sort_change.is_some() {
            th = th
                .on_activate(TableEvent::Sort(key.to_string()))
                .style(Style::new().underline());
        }
    }
    cell::classed(th, column)
}
