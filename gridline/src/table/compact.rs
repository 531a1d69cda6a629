//! Card presentation for narrow viewports.
//!
//! Column 0 is the card's primary line and column 1 its secondary line; both
//! are always shown. Columns 2.. are revealed per card by the expand toggle.
//! Row operations live in an action sheet scoped to one record.

use crate::column::Record;
use crate::element::{Color, Element, Role, Size, Style};

use super::{cell, TableEvent, ViewContext};

pub(super) fn cards<T: Record>(cx: &ViewContext<'_, '_, T>) -> Element {
    Element::col()
        .id(format!("{}-cards", cx.id))
        .role(Role::CardList)
        .gap(1)
        .children(
            cx.props
                .data
                .iter()
                .enumerate()
                .map(|(i, record)| card(cx, i, record)),
        )
}

fn card<T: Record>(cx: &ViewContext<'_, '_, T>, index: usize, record: &T) -> Element {
    let columns = cx.props.columns;
    let labels = &cx.config.labels;
    let expandable = columns.len() > 2;
    let expanded = expandable && cx.state.is_expanded(index);

    let mut summary = Element::row().gap(1);
    if let Some(column) = columns.first() {
        summary = summary.child(cell::classed(
            Element::box_()
                .role(Role::CardPrimary)
                .width(Size::Fill)
                .style(Style::new().bold())
                .child(cell::content(column, record, &cx.config.placeholder)),
            column,
        ));
    }
    if expandable {
        let glyph = if expanded { &labels.collapse } else { &labels.expand };
        summary = summary.child(
            Element::button(glyph.as_str(), TableEvent::ToggleRow(index))
                .id(format!("{}-toggle-{index}", cx.id))
                .role(Role::ExpandToggle),
        );
    }
    if cx.props.has_row_actions() {
        summary = summary.child(
            Element::button(labels.actions.as_str(), TableEvent::OpenActions(index))
                .id(format!("{}-actions-{index}", cx.id))
                .role(Role::ActionTrigger),
        );
    }

    let mut card = Element::col()
        .id(format!("{}-card-{index}", cx.id))
        .role(Role::Card)
        .child(summary);

    if let Some(column) = columns.get(1) {
        card = card.child(cell::classed(
            Element::box_()
                .role(Role::CardSecondary)
                .style(Style::new().dim())
                .child(cell::content(column, record, &cx.config.placeholder)),
            column,
        ));
    }

    if expanded {
        card = card.children(columns.iter().skip(2).map(|column| {
            cell::classed(
                Element::row()
                    .role(Role::CardDetail)
                    .indent(2)
                    .gap(1)
                    .child(
                        Element::text(format!("{}:", column.header))
                            .width(Size::Auto)
                            .style(Style::new().dim()),
                    )
                    .child(
                        Element::box_()
                            .width(Size::Fill)
                            .child(cell::content(column, record, &cx.config.placeholder)),
                    ),
                column,
            )
        }));
    }
    card
}

/// Sheet of row operations for the record at `index`.
///
/// Only operations with a callback are offered. Returns `None` when the index
/// is out of range.
pub(super) fn action_sheet<T: Record>(
    cx: &ViewContext<'_, '_, T>,
    index: usize,
) -> Option<Element> {
    let record = cx.props.data.get(index)?;
    let labels = &cx.config.labels;
    let props = cx.props;

    let mut buttons = Vec::new();
    if props.on_view.is_some() {
        buttons.push(
            Element::button(labels.view.as_str(), TableEvent::View(index))
                .id(format!("{}-sheet-view", cx.id)),
        );
    }
    if props.on_edit.is_some() {
        buttons.push(
            Element::button(labels.edit.as_str(), TableEvent::Edit(index))
                .id(format!("{}-sheet-edit", cx.id)),
        );
    }
    if props.on_delete.is_some() {
        buttons.push(
            Element::button(labels.delete.as_str(), TableEvent::Delete(index))
                .id(format!("{}-sheet-delete", cx.id))
                .class("destructive")
                .style(Style::new().foreground(Color::var("danger")).bold()),
        );
    }
    buttons.push(
        Element::button(labels.cancel.as_str(), TableEvent::CloseActions)
            .id(format!("{}-sheet-cancel", cx.id)),
    );

    let title = props
        .columns
        .first()
        .map(|column| cell::content(column, record, &cx.config.placeholder))
        .unwrap_or_default();

    Some(
        Element::col()
            .id(format!("{}-sheet", cx.id))
            .role(Role::ActionSheet)
            .style(Style::new().background(Color::var("sheet.bg")))
            .child(Element::box_().style(Style::new().bold()).child(title))
            .child(Element::row().gap(2).children(buttons)),
    )
}
