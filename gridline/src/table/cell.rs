use crate::column::{Column, Record};
use crate::element::{Element, Role, Style};
use crate::error::CellError;

/// Content of one cell, or a placeholder if the accessor fails.
pub(super) fn content<T: Record>(column: &Column<T>, record: &T, placeholder: &str) -> Element {
    match column.accessor.resolve(record) {
        Ok(element) => element,
        Err(err) => {
            match &err {
                CellError::MissingField(_) => log::debug!("column '{}': {err}", column.header),
                _ => log::warn!("column '{}': {err}; showing placeholder", column.header),
            }
            Element::text(placeholder)
                .role(Role::Placeholder)
                .style(Style::new().dim())
        }
    }
}

/// Apply the column's class, if any.
pub(super) fn classed<T>(element: Element, column: &Column<T>) -> Element {
    match &column.class_name {
        Some(class) => element.class(class.clone()),
        None => element,
    }
}
