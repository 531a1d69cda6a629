//! The tenant record and the columns the tenants screen shows.

use std::fmt;

use chrono::NaiveDate;
use gridline::{CellValue, Color, Column, Element, Record, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Plan {
    Free,
    Team,
    Enterprise,
}

impl Plan {
    fn color(self) -> Color {
        match self {
            Plan::Free => Color::var("muted"),
            Plan::Team => Color::var("info"),
            Plan::Enterprise => Color::var("accent"),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => f.write_str("free"),
            Plan::Team => f.write_str("team"),
            Plan::Enterprise => f.write_str("enterprise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub plan: Plan,
    pub seats: u32,
    pub created: NaiveDate,
    pub archived: bool,
}

impl Record for Tenant {
    fn field(&self, name: &str) -> Option<CellValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "email" => Some(self.email.as_str().into()),
            "plan" => Some(self.plan.to_string().into()),
            "seats" => Some(self.seats.into()),
            "created" => Some(self.created.format("%Y-%m-%d").to_string().into()),
            _ => None,
        }
    }
}

pub fn columns() -> Vec<Column<Tenant>> {
    vec![
        Column::computed("Name", |t: &Tenant| {
            if t.archived {
                Element::text(format!("{} (archived)", t.name)).style(Style::new().dim().italic())
            } else {
                Element::text(t.name.as_str())
            }
        })
        .export_with(|t: &Tenant| t.name.as_str().into())
        .sortable("name")
        .flex(2),
        Column::field("Email", "email").sortable("email").flex(2),
        Column::computed("Plan", |t: &Tenant| {
            Element::text(t.plan.to_string()).style(Style::new().foreground(t.plan.color()))
        })
        .export_with(|t: &Tenant| t.plan.to_string().into())
        .sortable("plan")
        .fixed(10),
        Column::field("Seats", "seats").sortable("seats").fixed(6),
        Column::computed("Created", |t: &Tenant| t.created.format("%d %b %Y").to_string())
            .export_with(|t: &Tenant| t.created.format("%Y-%m-%d").to_string().into())
            .sortable("created")
            .fixed(11),
        Column::computed("Status", |t: &Tenant| if t.archived { "archived" } else { "active" })
            .hide_in_export()
            .class("status")
            .fixed(8),
    ]
}
