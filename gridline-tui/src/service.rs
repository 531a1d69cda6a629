//! Simulated tenant backend: sorts and paginates server-side, with latency.

use std::cmp::Ordering;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use gridline::{PaginationMeta, SortOrder, SortState};

use crate::tenant::{Plan, Tenant};

const NAMES: [&str; 12] = [
    "Acme", "Globex", "Initech", "Umbrella", "Hooli", "Stark", "Wayne", "Tyrell", "Cyberdyne",
    "Soylent", "Vandelay", "Wonka",
];
const SUFFIXES: [&str; 4] = ["Labs", "Group", "Retail", "Logistics"];

#[derive(Debug, Clone)]
pub struct PageQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: SortState,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub rows: Vec<Tenant>,
    pub meta: PaginationMeta,
}

pub struct TenantService {
    tenants: RwLock<Vec<Tenant>>,
    latency: Duration,
}

impl TenantService {
    /// A deterministic set of `count` tenants.
    pub fn seeded(count: usize, latency: Duration) -> Self {
        let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap_or_default();
        let tenants = (0..count)
            .map(|i| {
                let suffix = SUFFIXES[(i / NAMES.len()) % SUFFIXES.len()];
                let name = format!("{} {suffix}", NAMES[i % NAMES.len()]);
                let slug = name.to_lowercase().replace(' ', "-");
                Tenant {
                    id: u32::try_from(i + 1).unwrap_or(u32::MAX),
                    email: format!("admin@{slug}.test"),
                    name,
                    plan: match i % 5 {
                        0 | 3 => Plan::Team,
                        1 => Plan::Enterprise,
                        _ => Plan::Free,
                    },
                    seats: u32::try_from((i * 37) % 120 + 1).unwrap_or(1),
                    created: base
                        .checked_add_days(Days::new((i as u64) * 11))
                        .unwrap_or(base),
                    archived: false,
                }
            })
            .collect();
        Self {
            tenants: RwLock::new(tenants),
            latency,
        }
    }

    /// One sorted page. Out-of-range pages are clamped.
    pub async fn fetch(&self, query: PageQuery) -> Page {
        tokio::time::sleep(self.latency).await;

        let mut all = self
            .tenants
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        all.sort_by(|a, b| {
            let ordering = compare(a, b, &query.sort.column).then(a.id.cmp(&b.id));
            match query.sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let per_page = query.per_page.max(1);
        let total = all.len() as u64;
        let last_page = u32::try_from(total.div_ceil(u64::from(per_page)))
            .unwrap_or(u32::MAX)
            .max(1);
        let current_page = query.page.clamp(1, last_page);
        let start = (current_page - 1) as usize * per_page as usize;
        let rows: Vec<Tenant> = all.into_iter().skip(start).take(per_page as usize).collect();

        let (from, to) = if rows.is_empty() {
            (None, None)
        } else {
            let from = start as u64 + 1;
            (Some(from), Some(from + rows.len() as u64 - 1))
        };
        log::debug!(
            "served page {current_page}/{last_page} sorted by {} {}",
            query.sort.column,
            query.sort.order
        );

        Page {
            rows,
            meta: PaginationMeta {
                current_page,
                last_page,
                per_page,
                total,
                from,
                to,
            },
        }
    }

    /// Soft-delete a tenant. Returns the updated record.
    pub fn archive(&self, id: u32) -> Option<Tenant> {
        let mut tenants = self.tenants.write().unwrap_or_else(|e| e.into_inner());
        let tenant = tenants.iter_mut().find(|t| t.id == id)?;
        tenant.archived = true;
        log::info!("tenant {id} archived");
        Some(tenant.clone())
    }
}

fn compare(a: &Tenant, b: &Tenant, key: &str) -> Ordering {
    match key {
        "name" => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        "email" => a.email.cmp(&b.email),
        "plan" => a.plan.cmp(&b.plan),
        "seats" => a.seats.cmp(&b.seats),
        "created" => a.created.cmp(&b.created),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TenantService {
        TenantService::seeded(23, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_second_page_meta() {
        let page = service()
            .fetch(PageQuery {
                page: 2,
                per_page: 10,
                sort: SortState::asc("name"),
            })
            .await;
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.last_page, 3);
        assert_eq!(page.meta.total, 23);
        assert_eq!((page.meta.from, page.meta.to), (Some(11), Some(20)));
    }

    #[tokio::test]
    async fn test_descending_seats() {
        let page = service()
            .fetch(PageQuery {
                page: 1,
                per_page: 23,
                sort: SortState::desc("seats"),
            })
            .await;
        assert!(page.rows.windows(2).all(|w| w[0].seats >= w[1].seats));
    }

    #[tokio::test]
    async fn test_page_is_clamped() {
        let page = service()
            .fetch(PageQuery {
                page: 9,
                per_page: 10,
                sort: SortState::asc("name"),
            })
            .await;
        assert_eq!(page.meta.current_page, 3);
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.meta.to, Some(23));
    }

    #[test]
    fn test_archive_is_soft() {
        let service = service();
        let archived = service.archive(4).unwrap();
        assert!(archived.archived);
        assert!(service.archive(999).is_none());
    }
}
