//! Vendor discovery: composable, case-insensitive filters over accounts,
//! profiles, verification addresses and service listings.
//!
//! Filters of different kinds are AND-ed; the columns inside one filter are
//! OR-ed. Service-side predicates are `EXISTS` sub-queries, so a vendor with
//! several matching services still yields a single row.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vendor_dto::{VendorListQuery, VendorListResponse, VendorSummary};
use crate::error::{Error, Result};
use crate::models::account::VendorProfile;
use crate::services::account_service::{attach_services, VENDOR_PROFILE_FROM, VENDOR_PROFILE_SELECT};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRange {
    Under10k,
    From10kTo25k,
    From25kTo50k,
    Above50k,
}

impl PriceRange {
    /// Accepts dashboard labels such as `Under ₹10,000` or `₹10,000 - ₹25,000`
    /// as well as short keys like `under_10000`. `All` and blank mean no filter.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '₹' && *c != ',')
            .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
            .collect();

        match normalized.as_str() {
            "" | "all" => Ok(None),
            "under10000" | "under-10000" | "<10000" => Ok(Some(PriceRange::Under10k)),
            "10000-25000" => Ok(Some(PriceRange::From10kTo25k)),
            "25000-50000" => Ok(Some(PriceRange::From25kTo50k)),
            "above50000" | "above-50000" | ">50000" => Ok(Some(PriceRange::Above50k)),
            _ => Err(Error::BadRequest(format!("Unknown price range: {}", raw))),
        }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        let (ten, twenty_five, fifty) = bucket_edges();
        match self {
            PriceRange::Under10k => price < ten,
            PriceRange::From10kTo25k => price >= ten && price <= twenty_five,
            PriceRange::From25kTo50k => price >= twenty_five && price <= fifty,
            PriceRange::Above50k => price > fifty,
        }
    }

    /// SQL predicate over `s.service_price` plus the bound amounts it references.
    fn predicate(&self, next_placeholder: usize) -> (String, Vec<FilterArg>) {
        let (ten, twenty_five, fifty) = bucket_edges();
        let p = next_placeholder;
        match self {
            PriceRange::Under10k => (
                format!("s.service_price < ${}", p),
                vec![FilterArg::Amount(ten)],
            ),
            PriceRange::From10kTo25k => (
                format!("s.service_price >= ${} AND s.service_price <= ${}", p, p + 1),
                vec![FilterArg::Amount(ten), FilterArg::Amount(twenty_five)],
            ),
            PriceRange::From25kTo50k => (
                format!("s.service_price >= ${} AND s.service_price <= ${}", p, p + 1),
                vec![FilterArg::Amount(twenty_five), FilterArg::Amount(fifty)],
            ),
            PriceRange::Above50k => (
                format!("s.service_price > ${}", p),
                vec![FilterArg::Amount(fifty)],
            ),
        }
    }
}

fn bucket_edges() -> (Decimal, Decimal, Decimal) {
    (
        Decimal::from(10_000),
        Decimal::from(25_000),
        Decimal::from(50_000),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Id(Uuid),
    Text(String),
    Amount(Decimal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSql {
    pub where_clause: String,
    pub args: Vec<FilterArg>,
}

/// `%value%` with LIKE wildcards in `value` matched literally.
pub fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorFilter {
    pub exclude_id: Uuid,
    pub category: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub price_range: Option<PriceRange>,
}

impl VendorFilter {
    pub fn from_query(exclude_id: Uuid, query: &VendorListQuery) -> Result<Self> {
        let location = non_blank(query.location.as_deref())
            .filter(|l| !l.eq_ignore_ascii_case("all"));
        let price_range = match query.price_range.as_deref() {
            Some(raw) => PriceRange::parse(raw)?,
            None => None,
        };

        Ok(Self {
            exclude_id,
            category: non_blank(query.category.as_deref()),
            location,
            search: non_blank(query.search.as_deref()),
            price_range,
        })
    }

    /// Builds the WHERE clause against `accounts a`, `profiles p`, `verifications v`.
    pub fn to_sql(&self) -> FilterSql {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<FilterArg> = Vec::new();

        clauses.push(format!("a.id <> ${}", args.len() + 1));
        args.push(FilterArg::Id(self.exclude_id));

        if let Some(category) = &self.category {
            clauses.push(format!("a.business ILIKE ${}", args.len() + 1));
            args.push(FilterArg::Text(contains_pattern(category)));
        }

        if let Some(location) = &self.location {
            let p = args.len() + 1;
            clauses.push(format!(
                "(p.city ILIKE ${p} OR p.location ILIKE ${p} OR p.state ILIKE ${p} OR v.address ILIKE ${p})"
            ));
            args.push(FilterArg::Text(contains_pattern(location)));
        }

        if let Some(search) = &self.search {
            let p = args.len() + 1;
            clauses.push(format!(
                "(a.full_name ILIKE ${p} OR a.business ILIKE ${p} OR EXISTS (\
                 SELECT 1 FROM vendor_services s WHERE s.account_id = a.id \
                 AND (s.service_name ILIKE ${p} OR s.category ILIKE ${p} OR s.description ILIKE ${p})))"
            ));
            args.push(FilterArg::Text(contains_pattern(search)));
        }

        if let Some(range) = &self.price_range {
            let (predicate, mut bounds) = range.predicate(args.len() + 1);
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM vendor_services s WHERE s.account_id = a.id AND {})",
                predicate
            ));
            args.append(&mut bounds);
        }

        FilterSql {
            where_clause: format!("WHERE {}", clauses.join(" AND ")),
            args,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// Unpaginated slice of at most `n` vendors.
    Limit(i64),
    Page { page: i64, per_page: i64 },
}

impl PageRequest {
    pub fn from_query(query: &VendorListQuery) -> Result<Self> {
        match query.limit {
            Some(limit) if !(1..=MAX_LIMIT).contains(&limit) => Err(Error::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            ))),
            Some(limit) => Ok(PageRequest::Limit(limit)),
            None => {
                let page = query.page.unwrap_or(1).max(1);
                let per_page = query
                    .per_page
                    .unwrap_or(DEFAULT_PER_PAGE)
                    .clamp(1, MAX_PAGE_SIZE);
                if (page - 1).checked_mul(per_page).is_none() {
                    return Err(Error::BadRequest("page is out of range".to_string()));
                }
                Ok(PageRequest::Page { page, per_page })
            }
        }
    }

    /// Rows skipped before this page. Zero for `Limit`.
    pub fn offset(&self) -> i64 {
        match self {
            PageRequest::Limit(_) => 0,
            PageRequest::Page { page, per_page } => (page - 1).saturating_mul(*per_page),
        }
    }
}

macro_rules! bind_filter_args {
    ($statement:expr, $args:expr) => {{
        let mut statement = $statement;
        for arg in $args {
            statement = match arg {
                FilterArg::Id(id) => statement.bind(*id),
                FilterArg::Text(text) => statement.bind(text.clone()),
                FilterArg::Amount(amount) => statement.bind(*amount),
            };
        }
        statement
    }};
}

#[derive(Clone)]
pub struct DiscoveryService {
    pool: PgPool,
}

impl DiscoveryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_vendors(
        &self,
        filter: &VendorFilter,
        page: PageRequest,
    ) -> Result<VendorListResponse> {
        let FilterSql { where_clause, args } = filter.to_sql();
        let window_start = args.len() + 1;

        let window = match page {
            PageRequest::Limit(_) => format!("LIMIT ${}", window_start),
            PageRequest::Page { .. } => {
                format!("LIMIT ${} OFFSET ${}", window_start, window_start + 1)
            }
        };

        let items_query = format!(
            "{} {} {} ORDER BY a.created_at ASC, a.id ASC {}",
            VENDOR_PROFILE_SELECT, VENDOR_PROFILE_FROM, where_clause, window
        );

        let mut items_statement =
            bind_filter_args!(sqlx::query_as::<_, VendorProfile>(&items_query), &args);
        items_statement = match page {
            PageRequest::Limit(limit) => items_statement.bind(limit),
            PageRequest::Page { per_page, .. } => {
                items_statement.bind(per_page).bind(page.offset())
            }
        };
        let profiles = items_statement.fetch_all(&self.pool).await?;
        let items: Vec<VendorSummary> = attach_services(&self.pool, profiles).await?;

        match page {
            PageRequest::Limit(_) => Ok(VendorListResponse::Limited(items)),
            PageRequest::Page { page, per_page } => {
                let total_query = format!(
                    "SELECT COUNT(*) {} {}",
                    VENDOR_PROFILE_FROM, where_clause
                );
                let total: i64 =
                    bind_filter_args!(sqlx::query_scalar::<_, i64>(&total_query), &args)
                        .fetch_one(&self.pool)
                        .await?;
                let total_pages = (total + per_page - 1) / per_page;

                Ok(VendorListResponse::Paginated {
                    items,
                    total,
                    page,
                    per_page,
                    total_pages,
                })
            }
        }
    }
}
