use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::catalog_dto::{CreateServicePayload, UpdateServicePayload};
use crate::dto::vendor_dto::ServiceSummary;
use crate::error::{Error, Result};
use crate::models::vendor_service::VendorService;

/// Groups rows by owner, keeping the order they were fetched in.
pub(crate) fn group_by_owner<T>(rows: Vec<(Uuid, T)>) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for (owner, row) in rows {
        grouped.entry(owner).or_default().push(row);
    }
    grouped
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    account_id: Uuid,
    id: Uuid,
    service_name: String,
    service_price: Option<Decimal>,
    description: String,
}

/// Active listings of every account in `account_ids`, keyed by owner.
pub(crate) async fn load_service_summaries(
    pool: &PgPool,
    account_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ServiceSummary>>> {
    if account_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT account_id, id, service_name, service_price, description
        FROM vendor_services
        WHERE account_id = ANY($1) AND is_active
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(account_ids)
    .fetch_all(pool)
    .await?;

    Ok(group_by_owner(
        rows.into_iter()
            .map(|row| {
                (
                    row.account_id,
                    ServiceSummary {
                        id: row.id,
                        name: row.service_name,
                        price: row.service_price,
                        description: row.description,
                    },
                )
            })
            .collect(),
    ))
}

fn service_not_found() -> Error {
    Error::NotFound("Service not found".to_string())
}

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<VendorService>> {
        let services = sqlx::query_as::<_, VendorService>(
            "SELECT * FROM vendor_services WHERE account_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    pub async fn get(&self, owner_id: Uuid, service_id: Uuid) -> Result<VendorService> {
        sqlx::query_as::<_, VendorService>(
            "SELECT * FROM vendor_services WHERE id = $1 AND account_id = $2",
        )
        .bind(service_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(service_not_found)
    }

    /// Category falls back to the owner's business when omitted.
    pub async fn create(&self, owner_id: Uuid, payload: CreateServicePayload) -> Result<VendorService> {
        let service = sqlx::query_as::<_, VendorService>(
            r#"
            INSERT INTO vendor_services (
                account_id, service_name, category, service_price,
                minimum_people, maximum_people, description, image, is_active
            )
            SELECT a.id, $2, COALESCE($3, a.business), $4, $5, $6, COALESCE($7, ''), $8, COALESCE($9, TRUE)
            FROM accounts a
            WHERE a.id = $1
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(payload.service_name.trim())
        .bind(payload.category.as_deref().map(str::trim))
        .bind(payload.service_price)
        .bind(payload.minimum_people)
        .bind(payload.maximum_people)
        .bind(payload.description.as_deref())
        .bind(payload.image.as_deref())
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Vendor not found".to_string()))?;

        tracing::info!(service_id = %service.id, account_id = %owner_id, "service listing created");
        Ok(service)
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        service_id: Uuid,
        payload: UpdateServicePayload,
    ) -> Result<VendorService> {
        let current = self.get(owner_id, service_id).await?;
        let minimum = payload.minimum_people.or(current.minimum_people);
        let maximum = payload.maximum_people.or(current.maximum_people);
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                return Err(Error::BadRequest(
                    "minimum_people cannot exceed maximum_people".to_string(),
                ));
            }
        }

        let service = sqlx::query_as::<_, VendorService>(
            r#"
            UPDATE vendor_services
            SET service_name = COALESCE($3, service_name),
                category = COALESCE($4, category),
                service_price = COALESCE($5, service_price),
                minimum_people = COALESCE($6, minimum_people),
                maximum_people = COALESCE($7, maximum_people),
                description = COALESCE($8, description),
                image = COALESCE($9, image),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1 AND account_id = $2
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(owner_id)
        .bind(payload.service_name.as_deref().map(str::trim))
        .bind(payload.category.as_deref().map(str::trim))
        .bind(payload.service_price)
        .bind(payload.minimum_people)
        .bind(payload.maximum_people)
        .bind(payload.description.as_deref())
        .bind(payload.image.as_deref())
        .bind(payload.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(service_not_found)?;

        Ok(service)
    }

    pub async fn delete(&self, owner_id: Uuid, service_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM vendor_services WHERE id = $1 AND account_id = $2")
            .bind(service_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(service_not_found());
        }
        tracing::info!(service_id = %service_id, account_id = %owner_id, "service listing deleted");
        Ok(())
    }
}
