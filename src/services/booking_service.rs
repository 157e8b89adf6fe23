use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::booking_dto::{CreateBookingPayload, DashboardStats};
use crate::error::{Error, Result};
use crate::models::booking::{Booking, BookingStatus, LedgerEntry};
use crate::utils::time::{month_start, now};

/// Folds a vendor's ledger into dashboard figures. Revenue counts completed
/// bookings only; `monthly_revenue` those created at or after `month_start`.
pub fn tally_ledger(entries: &[LedgerEntry], month_start: DateTime<Utc>) -> DashboardStats {
    let mut stats = DashboardStats::default();
    for entry in entries {
        stats.total_bookings += 1;
        match entry.status.parse::<BookingStatus>() {
            Ok(BookingStatus::Pending) => stats.pending_bookings += 1,
            Ok(BookingStatus::InProgress) => stats.in_progress_bookings += 1,
            Ok(BookingStatus::Completed) => {
                stats.completed_bookings += 1;
                stats.total_revenue += entry.amount;
                if entry.created_at >= month_start {
                    stats.monthly_revenue += entry.amount;
                }
            }
            Err(e) => tracing::warn!(error = %e, "ledger entry with unknown status skipped"),
        }
    }
    stats
}

#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, vendor_id: Uuid) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE vendor_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    pub async fn get(&self, vendor_id: Uuid, booking_id: Uuid) -> Result<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 AND vendor_id = $2")
            .bind(booking_id)
            .bind(vendor_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Booking not found".to_string()))
    }

    pub async fn create(&self, vendor_id: Uuid, payload: CreateBookingPayload) -> Result<Booking> {
        let status = payload.status.unwrap_or(BookingStatus::Pending);
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (vendor_id, customer_name, service_type, event_date, amount, status, description, location)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, ''), $8)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(payload.customer_name.trim())
        .bind(payload.service_type.trim())
        .bind(payload.event_date)
        .bind(payload.amount)
        .bind(status.as_str())
        .bind(payload.description.as_deref())
        .bind(payload.location.trim())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(booking_id = %booking.id, vendor_id = %vendor_id, "booking created");
        Ok(booking)
    }

    /// Another vendor's booking is Forbidden; an unknown id is NotFound.
    pub async fn update_status(
        &self,
        vendor_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT vendor_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            None => return Err(Error::NotFound("Booking not found".to_string())),
            Some(owner) if owner != vendor_id => {
                return Err(Error::Forbidden(
                    "You can only update your own bookings".to_string(),
                ))
            }
            Some(_) => {}
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND vendor_id = $2
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(vendor_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Booking not found".to_string()))?;

        tracing::info!(booking_id = %booking_id, status = status.as_str(), "booking status updated");
        Ok(booking)
    }

    pub async fn compute_stats(&self, vendor_id: Uuid) -> Result<DashboardStats> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT status, amount, created_at FROM bookings WHERE vendor_id = $1",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tally_ledger(&entries, month_start(now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn entry(status: &str, amount: i64, created_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            status: status.to_string(),
            amount: Decimal::from(amount),
            created_at,
        }
    }

    #[test]
    fn counts_by_status_and_sums_completed_only() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let entries = vec![
            entry("pending", 1_000, start + Duration::days(1)),
            entry("in_progress", 2_000, start + Duration::days(2)),
            entry("completed", 15_000, start + Duration::days(3)),
            entry("completed", 5_000, start - Duration::days(40)),
        ];

        let stats = tally_ledger(&entries, start);
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.in_progress_bookings, 1);
        assert_eq!(stats.completed_bookings, 2);
        assert_eq!(stats.total_revenue, Decimal::from(20_000));
        assert_eq!(stats.monthly_revenue, Decimal::from(15_000));
        assert!(stats.monthly_revenue <= stats.total_revenue);
    }

    #[test]
    fn monthly_equals_total_when_everything_is_this_month() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let entries = vec![
            entry("completed", 7_500, start),
            entry("completed", 2_500, start + Duration::hours(5)),
        ];
        let stats = tally_ledger(&entries, start);
        assert_eq!(stats.monthly_revenue, stats.total_revenue);
        assert_eq!(stats.total_revenue, Decimal::from(10_000));
    }

    #[test]
    fn empty_ledger_is_all_zero() {
        assert_eq!(tally_ledger(&[], now()), DashboardStats::default());
    }
}
