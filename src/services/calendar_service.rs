use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::calendar_dto::{CreateCalendarEventPayload, UpdateCalendarEventPayload};
use crate::error::{Error, Result};
use crate::models::calendar_event::CalendarEvent;

fn event_not_found() -> Error {
    Error::NotFound("Calendar event not found".to_string())
}

#[derive(Clone)]
pub struct CalendarService {
    pool: PgPool,
}

impl CalendarService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, vendor_id: Uuid) -> Result<Vec<CalendarEvent>> {
        let events = sqlx::query_as::<_, CalendarEvent>(
            "SELECT * FROM calendar_events WHERE vendor_id = $1 ORDER BY event_date ASC, id ASC",
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn get(&self, vendor_id: Uuid, event_id: Uuid) -> Result<CalendarEvent> {
        sqlx::query_as::<_, CalendarEvent>(
            "SELECT * FROM calendar_events WHERE id = $1 AND vendor_id = $2",
        )
        .bind(event_id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(event_not_found)
    }

    pub async fn create(
        &self,
        vendor_id: Uuid,
        payload: CreateCalendarEventPayload,
    ) -> Result<CalendarEvent> {
        if let Some(booking_id) = payload.booking_id {
            self.ensure_booking_owned(vendor_id, booking_id).await?;
        }

        let event = sqlx::query_as::<_, CalendarEvent>(
            r#"
            INSERT INTO calendar_events (vendor_id, title, description, event_date, location, booking_id)
            VALUES ($1, $2, COALESCE($3, ''), $4, COALESCE($5, ''), $6)
            RETURNING *
            "#,
        )
        .bind(vendor_id)
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(payload.event_date)
        .bind(payload.location.as_deref().map(str::trim))
        .bind(payload.booking_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(event_id = %event.id, vendor_id = %vendor_id, "calendar event created");
        Ok(event)
    }

    pub async fn update(
        &self,
        vendor_id: Uuid,
        event_id: Uuid,
        payload: UpdateCalendarEventPayload,
    ) -> Result<CalendarEvent> {
        if let Some(booking_id) = payload.booking_id {
            self.ensure_booking_owned(vendor_id, booking_id).await?;
        }

        sqlx::query_as::<_, CalendarEvent>(
            r#"
            UPDATE calendar_events
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                event_date = COALESCE($5, event_date),
                location = COALESCE($6, location),
                booking_id = COALESCE($7, booking_id)
            WHERE id = $1 AND vendor_id = $2
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(vendor_id)
        .bind(payload.title.as_deref().map(str::trim))
        .bind(payload.description.as_deref())
        .bind(payload.event_date)
        .bind(payload.location.as_deref().map(str::trim))
        .bind(payload.booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(event_not_found)
    }

    pub async fn delete(&self, vendor_id: Uuid, event_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1 AND vendor_id = $2")
            .bind(event_id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(event_not_found());
        }
        Ok(())
    }

    async fn ensure_booking_owned(&self, vendor_id: Uuid, booking_id: Uuid) -> Result<()> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT vendor_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            Some(owner) if owner == vendor_id => Ok(()),
            Some(_) => Err(Error::Forbidden(
                "Booking belongs to another vendor".to_string(),
            )),
            None => Err(Error::NotFound("Booking not found".to_string())),
        }
    }
}
