use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::chat_dto::ChatFrame;
use crate::error::{Error, Result};
use crate::models::message::{ChatContact, Message};
use crate::services::chat_hub::{ChatHub, ConversationKey, Subscription};

pub const MAX_MESSAGE_CHARS: usize = 4000;
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// Trims a message body and rejects empty or overlong text.
pub fn normalize_body(body: &str) -> Result<&str> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest("Message cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Error::BadRequest(format!(
            "Message cannot exceed {} characters",
            MAX_MESSAGE_CHARS
        )));
    }
    Ok(trimmed)
}

pub fn history_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

#[derive(Clone)]
pub struct ChatService {
    pool: PgPool,
    hub: ChatHub,
}

impl ChatService {
    pub fn new(pool: PgPool, hub: ChatHub) -> Self {
        Self { pool, hub }
    }

    /// Fails unless `other_id` is an existing account distinct from the caller.
    pub async fn ensure_counterparty(&self, self_id: Uuid, other_id: Uuid) -> Result<()> {
        if self_id == other_id {
            return Err(Error::BadRequest(
                "Cannot open a conversation with yourself".to_string(),
            ));
        }
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
            .bind(other_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(Error::NotFound("Vendor not found".to_string()));
        }
        Ok(())
    }

    /// Most recent `limit` messages of the conversation, oldest first.
    pub async fn fetch_history(
        &self,
        self_id: Uuid,
        other_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Message>> {
        self.ensure_counterparty(self_id, other_id).await?;

        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM (
                SELECT m.id, m.sender_id, m.receiver_id,
                       s.full_name AS sender_name, r.full_name AS receiver_name,
                       m.message, m.is_read, m.created_at
                FROM messages m
                JOIN accounts s ON s.id = m.sender_id
                JOIN accounts r ON r.id = m.receiver_id
                WHERE (m.sender_id = $1 AND m.receiver_id = $2)
                   OR (m.sender_id = $2 AND m.receiver_id = $1)
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT $3
            ) recent
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(self_id)
        .bind(other_id)
        .bind(history_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Persists the message, then pushes it to live subscribers of the pair.
    pub async fn send(&self, self_id: Uuid, other_id: Uuid, body: &str) -> Result<Message> {
        let body = normalize_body(body)?;
        self.ensure_counterparty(self_id, other_id).await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            WITH inserted AS (
                INSERT INTO messages (sender_id, receiver_id, message)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT i.id, i.sender_id, i.receiver_id,
                   s.full_name AS sender_name, r.full_name AS receiver_name,
                   i.message, i.is_read, i.created_at
            FROM inserted i
            JOIN accounts s ON s.id = i.sender_id
            JOIN accounts r ON r.id = i.receiver_id
            "#,
        )
        .bind(self_id)
        .bind(other_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        self.publish(&message);
        Ok(message)
    }

    /// Pushes a stored message to the sockets of its sender/receiver pair.
    fn publish(&self, message: &Message) -> usize {
        let key = ConversationKey::new(message.sender_id, message.receiver_id);
        let delivered = self.hub.publish(key, ChatFrame::from(message));
        tracing::debug!(group = %key, message_id = %message.id, delivered, "chat message sent");
        delivered
    }

    /// Marks everything `other_id` sent to the caller as read. Repeat calls update nothing.
    pub async fn mark_read(&self, self_id: Uuid, other_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(other_id)
        .bind(self_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn unread_count(&self, self_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(self_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Every other vendor with the latest message exchanged with the caller.
    pub async fn list_contacts(&self, self_id: Uuid) -> Result<Vec<ChatContact>> {
        let contacts = sqlx::query_as::<_, ChatContact>(
            r#"
            SELECT a.id, a.full_name, a.business, a.is_online,
                   (SELECT COUNT(*) FROM messages u
                    WHERE u.sender_id = a.id AND u.receiver_id = $1 AND u.is_read = FALSE) AS unread_count,
                   lm.message AS last_message,
                   lm.created_at AS last_message_at,
                   lm.is_read AS last_message_is_read
            FROM accounts a
            LEFT JOIN LATERAL (
                SELECT m.message, m.created_at, m.is_read
                FROM messages m
                WHERE (m.sender_id = $1 AND m.receiver_id = a.id)
                   OR (m.sender_id = a.id AND m.receiver_id = $1)
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT 1
            ) lm ON TRUE
            WHERE a.id <> $1
            ORDER BY lm.created_at DESC NULLS LAST, a.full_name ASC
            "#,
        )
        .bind(self_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    pub fn subscribe(&self, self_id: Uuid, other_id: Uuid) -> Subscription {
        self.hub.subscribe(ConversationKey::new(self_id, other_id))
    }
}
