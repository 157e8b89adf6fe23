use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::message::Message;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessagePayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub message: String,
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SocketAuthQuery {
    pub token: Option<String>,
}

/// Frame a client writes to the live channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFrame {
    pub message: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
}

/// Frame pushed to every subscriber of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFrame {
    pub id: Uuid,
    pub message: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for ChatFrame {
    fn from(value: &Message) -> Self {
        Self {
            id: value.id,
            message: value.message.clone(),
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            timestamp: value.created_at,
        }
    }
}
