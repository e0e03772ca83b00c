use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod handler;

#[derive(Debug, Deserialize)]
pub struct SendMessageForm {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub content: Option<String>,
}

/// Message shape used by listings, search, detail and the send receipt.
/// `sender` and `receiver` carry user ids.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender: Uuid,
    pub receiver: Uuid,
    pub content: String,
}

/// Inbox shape, keyed by column names rather than relation names
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ReceivedMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}
