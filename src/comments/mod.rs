use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod handler;

/// Form payload for publishing a comment or a threaded reply
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub user: String,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: String,
}
