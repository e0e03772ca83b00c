use serde::Serialize;

pub mod handler;

/// Row shape for followers/following listings
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
}
