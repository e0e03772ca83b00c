use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Form, Json,
};
use serde_json::json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    auth::jwt,
    error::AppError,
    messages::{MessageResponse, ReceivedMessage, SendMessageForm},
};

/// Send a direct message from one user to another
/// POST /send_message/
pub async fn send_message(
    State(pool): State<PgPool>,
    Form(payload): Form<SendMessageForm>,
) -> Result<impl IntoResponse, AppError> {
    let sender = payload.sender.unwrap_or_default();
    let receiver = payload.receiver.unwrap_or_default();
    let content = payload.content.unwrap_or_default();

    if sender.is_empty() || receiver.is_empty() || content.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide sender, receiver, and content".to_string(),
        ));
    }

    // An id that does not parse cannot name a user
    let user_not_found = || AppError::NotFound("User not found".to_string());
    let sender_id: Uuid = sender.parse().map_err(|_| user_not_found())?;
    let receiver_id: Uuid = receiver.parse().map_err(|_| user_not_found())?;

    for user_id in [sender_id, receiver_id] {
        sqlx::query("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&pool)
            .await
            .map_err(|_| AppError::InternalServerError)?
            .ok_or_else(user_not_found)?;
    }

    let message_id = Uuid::new_v4();

    sqlx::query("INSERT INTO messages (id, sender_id, receiver_id, content) VALUES ($1, $2, $3, $4)")
        .bind(message_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(&content)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to send message: {:?}", e);
            AppError::InternalServerError
        })?;

    Ok(Json(json!({
        "message": "Message sent successfully",
        "sent_message": MessageResponse {
            id: message_id,
            sender: sender_id,
            receiver: receiver_id,
            content,
        },
    })))
}

/// A user's inbox
/// GET /receive_messages/:user_id/
pub async fn receive_messages(
    State(pool): State<PgPool>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let messages = sqlx::query_as::<_, ReceivedMessage>(
        r#"
        SELECT id, sender_id, receiver_id, content
        FROM messages
        WHERE receiver_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(messages))
}

/// Every message in the system, oldest first
/// GET /list_messages/
pub async fn list_messages(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let messages = sqlx::query_as::<_, MessageResponse>(
        r#"
        SELECT id, sender_id AS sender, receiver_id AS receiver, content
        FROM messages
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(messages))
}

/// Case-insensitive substring search over message content
/// GET /search_messages/:keyword/
pub async fn search_messages(
    State(pool): State<PgPool>,
    Path(keyword): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Escape LIKE metacharacters so the keyword matches literally
    let pattern = format!(
        "%{}%",
        keyword
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    );

    let messages = sqlx::query_as::<_, MessageResponse>(
        r#"
        SELECT id, sender_id AS sender, receiver_id AS receiver, content
        FROM messages
        WHERE content ILIKE $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(&pattern)
    .fetch_all(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(messages))
}

/// GET /get_message_detail/:id/
pub async fn get_message_detail(
    State(pool): State<PgPool>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let message = sqlx::query_as::<_, MessageResponse>(
        "SELECT id, sender_id AS sender, receiver_id AS receiver, content FROM messages WHERE id = $1",
    )
    .bind(message_id)
    .fetch_optional(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?
    .ok_or(AppError::NotFound("Message not found".to_string()))?;

    Ok(Json(message))
}

/// POST /mark_as_read/:id/
pub async fn mark_as_read(
    State(pool): State<PgPool>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_read_flag(&pool, message_id, true).await?;

    Ok(Json(json!({
        "message": "Message marked as read",
        "message_id": message_id,
    })))
}

/// POST /mark_as_unread/:id/
pub async fn mark_as_unread(
    State(pool): State<PgPool>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    set_read_flag(&pool, message_id, false).await?;

    Ok(Json(json!({
        "message": "Message marked as unread",
        "message_id": message_id,
    })))
}

/// POST /delete_message/:id/
pub async fn delete_message(
    State(pool): State<PgPool>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(message_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Message not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Message deleted successfully",
        "message_id": message_id,
    })))
}

/// Recall a sent message. Only the sender may recall, and only within
/// two minutes of sending.
/// POST /recall_message/:id/
pub async fn recall_message(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query("SELECT sender_id, created_at FROM messages WHERE id = $1")
        .bind(message_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Message not found".to_string()))?;

    let sender_id: Uuid = row.get("sender_id");
    if sender_id != claims.sub {
        return Err(AppError::Forbidden(
            "Only the sender can recall a message.".to_string(),
        ));
    }

    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let age = chrono::Utc::now().signed_duration_since(created_at);
    if age > chrono::Duration::minutes(2) {
        return Err(AppError::BadRequest(
            "Message can no longer be recalled.".to_string(),
        ));
    }

    sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(message_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({
        "message": "Message recalled successfully",
        "message_id": message_id,
    })))
}

async fn set_read_flag(pool: &PgPool, message_id: Uuid, read: bool) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE messages SET read = $1 WHERE id = $2")
        .bind(read)
        .bind(message_id)
        .execute(pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Message not found".to_string()));
    }

    Ok(())
}
