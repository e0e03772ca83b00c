use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    auth::jwt,
    error::AppError,
    notifications::{LikeTarget, LikeTargetKind, NotificationKind, NotificationResponse},
    posts::format_timestamp,
};

#[derive(FromRow)]
struct NotificationRow {
    id: Uuid,
    kind: NotificationKind,
    from_username: Option<String>,
    target_kind: LikeTargetKind,
    post_id: Option<Uuid>,
    comment_id: Option<Uuid>,
    is_read: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// The caller's notifications, newest first
/// GET /notifications/
pub async fn list_notifications(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT
            n.id, n.kind, n.target_kind, n.post_id, n.comment_id, n.is_read, n.created_at,
            u.username AS from_username
        FROM notifications n
        LEFT JOIN users u ON n.from_user_id = u.id
        WHERE n.to_user_id = $1
        ORDER BY n.created_at DESC
        "#,
    )
    .bind(claims.sub)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch notifications: {:?}", e);
        AppError::InternalServerError
    })?;

    let mut response = Vec::with_capacity(rows.len());
    for row in rows {
        // The schema guarantees exactly one target id per row
        let target = match (row.target_kind, row.post_id, row.comment_id) {
            (LikeTargetKind::Post, Some(id), _) => LikeTarget::Post(id),
            (LikeTargetKind::Comment, _, Some(id)) => LikeTarget::Comment(id),
            _ => {
                tracing::error!("Notification {} has no target", row.id);
                return Err(AppError::InternalServerError);
            }
        };

        response.push(NotificationResponse {
            id: row.id,
            kind: row.kind,
            from_user: row.from_username,
            target,
            is_read: row.is_read,
            created_at: format_timestamp(row.created_at),
        });
    }

    Ok(Json(response))
}

/// Mark one of the caller's notifications as read
/// POST /notifications/:id/read/
pub async fn mark_notification_read(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND to_user_id = $2")
            .bind(notification_id)
            .bind(claims.sub)
            .execute(&pool)
            .await
            .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Notification marked as read",
        "notification_id": notification_id,
    })))
}
