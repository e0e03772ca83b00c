use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Form, Json,
};
use serde_json::json;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    auth::jwt,
    comments::{CommentForm, CommentResponse},
    error::AppError,
    posts::format_timestamp,
};

/// Comment on a post, optionally as a reply to another comment
/// POST /publish_comment/:post_id/
pub async fn publish_comment(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(post_id): Path<Uuid>,
    Form(payload): Form<CommentForm>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found.".to_string()))?;

    let content = payload.content.unwrap_or_default().trim().to_string();
    if content.is_empty() {
        return Err(AppError::BadRequest(
            "Comment content cannot be empty.".to_string(),
        ));
    }

    // A reply has to target a comment under the same post
    if let Some(parent_id) = payload.parent_id {
        let parent = sqlx::query("SELECT post_id FROM comments WHERE id = $1")
            .bind(parent_id)
            .fetch_optional(&pool)
            .await
            .map_err(|_| AppError::InternalServerError)?
            .ok_or(AppError::NotFound("Parent comment not found.".to_string()))?;

        let parent_post_id: Uuid = parent.get("post_id");
        if parent_post_id != post_id {
            return Err(AppError::BadRequest(
                "Parent comment does not belong to this post.".to_string(),
            ));
        }
    }

    let comment_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO comments (id, post_id, user_id, parent_id, content) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(comment_id)
    .bind(post_id)
    .bind(claims.sub)
    .bind(payload.parent_id)
    .bind(&content)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(Json(json!({
        "message": "Comment published successfully.",
        "comment_id": comment_id,
    })))
}

/// All comments under a post, oldest first
/// GET /get_comment_list/:post_id/
pub async fn get_comment_list(
    State(pool): State<PgPool>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found.".to_string()))?;

    let comments = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, u.username, c.content, c.parent_id, c.created_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch comments: {:?}", e);
        AppError::InternalServerError
    })?;

    let response: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();

    Ok(Json(response))
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    username: String,
    content: String,
    parent_id: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CommentRow> for CommentResponse {
    fn from(c: CommentRow) -> Self {
        CommentResponse {
            id: c.id,
            user: c.username,
            content: c.content,
            parent_id: c.parent_id,
            created_at: format_timestamp(c.created_at),
        }
    }
}
