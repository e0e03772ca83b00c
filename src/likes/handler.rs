use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    auth::jwt,
    error::AppError,
    notifications::{self, LikeTarget},
};

/// Like a post and notify its owner
/// POST /like_post/:id/
pub async fn like_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query("SELECT user_id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found.".to_string()))?;

    let owner_id: Uuid = row.get("user_id");

    let mut tx = pool
        .begin()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    sqlx::query("INSERT INTO post_likes (user_id, post_id) VALUES ($1, $2)")
        .bind(claims.sub)
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("You have already liked this post.".to_string())
            }
            _ => {
                tracing::error!("Failed to like post: {:?}", e);
                AppError::InternalServerError
            }
        })?;

    notifications::record_like(&mut tx, owner_id, claims.sub, LikeTarget::Post(post_id))
        .await
        .map_err(|e| {
            tracing::error!("Failed to record notification: {:?}", e);
            AppError::InternalServerError
        })?;

    tx.commit()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({ "message": "Post liked successfully." })))
}

/// Remove a like from a post
/// POST /unlike_post/:id/
pub async fn unlike_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Post not found.".to_string()))?;

    let result = sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
        .bind(claims.sub)
        .bind(post_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "You have not liked this post.".to_string(),
        ));
    }

    Ok(Json(json!({ "message": "Post unliked successfully." })))
}

/// Like a comment and notify its owner
/// POST /like_comment/:id/
pub async fn like_comment(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query("SELECT user_id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Comment not found.".to_string()))?;

    let owner_id: Uuid = row.get("user_id");

    let mut tx = pool
        .begin()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    sqlx::query("INSERT INTO comment_likes (user_id, comment_id) VALUES ($1, $2)")
        .bind(claims.sub)
        .bind(comment_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("You have already liked this comment.".to_string())
            }
            _ => {
                tracing::error!("Failed to like comment: {:?}", e);
                AppError::InternalServerError
            }
        })?;

    notifications::record_like(&mut tx, owner_id, claims.sub, LikeTarget::Comment(comment_id))
        .await
        .map_err(|e| {
            tracing::error!("Failed to record notification: {:?}", e);
            AppError::InternalServerError
        })?;

    tx.commit()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({ "message": "Comment liked successfully." })))
}

/// Remove a like from a comment
/// POST /unlike_comment/:id/
pub async fn unlike_comment(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(comment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Comment not found.".to_string()))?;

    let result = sqlx::query("DELETE FROM comment_likes WHERE user_id = $1 AND comment_id = $2")
        .bind(claims.sub)
        .bind(comment_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "You have not liked this comment.".to_string(),
        ));
    }

    Ok(Json(json!({ "message": "Comment unliked successfully." })))
}
