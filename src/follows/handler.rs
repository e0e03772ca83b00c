use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{auth::jwt, error::AppError, follows::UserSummary};

/// Follow a user
/// POST /follow_user/:id/
pub async fn follow_user(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if claims.sub == user_id {
        return Err(AppError::BadRequest(
            "You cannot follow yourself".to_string(),
        ));
    }

    sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Following twice is a no-op
    sqlx::query(
        r#"
        INSERT INTO follows (follower_id, following_id)
        VALUES ($1, $2)
        ON CONFLICT (follower_id, following_id) DO NOTHING
        "#,
    )
    .bind(claims.sub)
    .bind(user_id)
    .execute(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({
        "message": "User followed successfully",
        "user_id": user_id,
    })))
}

/// Unfollow a user
/// POST /unfollow_user/:id/
pub async fn unfollow_user(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    // Deleting a missing row is a no-op
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(claims.sub)
        .bind(user_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({
        "message": "User unfollowed successfully",
        "user_id": user_id,
    })))
}

/// Check whether the current user follows a target user
/// GET /is_following/:id/
pub async fn is_following(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let following =
        sqlx::query("SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(claims.sub)
            .bind(user_id)
            .fetch_optional(&pool)
            .await
            .map_err(|_| AppError::InternalServerError)?
            .is_some();

    Ok(Json(json!({ "following": following })))
}

/// Users the given user follows, oldest follow first
/// POST /user/:id/following/
pub async fn get_following(
    State(pool): State<PgPool>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let following = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.username, u.email
        FROM follows f
        JOIN users u ON f.following_id = u.id
        WHERE f.follower_id = $1
        ORDER BY f.created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(following))
}

/// Users following the given user, oldest follow first
/// POST /user/:id/followers/
pub async fn get_followers(
    State(pool): State<PgPool>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let followers = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.username, u.email
        FROM follows f
        JOIN users u ON f.follower_id = u.id
        WHERE f.following_id = $1
        ORDER BY f.created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(followers))
}
