use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Form, Json,
};
use serde_json::json;
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::jwt,
    config::settings::Settings,
    error::AppError,
    posts::{
        format_timestamp, EditContentForm, FeedQuery, MediaResponse, MediaType, Pager,
        PostResponse,
    },
};

/// Publish a post with optional media attachments
/// POST /publish_content/
pub async fn publish_content(
    State(pool): State<PgPool>,
    State(settings): State<Settings>,
    claims: jwt::Claims,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut content = String::new();
    let mut uploads: Vec<(MediaType, String)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart payload".to_string()))?
    {
        match field.name().map(str::to_string).as_deref() {
            Some("content") => {
                content = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid multipart payload".to_string()))?;
            }
            Some("media_files") => {
                // Parts without a filename are plain form values, not uploads
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let media_type = MediaType::from_content_type(field.content_type());
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid multipart payload".to_string()))?;

                tokio::fs::create_dir_all(&settings.media_root)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to create media dir: {:?}", e);
                        AppError::InternalServerError
                    })?;

                let file_path =
                    format!("{}/{}_{}", settings.media_root, Uuid::new_v4(), file_name);
                tokio::fs::write(&file_path, &data).await.map_err(|e| {
                    tracing::error!("Failed to store upload: {:?}", e);
                    AppError::InternalServerError
                })?;

                uploads.push((media_type, file_path));
            }
            _ => {}
        }
    }

    let post_id = Uuid::new_v4();

    let mut tx = pool
        .begin()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    sqlx::query("INSERT INTO posts (id, user_id, content) VALUES ($1, $2, $3)")
        .bind(post_id)
        .bind(claims.sub)
        .bind(&content)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::InternalServerError
        })?;

    for (media_type, file_path) in &uploads {
        sqlx::query(
            "INSERT INTO media (id, post_id, media_type, file_path) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(media_type)
        .bind(file_path)
        .execute(&mut *tx)
        .await
        .map_err(|_| AppError::InternalServerError)?;
    }

    tx.commit()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({
        "message": "Content published successfully.",
        "post_id": post_id,
    })))
}

/// Update the text of an owned post
/// POST /edit_content/:id/
pub async fn edit_content(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(post_id): Path<Uuid>,
    Form(payload): Form<EditContentForm>,
) -> Result<impl IntoResponse, AppError> {
    // Someone else's post looks the same as a missing one
    sqlx::query("SELECT id FROM posts WHERE id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(claims.sub)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound(
            "Post not found or access denied.".to_string(),
        ))?;

    let content = payload.content.unwrap_or_default();
    if content.is_empty() {
        return Err(AppError::BadRequest("No content provided.".to_string()));
    }

    sqlx::query("UPDATE posts SET content = $1 WHERE id = $2")
        .bind(&content)
        .bind(post_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({ "message": "Content updated successfully." })))
}

/// Delete an owned post and everything attached to it
/// DELETE /delete_content/:id/
pub async fn delete_content(
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
    if owner_id != claims.sub {
        return Err(AppError::Forbidden(
            "You do not have permission to delete this post.".to_string(),
        ));
    }

    // Media, comments, likes and notifications go with it (FK cascade)
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({ "message": "Post deleted successfully." })))
}

/// Newest-first feed, ten posts per page
/// GET /list_content/?page=N
pub async fn list_content(
    State(pool): State<PgPool>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    let pager = Pager::locate(total, query.page.as_deref());

    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, u.username, p.content, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        ORDER BY p.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(Pager::PAGE_SIZE)
    .bind(pager.offset)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Feed error: {:?}", e);
        AppError::InternalServerError
    })?;

    let post_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut media_by_post = fetch_media(&pool, &post_ids).await?;

    let posts: Vec<PostResponse> = rows
        .into_iter()
        .map(|row| {
            let media = media_by_post.remove(&row.id).unwrap_or_default();
            PostResponse {
                id: row.id,
                user: row.username,
                content: row.content,
                created_at: format_timestamp(row.created_at),
                media,
            }
        })
        .collect();

    Ok(Json(json!({
        "posts": posts,
        "page": pager.page,
        "pages": pager.pages,
    })))
}

/// Single post with its media
/// GET /get_content_detail/:id/
pub async fn get_content_detail(
    State(pool): State<PgPool>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.id, u.username, p.content, p.created_at
        FROM posts p
        JOIN users u ON p.user_id = u.id
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?
    .ok_or(AppError::NotFound("Post not found.".to_string()))?;

    let mut media_by_post = fetch_media(&pool, &[row.id]).await?;
    let media = media_by_post.remove(&row.id).unwrap_or_default();

    Ok(Json(PostResponse {
        id: row.id,
        user: row.username,
        content: row.content,
        created_at: format_timestamp(row.created_at),
        media,
    }))
}

// Helper structs and media lookup shared by the feed and detail views

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    username: String,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(FromRow)]
struct MediaRow {
    post_id: Uuid,
    media_type: MediaType,
    file_path: String,
}

async fn fetch_media(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<MediaResponse>>, AppError> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, MediaRow>(
        r#"
        SELECT post_id, media_type, file_path
        FROM media
        WHERE post_id = ANY($1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    let mut grouped: HashMap<Uuid, Vec<MediaResponse>> = HashMap::new();
    for row in rows {
        grouped.entry(row.post_id).or_default().push(MediaResponse {
            media_type: row.media_type,
            file_path: row.file_path,
        });
    }

    Ok(grouped)
}
