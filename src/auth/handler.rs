use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Form, Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{jwt, utils, LoginForm, RegisterForm, User, UserInfo},
    config::settings::Settings,
    error::AppError,
};

/// Register a new account
/// POST /register/
pub async fn register(
    State(pool): State<PgPool>,
    Form(payload): Form<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide username, email, and password".to_string(),
        ));
    }

    sqlx::query("SELECT id FROM users WHERE username = $1")
        .bind(&username)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .map_or(Ok(()), |_| {
            Err(AppError::Conflict("Username already exists".to_string()))
        })?;

    let password_hash =
        utils::hash_password(&password).map_err(|_| AppError::InternalServerError)?;

    sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4())
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .execute(&pool)
        .await
        .map_err(|e: sqlx::Error| {
            // The username pre-check leaves email as the remaining unique key.
            match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => {
                    if db_err.constraint() == Some("users_username_key") {
                        AppError::Conflict("Username already exists".to_string())
                    } else {
                        AppError::Conflict("Email already exists".to_string())
                    }
                }
                _ => {
                    tracing::error!("Database error: {:?}", e);
                    AppError::InternalServerError
                }
            }
        })?;

    Ok(Json(json!({ "message": "User registered successfully" })))
}

/// Exchange credentials for a bearer token
/// POST /login/
pub async fn login(
    State(pool): State<PgPool>,
    State(settings): State<Settings>,
    Form(payload): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let login_failed = || AppError::BadRequest("Login failed".to_string());

    if username.is_empty() || password.is_empty() {
        return Err(login_failed());
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(&username)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Database error: {:?}", e);
            AppError::InternalServerError
        })?
        .ok_or_else(login_failed)?;

    utils::verify_password(&user.password_hash, &password).map_err(|_| login_failed())?;

    if !user.is_active {
        return Err(login_failed());
    }

    let token = jwt::create_token(user.id, &settings.jwt_secret)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
    })))
}

/// POST /logout/
///
/// Tokens are stateless, nothing is revoked server-side.
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "User logged out successfully" }))
}

/// Public profile fields for one user
/// POST /user/:id/
pub async fn get_user_info(
    State(pool): State<PgPool>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserInfo::from(user)))
}
