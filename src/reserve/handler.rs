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
    error::AppError,
    reserve::{
        parse_activity_date, parse_reservation_time, ActivityDetail, ActivityForm,
        ActivitySummary, ManageReservationForm, ReservationDetail, ReservationForm,
        ReservationStatus, DATE_FORMAT, TIME_FORMAT,
    },
};

/// All activities, soonest first
/// GET /activities/
pub async fn get_activity_list(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, ActivityListRow>(
        "SELECT id, name, date FROM activities ORDER BY date ASC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?;

    let activities: Vec<ActivitySummary> = rows
        .into_iter()
        .map(|row| ActivitySummary {
            id: row.id,
            name: row.name,
            date: row.date.format(DATE_FORMAT).to_string(),
        })
        .collect();

    Ok(Json(activities))
}

/// GET /activities/:id/
pub async fn get_activity_detail(
    State(pool): State<PgPool>,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, ActivityRow>(
        "SELECT id, name, date, location, description FROM activities WHERE id = $1",
    )
    .bind(activity_id)
    .fetch_optional(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?
    .ok_or(AppError::NotFound("Activity not found".to_string()))?;

    Ok(Json(ActivityDetail {
        id: row.id,
        name: row.name,
        date: row.date.format(DATE_FORMAT).to_string(),
        location: row.location,
        description: row.description,
    }))
}

/// Create an activity (staff only)
/// POST /activities/create/
pub async fn create_activity(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Form(payload): Form<ActivityForm>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&pool, claims.sub).await?;

    let name = payload.name.unwrap_or_default();
    let date = payload.date.unwrap_or_default();
    let location = payload.location.unwrap_or_default();

    if name.is_empty() || date.is_empty() || location.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide name, date, and location".to_string(),
        ));
    }

    let date = parse_activity_date(&date)
        .ok_or_else(|| AppError::BadRequest("Invalid date format".to_string()))?;
    let description = payload.description.filter(|s| !s.is_empty());

    let activity_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO activities (id, name, date, location, description, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(activity_id)
    .bind(&name)
    .bind(date)
    .bind(&location)
    .bind(&description)
    .bind(claims.sub)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create activity: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(Json(json!({
        "message": "Activity created successfully",
        "activity_id": activity_id,
    })))
}

/// Update any provided fields of an activity (staff only)
/// POST /activities/:id/edit/
pub async fn edit_activity(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(activity_id): Path<Uuid>,
    Form(payload): Form<ActivityForm>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&pool, claims.sub).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    sqlx::query("SELECT id FROM activities WHERE id = $1")
        .bind(activity_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Activity not found".to_string()))?;

    if let Some(name) = payload.name.filter(|s| !s.is_empty()) {
        sqlx::query("UPDATE activities SET name = $1 WHERE id = $2")
            .bind(&name)
            .bind(activity_id)
            .execute(&mut *tx)
            .await
            .map_err(|_| AppError::InternalServerError)?;
    }

    if let Some(raw) = payload.date.filter(|s| !s.is_empty()) {
        let date = parse_activity_date(&raw)
            .ok_or_else(|| AppError::BadRequest("Invalid date format".to_string()))?;
        sqlx::query("UPDATE activities SET date = $1 WHERE id = $2")
            .bind(date)
            .bind(activity_id)
            .execute(&mut *tx)
            .await
            .map_err(|_| AppError::InternalServerError)?;
    }

    if let Some(location) = payload.location.filter(|s| !s.is_empty()) {
        sqlx::query("UPDATE activities SET location = $1 WHERE id = $2")
            .bind(&location)
            .bind(activity_id)
            .execute(&mut *tx)
            .await
            .map_err(|_| AppError::InternalServerError)?;
    }

    if let Some(description) = payload.description.filter(|s| !s.is_empty()) {
        sqlx::query("UPDATE activities SET description = $1 WHERE id = $2")
            .bind(&description)
            .bind(activity_id)
            .execute(&mut *tx)
            .await
            .map_err(|_| AppError::InternalServerError)?;
    }

    tx.commit()
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({ "message": "Activity edited successfully" })))
}

/// Delete an activity and its reservations (staff only)
/// POST /activities/:id/delete/
pub async fn delete_activity(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&pool, claims.sub).await?;

    let result = sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(activity_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Activity not found".to_string()));
    }

    Ok(Json(json!({ "message": "Activity deleted successfully" })))
}

/// Reserve a spot on an activity
/// POST /reservations/create/
pub async fn create_reservation(
    State(pool): State<PgPool>,
    Form(payload): Form<ReservationForm>,
) -> Result<impl IntoResponse, AppError> {
    let activity = payload.activity_id.unwrap_or_default();
    let user = payload.user_id.unwrap_or_default();
    let time = payload.reservation_time.unwrap_or_default();

    if activity.is_empty() || user.is_empty() || time.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide activity_id, user_id, and reservation_time".to_string(),
        ));
    }

    let reservation_time = parse_reservation_time(&time)
        .ok_or_else(|| AppError::BadRequest("Invalid reservation time format".to_string()))?;

    let activity_id: Uuid = activity
        .parse()
        .map_err(|_| AppError::NotFound("Activity not found".to_string()))?;
    let user_id: Uuid = user
        .parse()
        .map_err(|_| AppError::NotFound("User not found".to_string()))?;

    sqlx::query("SELECT id FROM activities WHERE id = $1")
        .bind(activity_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Activity not found".to_string()))?;

    sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let reservation_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO reservations (id, activity_id, user_id, reservation_time)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(reservation_id)
    .bind(activity_id)
    .bind(user_id)
    .bind(reservation_time)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create reservation: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(Json(json!({
        "message": "Reservation created successfully",
        "reservation_id": reservation_id,
    })))
}

/// GET /reservations/:id/
pub async fn get_reservation_detail(
    State(pool): State<PgPool>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, ReservationRow>(
        "SELECT id, activity_id, user_id, reservation_time, status FROM reservations WHERE id = $1",
    )
    .bind(reservation_id)
    .fetch_optional(&pool)
    .await
    .map_err(|_| AppError::InternalServerError)?
    .ok_or(AppError::NotFound("Reservation not found".to_string()))?;

    Ok(Json(ReservationDetail {
        id: row.id,
        activity_id: row.activity_id,
        user_id: row.user_id,
        reservation_time: row.reservation_time.format(TIME_FORMAT).to_string(),
        status: row.status,
    }))
}

/// Cancel a reservation. Cancelling twice is a no-op.
/// POST /reservations/:id/cancel/
pub async fn cancel_reservation(
    State(pool): State<PgPool>,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE reservations SET status = $1 WHERE id = $2")
        .bind(ReservationStatus::Cancelled)
        .bind(reservation_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Reservation not found".to_string()));
    }

    Ok(Json(json!({ "message": "Reservation canceled successfully" })))
}

/// Set a reservation's status (staff only)
/// POST /reservations/:id/manage/
pub async fn manage_reservation(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    Path(reservation_id): Path<Uuid>,
    Form(payload): Form<ManageReservationForm>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&pool, claims.sub).await?;

    sqlx::query("SELECT id FROM reservations WHERE id = $1")
        .bind(reservation_id)
        .fetch_optional(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::NotFound("Reservation not found".to_string()))?;

    let status = payload
        .status
        .as_deref()
        .and_then(ReservationStatus::parse)
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

    sqlx::query("UPDATE reservations SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(reservation_id)
        .execute(&pool)
        .await
        .map_err(|_| AppError::InternalServerError)?;

    Ok(Json(json!({ "message": "Reservation managed successfully" })))
}

async fn require_staff(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let row = sqlx::query("SELECT is_staff FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|_| AppError::InternalServerError)?
        .ok_or(AppError::Unauthorized)?;

    let is_staff: bool = row.get("is_staff");
    if !is_staff {
        return Err(AppError::Forbidden("Staff access required.".to_string()));
    }

    Ok(())
}

#[derive(FromRow)]
struct ActivityListRow {
    id: Uuid,
    name: String,
    date: chrono::NaiveDate,
}

#[derive(FromRow)]
struct ActivityRow {
    id: Uuid,
    name: String,
    date: chrono::NaiveDate,
    location: String,
    description: Option<String>,
}

#[derive(FromRow)]
struct ReservationRow {
    id: Uuid,
    activity_id: Uuid,
    user_id: Uuid,
    reservation_time: chrono::NaiveDateTime,
    status: ReservationStatus,
}
