use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Priority, PriorityInput, PriorityPatch},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const PRIORITY_COLUMNS: &str = "id, user_id, name, value, color, created_at, updated_at";

/// Shared defaults plus the caller's own priorities, ordered by weight.
#[get("")]
pub async fn list_priorities(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let priorities: Vec<Priority> = sqlx::query_as(&format!(
        "SELECT {PRIORITY_COLUMNS} FROM priorities
         WHERE user_id IS NULL OR user_id = $1
         ORDER BY value, name"
    ))
    .bind(user.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(priorities))
}

/// Creates a caller-owned priority. Name clashes with the caller's existing
/// priorities are conflicts (the partial unique index enforces this; the
/// explicit check gives the clearer message).
#[post("")]
pub async fn create_priority(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    input: web::Json<PriorityInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let clash: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM priorities WHERE user_id = $1 AND name = $2")
            .bind(user.0)
            .bind(&input.name)
            .fetch_optional(&**pool)
            .await?;
    if clash.is_some() {
        return Err(AppError::Conflict(
            "Priority with this name already exists".into(),
        ));
    }

    let priority = Priority::new(input.into_inner(), user.0);

    let created: Priority = sqlx::query_as(&format!(
        "INSERT INTO priorities (id, user_id, name, value, color, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {PRIORITY_COLUMNS}"
    ))
    .bind(priority.id)
    .bind(priority.user_id)
    .bind(&priority.name)
    .bind(priority.value)
    .bind(&priority.color)
    .bind(priority.created_at)
    .bind(priority.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Updates a caller-owned priority. Shared defaults and other users' rows
/// answer 404, never 403.
#[put("/{id}")]
pub async fn update_priority(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    priority_id: web::Path<Uuid>,
    patch: web::Json<PriorityPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;

    let updated: Option<Priority> = sqlx::query_as(&format!(
        "UPDATE priorities
         SET name = COALESCE($1, name),
             value = COALESCE($2, value),
             color = COALESCE($3, color),
             updated_at = $4
         WHERE id = $5 AND user_id = $6
         RETURNING {PRIORITY_COLUMNS}"
    ))
    .bind(&patch.name)
    .bind(patch.value)
    .bind(&patch.color)
    .bind(Utc::now())
    .bind(priority_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(priority) => Ok(HttpResponse::Ok().json(priority)),
        None => Err(AppError::NotFound("Priority not found".into())),
    }
}

/// Deletes a caller-owned priority. Tasks that referenced it fall back to no
/// priority via the foreign key's ON DELETE SET NULL.
#[delete("/{id}")]
pub async fn delete_priority(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    priority_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM priorities WHERE id = $1 AND user_id = $2")
        .bind(priority_id.into_inner())
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Priority not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
