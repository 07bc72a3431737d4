use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{RecurringTask, RecurringTaskInput, RecurringTaskPatch, TaskInstance},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const RECURRING_COLUMNS: &str = "id, user_id, title, description, priority_id, frequency, \
     interval_count, next_due_at, active, created_at, updated_at";

/// A template may only reference a shared default priority or one the
/// caller owns, on every write path.
async fn ensure_priority_usable(
    pool: &PgPool,
    priority_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    let usable: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM priorities WHERE id = $1 AND (user_id IS NULL OR user_id = $2)",
    )
    .bind(priority_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match usable {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest("Unknown priority".into())),
    }
}

#[get("")]
pub async fn list_recurring(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let templates: Vec<RecurringTask> = sqlx::query_as(&format!(
        "SELECT {RECURRING_COLUMNS} FROM recurring_tasks WHERE user_id = $1 ORDER BY next_due_at"
    ))
    .bind(user.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(templates))
}

#[post("")]
pub async fn create_recurring(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    input: web::Json<RecurringTaskInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    if let Some(priority_id) = input.priority_id {
        ensure_priority_usable(&pool, priority_id, user.0).await?;
    }

    let template = RecurringTask::new(input.into_inner(), user.0);

    let created: RecurringTask = sqlx::query_as(&format!(
        "INSERT INTO recurring_tasks
             (id, user_id, title, description, priority_id, frequency, interval_count,
              next_due_at, active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {RECURRING_COLUMNS}"
    ))
    .bind(template.id)
    .bind(template.user_id)
    .bind(&template.title)
    .bind(&template.description)
    .bind(template.priority_id)
    .bind(template.frequency)
    .bind(template.interval_count)
    .bind(template.next_due_at)
    .bind(template.active)
    .bind(template.created_at)
    .bind(template.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(created))
}

#[get("/{id}")]
pub async fn get_recurring(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    template_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let template: Option<RecurringTask> = sqlx::query_as(&format!(
        "SELECT {RECURRING_COLUMNS} FROM recurring_tasks WHERE id = $1 AND user_id = $2"
    ))
    .bind(template_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match template {
        Some(template) => Ok(HttpResponse::Ok().json(template)),
        None => Err(AppError::NotFound("Recurring task not found".into())),
    }
}

#[put("/{id}")]
pub async fn update_recurring(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    template_id: web::Path<Uuid>,
    patch: web::Json<RecurringTaskPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("Empty update".into()));
    }
    if let Some(priority_id) = patch.priority_id {
        ensure_priority_usable(&pool, priority_id, user.0).await?;
    }

    let updated: Option<RecurringTask> = sqlx::query_as(&format!(
        "UPDATE recurring_tasks
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             priority_id = COALESCE($3, priority_id),
             frequency = COALESCE($4, frequency),
             interval_count = COALESCE($5, interval_count),
             next_due_at = COALESCE($6, next_due_at),
             active = COALESCE($7, active),
             updated_at = $8
         WHERE id = $9 AND user_id = $10
         RETURNING {RECURRING_COLUMNS}"
    ))
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.priority_id)
    .bind(patch.frequency)
    .bind(patch.interval_count)
    .bind(patch.next_due_at)
    .bind(patch.active)
    .bind(Utc::now())
    .bind(template_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(template) => Ok(HttpResponse::Ok().json(template)),
        None => Err(AppError::NotFound("Recurring task not found".into())),
    }
}

#[delete("/{id}")]
pub async fn delete_recurring(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    template_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM recurring_tasks WHERE id = $1 AND user_id = $2")
        .bind(template_id.into_inner())
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Recurring task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Materializes the next occurrence of a template and advances its
/// `next_due_at` by one recurrence step. Both writes happen in one
/// transaction; spawning an inactive template is rejected.
#[post("/{id}/spawn")]
pub async fn spawn_instance(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    template_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let mut tx = pool.begin().await?;

    let template: Option<RecurringTask> = sqlx::query_as(&format!(
        "SELECT {RECURRING_COLUMNS} FROM recurring_tasks
         WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(template_id.into_inner())
    .bind(user.0)
    .fetch_optional(&mut *tx)
    .await?;

    let template = template.ok_or_else(|| AppError::NotFound("Recurring task not found".into()))?;
    if !template.active {
        return Err(AppError::BadRequest("Recurring task is inactive".into()));
    }

    let instance = TaskInstance::spawn(&template);
    sqlx::query(
        "INSERT INTO task_instances (id, recurring_task_id, user_id, due_at, completed, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(instance.id)
    .bind(instance.recurring_task_id)
    .bind(instance.user_id)
    .bind(instance.due_at)
    .bind(instance.completed)
    .bind(instance.created_at)
    .execute(&mut *tx)
    .await?;

    let next_due = template
        .frequency
        .advance(template.next_due_at, template.interval_count);
    sqlx::query("UPDATE recurring_tasks SET next_due_at = $1, updated_at = $2 WHERE id = $3")
        .bind(next_due)
        .bind(Utc::now())
        .bind(template.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(HttpResponse::Created().json(instance))
}

/// Occurrences spawned from one of the caller's templates.
#[get("/{id}/instances")]
pub async fn list_instances(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    template_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let template_id = template_id.into_inner();

    let owned: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM recurring_tasks WHERE id = $1 AND user_id = $2")
            .bind(template_id)
            .bind(user.0)
            .fetch_optional(&**pool)
            .await?;
    if owned.is_none() {
        return Err(AppError::NotFound("Recurring task not found".into()));
    }

    let instances: Vec<TaskInstance> = sqlx::query_as(
        "SELECT id, recurring_task_id, user_id, due_at, completed, created_at
         FROM task_instances WHERE recurring_task_id = $1
         ORDER BY due_at",
    )
    .bind(template_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(instances))
}
