use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CompleteRequest, Tag, Task, TaskInput, TaskListResponse, TaskPatch, TaskQuery},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, user_id, title, description, completed, due_date, priority_id, created_at, updated_at";

/// A task may only reference a shared default priority or one the caller
/// owns; anything else is rejected before touching the tasks table.
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

/// Lists the caller's tasks.
///
/// Supports filtering by completion state and a case-insensitive `search`
/// over title and description, sorting by `due_date` or `created_at`
/// (default `created_at` descending), and `limit`/`offset` pagination.
///
/// The reported `total` is the COUNT of the full filtered set, not the
/// length of the returned page.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let mut filter = String::from("WHERE user_id = $1");
    let mut param_count = 2;

    if query_params.completed.is_some() {
        filter.push_str(&format!(" AND completed = ${}", param_count));
        param_count += 1;
    }
    if query_params.search.is_some() {
        filter.push_str(&format!(
            " AND (title ILIKE ${0} OR description ILIKE ${0})",
            param_count
        ));
        param_count += 1;
    }

    let search_pattern = query_params
        .search
        .as_ref()
        .map(|s| format!("%{}%", s));

    // Same filter drives both queries so the total always matches the set
    // the page was cut from.
    let count_sql = format!("SELECT COUNT(*) FROM tasks {}", filter);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user.0);
    if let Some(completed) = query_params.completed {
        count_query = count_query.bind(completed);
    }
    if let Some(pattern) = &search_pattern {
        count_query = count_query.bind(pattern);
    }
    let total = count_query.fetch_one(&**pool).await?;

    let page_sql = format!(
        "SELECT {} FROM tasks {} ORDER BY {} {} NULLS LAST, id ASC LIMIT ${} OFFSET ${}",
        TASK_COLUMNS,
        filter,
        query_params.sort().column(),
        query_params.order().keyword(),
        param_count,
        param_count + 1,
    );
    let mut page_query = sqlx::query_as::<_, Task>(&page_sql).bind(user.0);
    if let Some(completed) = query_params.completed {
        page_query = page_query.bind(completed);
    }
    if let Some(pattern) = &search_pattern {
        page_query = page_query.bind(pattern);
    }
    let items = page_query
        .bind(query_params.limit())
        .bind(query_params.offset())
        .fetch_all(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(TaskListResponse {
        items,
        total,
        limit: query_params.limit(),
        offset: query_params.offset(),
    }))
}

/// Creates a task for the caller.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: the referenced priority is unknown or not usable.
/// - `422 Unprocessable Entity`: title/description validation failed.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    if let Some(priority_id) = task_data.priority_id {
        ensure_priority_usable(&pool, priority_id, user.0).await?;
    }

    let task = Task::new(task_data.into_inner(), user.0);

    let created: Task = sqlx::query_as(&format!(
        "INSERT INTO tasks (id, user_id, title, description, completed, due_date, priority_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(task.id)
    .bind(task.user_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.due_date)
    .bind(task.priority_id)
    .bind(task.created_at)
    .bind(task.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Fetches one task. A task owned by a different user is indistinguishable
/// from a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task: Option<Task> = sqlx::query_as(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
    ))
    .bind(task_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Partial update. Omitted fields keep their stored values; ownership is
/// enforced in the WHERE clause, so a cross-user id comes back as 404.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("Empty update".into()));
    }

    if let Some(priority_id) = patch.priority_id {
        ensure_priority_usable(&pool, priority_id, user.0).await?;
    }

    let updated: Option<Task> = sqlx::query_as(&format!(
        "UPDATE tasks
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             due_date = COALESCE($3, due_date),
             priority_id = COALESCE($4, priority_id),
             completed = COALESCE($5, completed),
             updated_at = $6
         WHERE id = $7 AND user_id = $8
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.due_date)
    .bind(patch.priority_id)
    .bind(patch.completed)
    .bind(Utc::now())
    .bind(task_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Dedicated completion toggle. Idempotent: repeating the same value leaves
/// the row unchanged and still succeeds.
#[patch("/{id}/complete")]
pub async fn toggle_complete(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    body: web::Json<CompleteRequest>,
) -> Result<impl Responder, AppError> {
    let updated: Option<Task> = sqlx::query_as(&format!(
        "UPDATE tasks SET completed = $1, updated_at = $2
         WHERE id = $3 AND user_id = $4
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(body.completed)
    .bind(Utc::now())
    .bind(task_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task. Zero rows affected means missing or not owned; both are
/// 404.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

async fn ensure_task_owned(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let owned: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    match owned {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Tags attached to one of the caller's tasks.
#[get("/{id}/tags")]
pub async fn list_task_tags(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    ensure_task_owned(&pool, task_id, user.0).await?;

    let tags: Vec<Tag> = sqlx::query_as(
        "SELECT t.id, t.user_id, t.name, t.color, t.created_at, t.updated_at
         FROM tags t
         JOIN task_tags tt ON tt.tag_id = t.id
         WHERE tt.task_id = $1
         ORDER BY t.name",
    )
    .bind(task_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tags))
}

/// Attaches an owned tag to an owned task. Re-attaching is a no-op.
#[post("/{id}/tags/{tag_id}")]
pub async fn attach_tag(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (task_id, tag_id) = path.into_inner();
    ensure_task_owned(&pool, task_id, user.0).await?;

    let tag: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE id = $1 AND user_id = $2")
        .bind(tag_id)
        .bind(user.0)
        .fetch_optional(&**pool)
        .await?;
    if tag.is_none() {
        return Err(AppError::NotFound("Tag not found".into()));
    }

    sqlx::query("INSERT INTO task_tags (task_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(task_id)
        .bind(tag_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Detaches a tag from a task. Detaching a tag that is not attached is a
/// no-op as well.
#[delete("/{id}/tags/{tag_id}")]
pub async fn detach_tag(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (task_id, tag_id) = path.into_inner();
    ensure_task_owned(&pool, task_id, user.0).await?;

    sqlx::query("DELETE FROM task_tags WHERE task_id = $1 AND tag_id = $2")
        .bind(task_id)
        .bind(tag_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
