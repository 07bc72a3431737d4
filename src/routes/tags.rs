use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Tag, TagInput, TagPatch},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TAG_COLUMNS: &str = "id, user_id, name, color, created_at, updated_at";

#[get("")]
pub async fn list_tags(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tags: Vec<Tag> = sqlx::query_as(&format!(
        "SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 ORDER BY name"
    ))
    .bind(user.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tags))
}

/// Creates a tag. The (user, name) unique constraint turns duplicates into
/// a 409 through the `From<sqlx::Error>` mapping.
#[post("")]
pub async fn create_tag(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    input: web::Json<TagInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let tag = Tag::new(input.into_inner(), user.0);

    let created: Tag = sqlx::query_as(&format!(
        "INSERT INTO tags (id, user_id, name, color, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {TAG_COLUMNS}"
    ))
    .bind(tag.id)
    .bind(tag.user_id)
    .bind(&tag.name)
    .bind(&tag.color)
    .bind(tag.created_at)
    .bind(tag.updated_at)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(created))
}

#[put("/{id}")]
pub async fn update_tag(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    tag_id: web::Path<Uuid>,
    patch: web::Json<TagPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;

    let updated: Option<Tag> = sqlx::query_as(&format!(
        "UPDATE tags
         SET name = COALESCE($1, name),
             color = COALESCE($2, color),
             updated_at = $3
         WHERE id = $4 AND user_id = $5
         RETURNING {TAG_COLUMNS}"
    ))
    .bind(&patch.name)
    .bind(&patch.color)
    .bind(Utc::now())
    .bind(tag_id.into_inner())
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?;

    match updated {
        Some(tag) => Ok(HttpResponse::Ok().json(tag)),
        None => Err(AppError::NotFound("Tag not found".into())),
    }
}

/// Deletes a tag; the join rows cascade away with it.
#[delete("/{id}")]
pub async fn delete_tag(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    tag_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
        .bind(tag_id.into_inner())
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Tag not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
