use crate::{
    auth::{normalize_email, AuthenticatedUser},
    error::AppError,
    models::{UpdateProfileRequest, User, UserResponse},
};
use actix_web::{get, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, is_active, created_at, updated_at";

/// Current user's profile.
#[get("/me")]
pub async fn get_me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let row: User = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(row)))
}

/// Update the current user's profile. A changed email is re-normalized and
/// re-checked for uniqueness against every other account.
#[put("/me")]
pub async fn update_me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    update: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let update = update.into_inner();

    let new_email = match &update.email {
        Some(raw) => Some(normalize_email(raw)?),
        None => None,
    };

    if let Some(email) = &new_email {
        let taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(user.0)
                .fetch_optional(&**pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "Email already registered by another user".into(),
            ));
        }
    }

    let updated: User = sqlx::query_as(&format!(
        "UPDATE users
         SET email = COALESCE($1, email),
             first_name = COALESCE($2, first_name),
             last_name = COALESCE($3, last_name),
             updated_at = $4
         WHERE id = $5
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&new_email)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(Utc::now())
    .bind(user.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
