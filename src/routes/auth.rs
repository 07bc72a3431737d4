use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AuthResponse, ForgotPasswordRequest,
        LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest, TokenManager,
        TokenType,
    },
    error::AppError,
    models::{PasswordResetToken, User, UserResponse},
};
use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns its public fields. No tokens are issued;
/// the caller logs in afterwards. A duplicate email, in any letter casing,
/// is a conflict.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();
    let email = normalize_email(&register_data.email)?;

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&**pool)
        .await?;

    if existing.is_some() {
        log::warn!("registration attempt with existing email: {}", email);
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password)?;
    let user = User::new(
        email,
        password_hash,
        register_data.first_name,
        register_data.last_name,
    );

    let created: User = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, email, password_hash, first_name, last_name, is_active, created_at, updated_at",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&**pool)
    .await?;

    log::info!("user registered: {} ({})", created.email, created.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully. Please log in.",
        "user": UserResponse::from(created)
    })))
}

/// Login user
///
/// Unknown email and wrong password produce the same response, so a caller
/// cannot learn which one was at fault.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let email = normalize_email(&login_data.email)?;

    let user: Option<User> = sqlx::query_as(
        "SELECT id, email, password_hash, first_name, last_name, is_active, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&**pool)
    .await?;

    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let user = user.ok_or_else(invalid)?;
    if !user.is_active || !verify_password(&login_data.password, &user.password_hash) {
        return Err(invalid());
    }

    let pair = tokens.issue_pair(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: pair.token_type,
        user: UserResponse::from(user),
    }))
}

/// Exchange a valid refresh token for a new access/refresh pair. Access
/// tokens, or tokens for users that no longer exist or were deactivated,
/// are rejected.
#[post("/refresh")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let claims = tokens.verify(&refresh_data.refresh_token, TokenType::Refresh)?;

    let active: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(&**pool)
        .await?;

    match active {
        Some((true,)) => {
            let pair = tokens.issue_pair(claims.sub)?;
            Ok(HttpResponse::Ok().json(pair))
        }
        _ => Err(AppError::Unauthorized("Invalid refresh token".into())),
    }
}

/// Log out. Tokens are stateless and simply expire; there is no server-side
/// blacklist.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Successfully logged out" }))
}

/// Issue a password reset token. The response is identical whether or not
/// the account exists. Without a mailer the token is surfaced through the
/// server log.
#[post("/forgot-password")]
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, AppError> {
    let acknowledged = HttpResponse::Ok().json(json!({
        "message": "If the account exists, a reset token has been issued"
    }));

    let email = match normalize_email(&request.email) {
        Ok(email) => email,
        Err(_) => return Ok(acknowledged),
    };

    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&**pool)
        .await?;

    if let Some((user_id,)) = user {
        let reset = PasswordResetToken::issue(user_id);
        sqlx::query(
            "INSERT INTO password_reset_tokens (id, user_id, token, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(reset.id)
        .bind(reset.user_id)
        .bind(&reset.token)
        .bind(reset.expires_at)
        .bind(reset.created_at)
        .execute(&**pool)
        .await?;

        log::info!("password reset token for {}: {}", email, reset.token);
    }

    Ok(acknowledged)
}

/// Redeem a reset token. A token can be used at most once and only before
/// its expiry; every failure mode gets the same response. The token is
/// consumed and the hash replaced in one transaction.
#[post("/reset-password")]
pub async fn reset_password(
    pool: web::Data<PgPool>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, AppError> {
    request.validate()?;

    let rejected = || AppError::BadRequest("Invalid or expired reset token".into());

    let mut tx = pool.begin().await?;

    let reset: Option<PasswordResetToken> = sqlx::query_as(
        "SELECT id, user_id, token, expires_at, used_at, created_at
         FROM password_reset_tokens WHERE token = $1 FOR UPDATE",
    )
    .bind(&request.token)
    .fetch_optional(&mut *tx)
    .await?;

    let reset = reset.ok_or_else(rejected)?;
    if !reset.is_redeemable(Utc::now()) {
        return Err(rejected());
    }

    let password_hash = hash_password(&request.new_password)?;

    sqlx::query("UPDATE password_reset_tokens SET used_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(reset.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
        .bind(&password_hash)
        .bind(Utc::now())
        .bind(reset.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    log::info!("password reset completed for user {}", reset.user_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Password has been reset" })))
}
