use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    config::AppConfig,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, PublicUser, VerifyResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
};

const TOKEN_LIFETIME_HOURS: i64 = 8;

pub async fn login(pool: &DbPool, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".into(),
        ));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username.as_str())
        .fetch_optional(pool)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid credentials".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid credentials".into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    };

    Ok(ApiResponse::success("Logged in", resp))
}

/// Re-reads the token's user so a deleted admin stops verifying immediately.
pub async fn verify(pool: &DbPool, auth: &AuthUser) -> AppResult<ApiResponse<VerifyResponse>> {
    let user: Option<PublicUser> =
        sqlx::query_as("SELECT id, username, role FROM users WHERE id = $1")
            .bind(auth.user_id)
            .fetch_optional(pool)
            .await?;
    let user = user.ok_or(AppError::Unauthorized)?;
    Ok(ApiResponse::success(
        "Token valid",
        VerifyResponse { user },
    ))
}

/// Startup bootstrap: make sure one admin credential exists so the dashboard
/// is reachable on a fresh database.
pub async fn ensure_default_admin(pool: &DbPool, config: &AppConfig) -> anyhow::Result<()> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 AND role = 'admin'")
            .bind(&config.admin_username)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        tracing::debug!("default admin already present");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(config.admin_password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    sqlx::query("INSERT INTO users (username, password_hash, role) VALUES ($1, $2, 'admin')")
        .bind(&config.admin_username)
        .bind(password_hash)
        .execute(pool)
        .await?;

    tracing::info!(username = %config.admin_username, "created default admin");
    Ok(())
}
