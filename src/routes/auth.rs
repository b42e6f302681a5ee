use crate::{
    auth::{
        equalize_timing, hash_password, normalize_email, verify_password, LoginRequest,
        RegisterRequest, TokenKind, TokenResponse, TokenService,
    },
    auth::token::ACCESS_TOKEN_TTL_SECS,
    error::AppError,
    models::{User, UserProfile},
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// The one message for every credential failure. Never distinguishes
/// unknown email from wrong password.
const LOGIN_FAILED: &str = "email or password incorrect";

/// Register a new account
///
/// Creates the account and returns its public fields. Deliberately does not
/// issue tokens: the caller must log in separately.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);
    let password_hash = hash_password(&payload.password)?;

    // The unique index on users.email is the single source of truth for
    // duplicates; a pre-check SELECT would still race with a concurrent
    // insert.
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, name)
         VALUES ($1, $2, $3, $4)
         RETURNING id, email, password_hash, name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&password_hash)
    .bind(&payload.name)
    .fetch_one(&**pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation("email already registered".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": UserProfile::from(&user)
    })))
}

/// Log in
///
/// Verifies credentials and returns the public account fields plus an
/// access/refresh token pair.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let email = normalize_email(&payload.email);

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, name, created_at FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) => user,
        None => {
            // Burn a hash comparison so unknown-email and wrong-password
            // responses take comparable time.
            equalize_timing(&payload.password);
            return Err(AppError::Unauthorized(LOGIN_FAILED.into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(LOGIN_FAILED.into()));
    }

    let access_token = tokens.issue(user.id, &user.email, TokenKind::Access)?;
    let refresh_token = tokens.issue(user.id, &user.email, TokenKind::Refresh)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "token": TokenResponse {
                access_token,
                refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: ACCESS_TOKEN_TTL_SECS,
            }
        }
    })))
}
