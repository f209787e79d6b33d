use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        session::Session,
        user::{User, UserRole},
    },
    state::AppState,
};

pub const SESSION_COOKIE: &str = "trips_session";

const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub uuid: String,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };

        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT u.id, u.uuid, u.username, u.role \
             FROM sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.id = ? AND s.expires_at > ?",
        )
        .bind(cookie.value())
        .bind(Utc::now())
        .fetch_optional(&state.db)
        .await?;

        Ok(Self(row.map(|(id, uuid, username, role)| {
            AuthenticatedUser {
                id,
                uuid,
                username,
                role: UserRole::from_str_or_default(&role),
            }
        })))
    }
}

impl CurrentUser {
    pub fn require_user(&self) -> Result<&AuthenticatedUser, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<&AuthenticatedUser, AppError> {
        let user = self.require_user()?;
        if user.role == UserRole::Admin {
            Ok(user)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub async fn register_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("username must not be empty"));
    }
    if password.len() < 8 {
        return Err(AppError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::bad_request("username is already taken"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))?
        .to_string();

    let uuid = Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO users (uuid, username, password_hash, role, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&uuid)
    .bind(username)
    .bind(&password_hash)
    .bind(UserRole::User.as_str())
    .bind(Utc::now())
    .execute(&state.db)
    .await?;

    Ok(AuthenticatedUser {
        id: result.last_insert_rowid(),
        uuid,
        username: username.to_string(),
        role: UserRole::User,
    })
}

pub async fn authenticate_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id, uuid, username, password_hash, role, created_at, last_login_at \
         FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(&state.db)
    .await?;

    let Some(user) = user else {
        return Err(AppError::Unauthorized);
    };

    let parsed = PasswordHash::new(&user.password_hash).map_err(|_| AppError::Unauthorized)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)?;

    sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user.id)
        .execute(&state.db)
        .await?;

    Ok(AuthenticatedUser {
        id: user.id,
        uuid: user.uuid,
        username: user.username,
        role: UserRole::from_str_or_default(&user.role),
    })
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4().to_string(),
        user_id,
        created_at: now,
        expires_at: now + Duration::days(SESSION_TTL_DAYS),
    };
    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&state.db)
        .await?;
    Ok(session.id)
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    jar.remove(cookie)
}
