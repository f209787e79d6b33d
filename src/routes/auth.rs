use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{auth, error::AppError, extract::Json, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let user = auth::register_user(&state, &credentials.username, &credentials.password).await?;
    let session_id = auth::create_session(&state, user.id).await?;
    Ok((
        StatusCode::CREATED,
        auth::apply_session_cookie(jar, &session_id),
        Json(json!({ "username": user.username, "role": user.role })),
    )
        .into_response())
}

async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<Response, AppError> {
    let user = auth::authenticate_user(&state, &credentials.username, &credentials.password).await?;
    let session_id = auth::create_session(&state, user.id).await?;
    Ok((
        auth::apply_session_cookie(jar, &session_id),
        Json(json!({ "username": user.username, "role": user.role })),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, jar: PrivateCookieJar) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    Ok((auth::clear_session_cookie(jar), StatusCode::NO_CONTENT).into_response())
}
