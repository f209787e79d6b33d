use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::CurrentUser,
    error::AppError,
    extract::Json,
    models::{
        review::NewReview,
        trip::{NewTrip, TripPatch},
    },
    state::AppState,
};

/// All GET endpoints are public; every mutation requires a session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_trips).post(create_trip))
        .route("/status", get(api_status))
        .route(
            "/:id",
            get(get_trip)
                .put(replace_trip)
                .patch(patch_trip)
                .delete(delete_trip),
        )
        .route("/:id/deactivate", patch(deactivate_trip))
        .route("/:id/reserve", post(reserve_seats))
        .route("/:id/reviews", get(list_reviews).post(create_review))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    destination: Option<String>,
    category: Option<String>,
    price_min: Option<f64>,
    price_max: Option<f64>,
    #[serde(default = "default_only_active")]
    only_active: bool,
}

fn default_only_active() -> bool {
    true
}

async fn search_trips(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let trips = state
        .trips
        .search(
            params.destination.as_deref(),
            params.category.as_deref(),
            params.price_min,
            params.price_max,
            params.only_active,
        )
        .await?;
    Ok(Json(trips).into_response())
}

async fn api_status(State(state): State<AppState>) -> Result<Response, AppError> {
    let total_trips = state.trips.list_all().await?.len();
    let active_trips = state.trips.list_active().await?.len();
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "total_trips": total_trips,
        "active_trips": active_trips,
    }))
    .into_response())
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let trip = state.trips.get(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(trip).into_response())
}

async fn create_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(new): Json<NewTrip>,
) -> Result<Response, AppError> {
    current.require_user()?;
    let trip = state.trips.create(new).await?;
    Ok((StatusCode::CREATED, Json(trip)).into_response())
}

async fn replace_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewTrip>,
) -> Result<Response, AppError> {
    current.require_user()?;
    let trip = state.trips.replace(id, new).await?.ok_or(AppError::NotFound)?;
    Ok(Json(trip).into_response())
}

async fn patch_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<TripPatch>,
) -> Result<Response, AppError> {
    current.require_user()?;
    let trip = state.trips.patch(id, patch).await?.ok_or(AppError::NotFound)?;
    Ok(Json(trip).into_response())
}

async fn delete_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    current.require_user()?;
    if state.trips.delete(id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(AppError::NotFound)
    }
}

async fn deactivate_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    current.require_user()?;
    if state.trips.deactivate(id).await? {
        Ok(Json(json!({ "message": "trip deactivated" })).into_response())
    } else {
        Err(AppError::NotFound)
    }
}

#[derive(Debug, Deserialize)]
struct ReserveRequest {
    quantity: i64,
}

async fn reserve_seats(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<ReserveRequest>,
) -> Result<Response, AppError> {
    current.require_user()?;
    if request.quantity <= 0 {
        return Err(AppError::bad_request("quantity must be a positive integer"));
    }
    if state.trips.reserve_seats(id, request.quantity).await? {
        Ok(Json(json!({
            "message": format!("reserved {} seat(s)", request.quantity)
        }))
        .into_response())
    } else {
        Err(AppError::bad_request(
            "reservation refused, check availability",
        ))
    }
}

async fn create_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(new): Json<NewReview>,
) -> Result<Response, AppError> {
    current.require_user()?;
    let review = state.reviews.add(id, new).await?;
    Ok((StatusCode::CREATED, Json(review)).into_response())
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let reviews = state.reviews.list_by_trip(id).await?;
    Ok(Json(reviews).into_response())
}
