use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    AppState,
    error::ApiError,
    models::{Booking, ClassView, ClientBooking, CreateBookingRequest},
    validation::{parse_timezone, require_email, validate_booking},
};

#[derive(Debug, serde::Deserialize)]
pub struct ClassesQuery {
    pub timezone: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
    pub timezone: Option<String>,
}

#[utoipa::path(get, path = "/", tag = "booking")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Fitness Booking API",
        "endpoints": {
            "/classes": "List upcoming classes",
            "/book": "Book a class",
            "/bookings": "List a client's upcoming bookings"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "booking")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 503, description = "Store unreachable")
    ),
    tag = "booking"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))),
        Err(err) => {
            warn!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/classes",
    params(
        ("timezone" = Option<String>, Query, description = "IANA timezone such as 'Asia/Kolkata' or 'UTC'")
    ),
    responses(
        (status = 200, description = "Upcoming classes, earliest first", body = [ClassView]),
        (status = 400, description = "Unknown timezone"),
        (status = 500, description = "Internal server error")
    ),
    tag = "booking"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    Query(query): Query<ClassesQuery>,
) -> Result<Json<Vec<ClassView>>, ApiError> {
    let tz = parse_timezone(query.timezone.as_deref())?;
    info!(tz = tz.name(), "fetching upcoming fitness classes");

    let classes = state.store.upcoming_classes(Utc::now()).await?;
    Ok(Json(classes.iter().map(|c| c.in_timezone(tz)).collect()))
}

#[utoipa::path(
    post,
    path = "/book",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Validation failed, class full or already booked"),
        (status = 500, description = "Internal server error")
    ),
    tag = "booking"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let booking = validate_booking(request)?;

    let created = state.store.create_booking(&booking).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/bookings",
    params(
        ("email" = String, Query, description = "Client email"),
        ("timezone" = Option<String>, Query, description = "IANA timezone for class times")
    ),
    responses(
        (status = 200, description = "Upcoming bookings, earliest class first", body = [ClientBooking]),
        (status = 400, description = "Missing email or unknown timezone"),
        (status = 500, description = "Internal server error")
    ),
    tag = "booking"
)]
pub async fn list_client_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<ClientBooking>>, ApiError> {
    let email = require_email(query.email.as_deref())?;
    let tz = parse_timezone(query.timezone.as_deref())?;

    let rows = state.store.client_bookings(&email, Utc::now()).await?;
    Ok(Json(rows.into_iter().map(|r| r.in_timezone(tz)).collect()))
}
