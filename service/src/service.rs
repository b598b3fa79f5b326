use abi::{AvailabilityQuery, BookingId, BookingRequest, PropertyId, StatusUpdate};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use booking::Bookings;
use serde_json::json;

use crate::{ApiError, AppState};

type Reply = Result<axum::response::Response, ApiError>;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "success": true }))
}

pub async fn create_booking(
    State(svc): State<AppState>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> Reply {
    let Json(req) = body?;
    let booking = svc.manager.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "booking": booking })),
    )
        .into_response())
}

pub async fn list_bookings(State(svc): State<AppState>) -> Reply {
    let bookings = svc.manager.list().await?;
    Ok(Json(json!({ "success": true, "bookings": bookings })).into_response())
}

pub async fn list_by_property(
    State(svc): State<AppState>,
    path: Result<Path<PropertyId>, PathRejection>,
) -> Reply {
    let Path(property_id) = path?;
    let bookings = svc.manager.list_by_property(property_id).await?;
    Ok(Json(json!({ "success": true, "bookings": bookings })).into_response())
}

pub async fn list_by_traveller(
    State(svc): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Reply {
    let Path(traveller_id) = path?;
    let bookings = svc.manager.list_by_traveller(traveller_id).await?;
    Ok(Json(json!({ "success": true, "bookings": bookings })).into_response())
}

pub async fn get_booking(
    State(svc): State<AppState>,
    path: Result<Path<BookingId>, PathRejection>,
) -> Reply {
    let Path(id) = path?;
    let booking = svc.manager.get(id).await?;
    Ok(Json(json!({ "success": true, "booking": booking })).into_response())
}

pub async fn check_availability(
    State(svc): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Reply {
    let Query(query) = query?;
    let unavailable = svc.manager.check_availability(query).await?;
    Ok(Json(json!({ "success": true, "unavailableRoomIds": unavailable })).into_response())
}

pub async fn update_status(
    State(svc): State<AppState>,
    path: Result<Path<BookingId>, PathRejection>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Reply {
    let Path(id) = path?;
    let Json(update) = body?;
    let status = update.validate()?;

    let booking = svc.manager.update_status(id, status).await?;
    Ok(Json(json!({ "success": true, "booking": booking })).into_response())
}

pub async fn check_in(
    State(svc): State<AppState>,
    path: Result<Path<BookingId>, PathRejection>,
) -> Reply {
    let Path(id) = path?;
    let booking = svc.manager.check_in(id).await?;
    Ok(Json(json!({ "success": true, "booking": booking })).into_response())
}

pub async fn check_out(
    State(svc): State<AppState>,
    path: Result<Path<BookingId>, PathRejection>,
) -> Reply {
    let Path(id) = path?;
    let booking = svc.manager.check_out(id).await?;
    Ok(Json(json!({ "success": true, "booking": booking })).into_response())
}
