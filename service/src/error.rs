use abi::Error;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Error returned by every handler, rendered as `{success: false, message}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidDateFormat
            | Error::InvalidDateRange
            | Error::PastCheckIn
            | Error::InvalidRoomPrice
            | Error::RoomUnavailable
            | Error::InvalidStatus(_)
            | Error::InvalidTransition { .. }
            | Error::NotConfirmed
            | Error::AlreadyCheckedIn
            | Error::NotCheckedIn
            | Error::MissingParameters
            | Error::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Error::RoomNotFound | Error::BookingNotFound | Error::NoRoomsForProperty => {
                StatusCode::NOT_FOUND
            }
            Error::UpdateFailed
            | Error::ConfigReadError
            | Error::ConfigParseError
            | Error::DbError(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self(Error::InvalidPayload(e.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self(Error::InvalidPayload(e.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self(Error::InvalidPayload(e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // the message stays generic, details only go to the log
            error!("request failed: {:?}", self.0);
        }

        let body = json!({
            "success": false,
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
