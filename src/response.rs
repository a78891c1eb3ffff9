use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Uniform JSON body returned by every route.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Successful envelope without a payload.
pub fn ok(message: impl Into<String>) -> Envelope<()> {
    Envelope {
        success: true,
        message: message.into(),
        data: None,
    }
}

/// Successful envelope carrying `data`.
pub fn ok_with<T: Serialize>(message: impl Into<String>, data: T) -> Envelope<T> {
    Envelope {
        success: true,
        message: message.into(),
        data: Some(data),
    }
}

/// Empty object used as `data` when a lookup found nothing.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
