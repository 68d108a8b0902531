//! Success envelope shared by every endpoint.

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        HttpResponse::build(status).json(self)
    }
}

/// 200 with `data` wrapped in the envelope
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    ApiResponse::new(StatusCode::OK, data, message).into_response()
}

/// 201 with `data` wrapped in the envelope
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    ApiResponse::new(StatusCode::CREATED, data, message).into_response()
}
