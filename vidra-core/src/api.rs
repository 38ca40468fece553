//! Uniform response envelopes for the HTTP surface.

use serde::Serialize;

/// Success envelope: `{statusCode, data, message, success}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            data: Some(data),
            message: message.into(),
            success: true,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: 201,
            data: Some(data),
            message: message.into(),
            success: true,
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            data: None,
            message: message.into(),
            success: true,
        }
    }
}

/// Error envelope: `{statusCode, message, success: false, errors}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

impl ApiErrorBody {
    pub fn new(status_code: u16, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            success: false,
            errors,
        }
    }
}
