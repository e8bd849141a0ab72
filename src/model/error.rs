use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;

/// Public, localized messages returned in error bodies.
pub mod messages {
    pub const LIST_FAILED: &str = "שגיאה בטעינת השוברים";
    pub const CREATE_FAILED: &str = "שגיאה ביצירת השובר";
    pub const UPDATE_FAILED: &str = "שגיאה בעדכון השובר";
    pub const DELETE_FAILED: &str = "שגיאה במחיקת השובר";
    pub const DELETE_ALL_FAILED: &str = "שגיאה במחיקת כל השוברים";
    pub const IMPORT_FAILED: &str = "שגיאה בייבוא השוברים";
    pub const VOUCHER_NOT_FOUND: &str = "שובר לא נמצא";
    pub const BAD_INPUT: &str = "נתונים לא תקינים";
}

#[derive(Debug)]
pub enum StoreError {
    VoucherNotFound(i64),
    Sqlite(rusqlite::Error),
    ConnectionPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VoucherNotFound(id) => write!(f, "voucher {} not found", id),
            Self::Sqlite(e) => write!(f, "rusqlite error: {}", e),
            Self::ConnectionPoisoned => write!(f, "database connection lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> StoreError {
        StoreError::Sqlite(value)
    }
}

impl StoreError {
    /// Maps a store failure onto the public error of the operation that hit it.
    /// Infrastructure detail is logged here and never leaves the process.
    pub fn into_api_error(self, public_reason: &str) -> ApiError {
        match self {
            Self::VoucherNotFound(id) => ApiError::VoucherNotFound(id),
            other => {
                error!("{}", other);
                ApiError::InternalError(String::from(public_reason))
            }
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    InternalError(String),
    InputFailedValidation(String),
    VoucherNotFound(i64),
    PathNotFound(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn bad_input() -> ApiError {
        ApiError::InputFailedValidation(String::from(messages::BAD_INPUT))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::InternalError(public_reason) => {
                warn!(
                    "INTERNAL_SERVER_ERROR response with public_reason={}",
                    public_reason
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: public_reason,
                    }),
                )
            }
            Self::InputFailedValidation(public_reason) => {
                warn!("BAD_REQUEST response with public_reason={}", public_reason);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: public_reason,
                    }),
                )
            }
            Self::VoucherNotFound(id) => {
                warn!("NOT_FOUND response for voucher {}", id);
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: String::from(messages::VOUCHER_NOT_FOUND),
                    }),
                )
            }
            Self::PathNotFound(path) => {
                let public_reason = format!("הנתיב '{}' לא נמצא", path);
                warn!("NOT_FOUND response with public_reason={}", public_reason);
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: public_reason,
                    }),
                )
            }
        }
        .into_response()
    }
}
