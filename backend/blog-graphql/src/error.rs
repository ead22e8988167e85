use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use async_graphql::ErrorExtensions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// One violated field, reported back to the client as `{message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid input.")]
    InvalidInput(Vec<FieldError>),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_authenticated() -> Self {
        ApiError::Unauthenticated("Not authenticated.".to_string())
    }

    /// Machine-readable status carried on every failure
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 422,
            ApiError::Unauthenticated(_) | ApiError::Unauthorized(_) => 401,
            ApiError::Conflict(_) => 409,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            ApiError::InvalidInput(errors) => Some(errors),
            _ => None,
        }
    }

    /// Boundary shape `{message, status, data}`
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            // Don't leak internal details
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorResponse {
            message,
            status: self.status(),
            data: self.field_errors().map(<[FieldError]>::to_vec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<FieldError>>,
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let response = self.to_response();

        async_graphql::Error::new(response.message).extend_with(|_, e| {
            e.set("status", response.status);
            if let Some(data) = response.data {
                let data = serde_json::to_value(data)
                    .ok()
                    .and_then(|json| async_graphql::Value::from_json(json).ok());
                if let Some(data) = data {
                    e.set("data", data);
                }
            }
        })
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response())
    }
}

// Conversions from lower layers

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => ApiError::Conflict(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Backend(msg) => {
                tracing::error!(error = %msg, "Store error");
                ApiError::Internal(msg)
            }
        }
    }
}

impl From<crypto_core::PasswordError> for ApiError {
    fn from(err: crypto_core::PasswordError) -> Self {
        tracing::error!(error = %err, "Password hashing error");
        ApiError::Internal(err.to_string())
    }
}

impl From<crypto_core::TokenError> for ApiError {
    fn from(err: crypto_core::TokenError) -> Self {
        tracing::error!(error = %err, "Token error");
        ApiError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
