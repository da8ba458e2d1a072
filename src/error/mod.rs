//! Unified error handling for the authentication gate

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, GateError>;

/// Configuration-level errors raised by the gate.
///
/// Authentication failures (missing, malformed, expired tokens) are not
/// errors — they travel as [`AuthFailure`](crate::jwt::AuthFailure) and
/// end up as 401 responses through the error hook. `GateError` covers the
/// cases that indicate a broken deployment or configuration.
#[derive(Error, Debug)]
pub enum GateError {
    /// Authentication was attempted over plain HTTP without relaxation.
    /// Never rendered as a 401; this is a deployment bug.
    #[error("Insecure use of middleware over HTTP denied by configuration")]
    InsecureTransport { scheme: String, host: String },

    /// Verification key material could not be loaded.
    #[error("Invalid verification key: {0}")]
    Key(#[source] jsonwebtoken::errors::Error),

    /// A token extraction pattern failed to compile.
    #[error("Invalid token extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match &self {
            GateError::InsecureTransport { scheme, host } => {
                tracing::error!(scheme = %scheme, host = %host, "Insecure transport rejected");
            }
            other => {
                tracing::error!("Authentication gate error: {}", other);
            }
        }

        let body = Json(json!({
            "error": "configuration_error",
            "message": self.to_string(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GateError::InsecureTransport {
            scheme: "http".to_string(),
            host: "example.com".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Insecure use of middleware over HTTP denied by configuration"
        );
    }

    #[test]
    fn test_insecure_transport_renders_500() {
        let err = GateError::InsecureTransport {
            scheme: "http".to_string(),
            host: "example.com".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
