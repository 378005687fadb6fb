use std::fmt::{Display, Formatter};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// An error answered by the management API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Service error code, e.g. `ResourceNotFound`
    pub code: String,
    pub message: String,
    pub status_code: u16,
}

/// The `error` object of a Resource Manager error body. Also found on failed long running operations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status_code: status.as_u16(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The resource, or one of its parents, does not exist
    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }

    /// Build from a failed response. Bodies that are not Resource Manager errors fall back to a
    /// message derived from the status code.
    pub fn from_response(body: &str, status: StatusCode) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse { error }) => Self::from_detail(error, status),
            Err(_) => {
                let mut api_error = Self::from(status);
                if !body.trim().is_empty() {
                    api_error.message = format!("{}\n{}", api_error.message, body.trim());
                }
                api_error
            }
        }
    }

    pub fn from_detail(detail: ErrorDetail, status: StatusCode) -> Self {
        let mut message = detail.message;
        for inner in detail.details {
            message.push_str(&format!("\n  {}: {}", inner.code, inner.message));
        }

        Self {
            code: detail.code,
            message,
            status_code: status.as_u16(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})\nMessage: {}", self.status(), self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// Used as a fallback when a response did not contain an error body
impl From<StatusCode> for ApiError {
    fn from(code: StatusCode) -> Self {
        let (error_code, message) = match code {
            StatusCode::BAD_REQUEST => ("BadRequest", "the request was rejected as invalid"),
            StatusCode::UNAUTHORIZED => (
                "AuthenticationFailed",
                "the access token was rejected. Is it still valid?",
            ),
            StatusCode::FORBIDDEN => (
                "AuthorizationFailed",
                "the access token is not allowed to perform this operation",
            ),
            StatusCode::NOT_FOUND => ("ResourceNotFound", "the resource was not found"),
            StatusCode::CONFLICT => (
                "Conflict",
                "the request conflicts with the current state of the resource",
            ),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("request was throttled by the management API");
                (
                    "TooManyRequests",
                    "too many requests were sent, please try again in a little bit",
                )
            }
            StatusCode::SERVICE_UNAVAILABLE => (
                "ServiceUnavailable",
                "the service is temporarily unavailable, please try again in a little bit",
            ),
            code if code.is_server_error() => {
                ("InternalServerError", "the service was unable to handle the request")
            }
            _ => {
                error!(%code, "got an unexpected status code");
                ("UnexpectedStatus", "an unexpected error occurred")
            }
        };

        Self::new(error_code, message, code)
    }
}
