//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use unibridge_domain::error::BridgeError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps bridge failures and request mistakes to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Bridge(BridgeError),
    /// The circuit exists but is not exposed to consumers.
    NotExposed(String),
    BadRequest(&'static str),
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self::Bridge(err)
    }
}

fn describe(err: &BridgeError) -> String {
    match std::error::Error::source(err) {
        Some(source) => source.to_string(),
        None => err.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotExposed(alias) => (StatusCode::NOT_FOUND, format!("circuit {alias} not found")),
            Self::BadRequest(reason) => (StatusCode::BAD_REQUEST, (*reason).to_string()),
            Self::Bridge(err @ BridgeError::NotFound(_)) => (StatusCode::NOT_FOUND, describe(err)),
            Self::Bridge(err @ (BridgeError::Unsupported(_) | BridgeError::Rule(_))) => {
                (StatusCode::UNPROCESSABLE_ENTITY, describe(err))
            }
            Self::Bridge(err @ BridgeError::Connectivity(_)) => {
                tracing::warn!(error = %describe(err), "controller unreachable");
                (StatusCode::SERVICE_UNAVAILABLE, describe(err))
            }
            Self::Bridge(BridgeError::Stopped) => {
                tracing::error!("bridge stopped");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "bridge stopped".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unibridge_domain::error::{ConnectivityError, NotFoundError};

    #[test]
    fn should_map_not_found_to_404() {
        let err = ApiError::from(BridgeError::from(NotFoundError {
            alias: "ghost".to_string(),
        }));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_map_connectivity_to_503() {
        let err = ApiError::from(BridgeError::from(ConnectivityError::NotConnected));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn should_map_bad_request_to_400() {
        let err = ApiError::BadRequest("nothing to set");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
