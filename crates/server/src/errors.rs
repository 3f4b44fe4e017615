use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body shared by every non-2xx response: `{error, details?}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// An HTTP error carrying its status and JSON body. Handlers classify
/// service failures into this before anything reaches the wire.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self { status, error: error.into(), details }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.error, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_omitted_when_absent() {
        let body = ErrorBody { error: "route not found".into(), details: None };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "route not found"}));
    }

    #[test]
    fn details_are_included_when_present() {
        let body = ErrorBody { error: "failed to list products".into(), details: Some("connection reset".into()) };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"], "connection reset");
    }
}
