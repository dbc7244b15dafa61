use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

/// Envelope used by the `/api/mobile` routes.
#[derive(Debug, Serialize)]
pub struct MobileResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> MobileResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// [`AppError`] rendered in the mobile envelope shape.
#[derive(Debug)]
pub struct MobileError(pub AppError);

impl From<AppError> for MobileError {
    fn from(error: AppError) -> Self {
        MobileError(error)
    }
}

impl IntoResponse for MobileError {
    fn into_response(self) -> Response {
        let MobileError(error) = self;
        error.log();

        let body = Json(json!({
            "success": false,
            "error": error.message()
        }));

        (error.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mobile_error_shape() {
        let response = MobileError(AppError::BadRequest("Search query or specialization is required".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Search query or specialization is required");
    }

    #[test]
    fn test_mobile_response_ok() {
        let response = MobileResponse::ok("Doctors fetched successfully", json!({ "doctors": [] }));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Doctors fetched successfully");
        assert!(json["data"]["doctors"].is_array());
    }
}
