use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Error contract shared by every route: the message ends up verbatim in the
/// `details` field of the JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid ID: id must be an integer")]
    InvalidId,

    #[error("Invalid ID: id does not exist")]
    NotFound,

    #[error("Invalid data")]
    InvalidData,

    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidData => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::MissingFields(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "details": details });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_message_matches_contract() {
        assert_eq!(
            ApiError::InvalidId.to_string(),
            "Invalid ID: id must be an integer"
        );
        assert_eq!(
            ApiError::NotFound.to_string(),
            "Invalid ID: id does not exist"
        );
    }

    #[test]
    fn response_status_mapping() {
        assert_eq!(
            ApiError::InvalidId.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidData.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
