use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cardprice_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::RunInProgress(_) => StatusCode::CONFLICT,
                CoreError::Validation(_) | CoreError::InvalidConfigValue(_) => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let conflict: ApiError = CoreError::RunInProgress("run-1".to_string()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing: ApiError = CoreError::MissingConfigKey("CP_EBAY_APP_ID".to_string()).into();
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let not_found: ApiError =
            CoreError::Database(DatabaseError::NotFound("item".to_string())).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            ApiError::BadRequest("limit".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
