use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use movies_dal::validation::{messages::TITLE_DUPLICATE, ValidationErrors};
use tracing::{debug, error};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Movie title already used: {0}")]
    DuplicateTitle(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<movies_dal::Error> for ApiError {
    fn from(value: movies_dal::Error) -> Self {
        match value {
            movies_dal::Error::RecordNotFound(what) => ApiError::ResourceNotFound(what),
            movies_dal::Error::DuplicateTitle(title) => ApiError::DuplicateTitle(title),
            movies_dal::Error::InvalidOrderByField(field) => {
                ApiError::InvalidQuery(format!("Cannot sort by field {field}"))
            }
            movies_dal::Error::DatabaseError(sqlx::Error::RowNotFound) => {
                ApiError::ResourceNotFound("Record".to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                debug!("Rejected invalid input: {errors}");
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            ApiError::DuplicateTitle(title) => {
                debug!("Duplicate movie title: {title}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationErrors::single("title", TITLE_DUPLICATE)),
                )
                    .into_response()
            }
            ApiError::ResourceNotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
            }
            ApiError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::InternalError(msg) => {
                error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dal_error_status() {
        let cases = [
            (
                movies_dal::Error::RecordNotFound("Movie".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                movies_dal::Error::DuplicateTitle("Movie-Matrix".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                movies_dal::Error::InvalidOrderByField("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                movies_dal::Error::DatabaseError(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_validation_status() {
        let err: ApiError = ValidationErrors::single("genre", "Invalid genre choice.").into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
