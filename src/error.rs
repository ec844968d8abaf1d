use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub rule: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, rule: &'static str) -> Self {
        Self { field, rule }
    }
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("field {} is {}", f.field, f.rule))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors reported to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input data: {0}")]
    Malformed(String),
    #[error("validation error: {}", describe(.0))]
    Validation(Vec<FieldError>),
    #[error("a block is already being mined on this node")]
    MiningInProgress,
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "no_fields")]
    fields: &'a [FieldError],
}

fn no_fields(fields: &&[FieldError]) -> bool {
    fields.is_empty()
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MiningInProgress | ApiError::Chain(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let fields = match self {
            ApiError::Validation(fields) => fields.as_slice(),
            _ => &[],
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            fields,
        })
    }
}

/// Failures of composed chain operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("chain tip moved while mining (expected {expected}, found {found})")]
    StaleTip { expected: String, found: String },
    #[error("pending bets changed while mining")]
    StalePendingPool,
}

/// Failures talking to a peer node. Logged, never returned to clients.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("failed to initialize HTTP client: {0}")]
    ClientInit(reqwest::Error),
    #[error("request to {0} failed: {1}")]
    Request(String, reqwest::Error),
    #[error("{0} answered with HTTP status {1}")]
    Status(String, reqwest::StatusCode),
    #[error("could not decode response from {0}: {1}")]
    Decode(String, reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_status_and_message() {
        let err = ApiError::Validation(vec![
            FieldError::new("playername", "required"),
            FieldError::new("teamonescore", "min"),
        ]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "validation error: field playername is required; field teamonescore is min"
        );
    }

    #[test]
    fn malformed_is_unprocessable() {
        let err = ApiError::Malformed("expected value".into());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn stale_tip_is_conflict() {
        let err = ApiError::from(ChainError::StaleTip {
            expected: "a".into(),
            found: "b".into(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
