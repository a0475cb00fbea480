use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::errors::MarketError;
use serde_json::json;
use thiserror::Error;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Market(err) => match err {
                MarketError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                MarketError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                MarketError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                MarketError::AlreadyPurchased => (StatusCode::CONFLICT, "ALREADY_PURCHASED"),
                MarketError::Unavailable => (StatusCode::GONE, "UNAVAILABLE"),
                MarketError::InsufficientPayment { .. } => {
                    (StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_PAYMENT")
                }
                MarketError::NothingToWithdraw => (StatusCode::CONFLICT, "NOTHING_TO_WITHDRAW"),
                MarketError::Paused => (StatusCode::SERVICE_UNAVAILABLE, "PAUSED"),
                MarketError::TransferFailed { .. } => (StatusCode::BAD_GATEWAY, "TRANSFER_FAILED"),
                MarketError::Reentrancy => (StatusCode::CONFLICT, "REENTRANCY"),
                MarketError::Overflow => (StatusCode::BAD_REQUEST, "OVERFLOW"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::BookId;

    #[test]
    fn test_market_error_status_mapping() {
        let cases = [
            (MarketError::Forbidden, StatusCode::FORBIDDEN),
            (
                MarketError::NotFound {
                    book_id: BookId::new(3),
                },
                StatusCode::NOT_FOUND,
            ),
            (MarketError::AlreadyPurchased, StatusCode::CONFLICT),
            (MarketError::Unavailable, StatusCode::GONE),
            (
                MarketError::InsufficientPayment {
                    required: 2,
                    provided: 1,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (MarketError::Paused, StatusCode::SERVICE_UNAVAILABLE),
            (
                MarketError::TransferFailed {
                    reason: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = AppError::from(anyhow::anyhow!("db password leaked"));
        assert_eq!(err.status_and_code().1, "INTERNAL_ERROR");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
