use crate::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use types::ids::Address;

/// Header carrying the wallet address the identity layer authenticated.
pub const CALLER_HEADER: &str = "X-Caller-Address";

/// Caller identity for write and author-only endpoints.
#[derive(Debug, Clone)]
pub struct CallerAddress(pub Address);

impl<S> FromRequestParts<S> for CallerAddress
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing caller address".to_string()))?;
        let raw = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid caller header string".into()))?;
        let address = Address::parse(raw)
            .map_err(|e| AppError::Unauthorized(format!("Invalid caller address: {e}")))?;
        Ok(CallerAddress(address))
    }
}

/// Parse an address taken from a path segment or request body.
pub fn parse_address(raw: &str) -> Result<Address, AppError> {
    Address::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid address: {e}")))
}
