//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use fleetcap_inventory::InventoryError;

use crate::handlers::ErrorBody;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid verification token")]
    Unauthorized,

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Inventory(e) if e.is_region_error() => StatusCode::BAD_REQUEST,
            Self::Inventory(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), ErrorBody::new(self.to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(InventoryError::MissingRegion).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(InventoryError::UnknownRegion("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(InventoryError::Upstream("boom".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
