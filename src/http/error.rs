use crate::error::FulfillmentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<crate::model::ProductId>,
}

impl FulfillmentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FulfillmentError::Validation(_) | FulfillmentError::SignatureInvalid(_) => {
                StatusCode::BAD_REQUEST
            }
            FulfillmentError::InsufficientStock { .. }
            | FulfillmentError::InvalidTransition(_)
            | FulfillmentError::Conflict(_) => StatusCode::CONFLICT,
            FulfillmentError::ConcurrencyConflict(_)
            | FulfillmentError::ExternalServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            FulfillmentError::NotFound(_) => StatusCode::NOT_FOUND,
            FulfillmentError::Routing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let product_id = match self {
            FulfillmentError::InsufficientStock { product_id, .. } => Some(*product_id),
            _ => None,
        };
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            product_id,
        }
    }
}

impl IntoResponse for FulfillmentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
