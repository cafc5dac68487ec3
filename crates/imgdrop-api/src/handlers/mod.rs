pub mod health;
pub mod index;
pub mod upload;

use imgdrop_core::AppError;

use crate::error::HttpAppError;

/// Fallback for any method a route does not serve
pub async fn method_not_allowed() -> HttpAppError {
    HttpAppError(AppError::MethodNotAllowed)
}
