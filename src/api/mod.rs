//! REST API module.
//!
//! Route handlers for the admin and customer front-ends. Records are returned
//! bare, mutations answer `{"success": true}` and creations answer 201.

mod cars;
mod customers;
mod rentals;

pub use cars::*;
pub use customers::*;
pub use rentals::*;

use axum::{extract::FromRequest, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;

/// Response type for all handlers.
pub type ApiResult<T> = Result<T, AppError>;

/// Acknowledgement body for updates, deletes and returns.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// JSON body extractor whose rejections use the application error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Create a `{"success": true}` acknowledgement.
pub fn success() -> Json<SuccessResponse> {
    Json(SuccessResponse { success: true })
}

/// Create a 201 response carrying the new resource.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}
