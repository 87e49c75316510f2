//! Rental API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{created, success, ApiResult, AppJson, SuccessResponse};
use crate::models::{NewRental, OpenRentalRequest, Rental, RentalPatch, RentedCar};
use crate::AppState;

/// GET /api/rentals - List all rentals.
pub async fn list_rentals(State(state): State<AppState>) -> ApiResult<Json<Vec<Rental>>> {
    Ok(Json(state.rentals.list().await?))
}

/// GET /api/rental/:id - Get a single rental.
pub async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Rental>> {
    Ok(Json(state.rentals.get(&id).await?))
}

/// POST /api/rentals - Create a rental record without touching the car.
pub async fn create_rental(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewRental>,
) -> ApiResult<(StatusCode, Json<Rental>)> {
    let rental = state.rentals.create(request).await?;
    Ok(created(rental))
}

/// PATCH /api/rentals/:id - Partially update a rental.
pub async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<RentalPatch>,
) -> ApiResult<Json<SuccessResponse>> {
    state.rentals.update(&id, &patch).await?;
    Ok(success())
}

/// DELETE /api/rentals/:id - Delete a rental.
pub async fn delete_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state.rentals.delete(&id).await?;
    Ok(success())
}

/// POST /api/rentals/create - Open a rental and mark the car unavailable.
pub async fn open_rental(
    State(state): State<AppState>,
    AppJson(request): AppJson<OpenRentalRequest>,
) -> ApiResult<(StatusCode, Json<Rental>)> {
    let rental = state
        .lifecycle
        .open_rental(&request.car_id, &request.customer_id, request.rental_end_date)
        .await?;
    Ok(created(rental))
}

/// POST /api/rentals/:rentalId/return - Close a rental and mark the car available.
pub async fn return_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state.lifecycle.return_rental(&rental_id).await?;
    Ok(success())
}

/// GET /api/rentals/customer/:customerId - A customer's rentals joined with their cars.
pub async fn list_customer_rentals(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> ApiResult<Json<Vec<RentedCar>>> {
    Ok(Json(state.identity.list_customer_rentals(&customer_id).await?))
}
