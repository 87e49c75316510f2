//! Car API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{created, success, ApiResult, AppJson, SuccessResponse};
use crate::models::{Car, CarPatch, NewCar};
use crate::AppState;

/// GET /api/cars - List all cars.
pub async fn list_cars(State(state): State<AppState>) -> ApiResult<Json<Vec<Car>>> {
    Ok(Json(state.cars.list().await?))
}

/// GET /api/car/:id - Get a single car.
pub async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Car>> {
    Ok(Json(state.cars.get(&id).await?))
}

/// POST /api/cars - Create a new car.
pub async fn create_car(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewCar>,
) -> ApiResult<(StatusCode, Json<Car>)> {
    let car = state.cars.create(request).await?;
    Ok(created(car))
}

/// PATCH /api/cars/:id - Partially update a car.
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<CarPatch>,
) -> ApiResult<Json<SuccessResponse>> {
    state.cars.update(&id, &patch).await?;
    Ok(success())
}

/// DELETE /api/cars/:id - Delete a car.
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state.cars.delete(&id).await?;
    Ok(success())
}
