//! Customer API endpoints, including the sign-in, sign-up and login flows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{created, success, ApiResult, AppJson, SuccessResponse};
use crate::identity::SignIn;
use crate::models::{Customer, CustomerIdResponse, CustomerPatch, LoginRequest, NewCustomer};
use crate::AppState;

/// GET /api/customers - List all customers.
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.customers.list().await?))
}

/// GET /api/customer/:id - Get a single customer.
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.customers.get(&id).await?))
}

/// POST /api/customers - Create a new customer.
pub async fn create_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.customers.create(request).await?;
    Ok(created(customer))
}

/// PATCH /api/customers/:id - Partially update a customer.
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<CustomerPatch>,
) -> ApiResult<Json<SuccessResponse>> {
    state.customers.update(&id, &patch).await?;
    Ok(success())
}

/// DELETE /api/customers/:id - Delete a customer.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state.customers.delete(&id).await?;
    Ok(success())
}

/// POST /api/customers/signin - Find or create a customer by email.
///
/// Answers 201 when the customer was created, 200 when it already existed.
pub async fn sign_in_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<CustomerIdResponse>)> {
    let outcome = state.identity.sign_in(request).await?;
    let status = match outcome {
        SignIn::Created(_) => StatusCode::CREATED,
        SignIn::Existing(_) => StatusCode::OK,
    };

    Ok((
        status,
        Json(CustomerIdResponse {
            customer_id: outcome.customer_id(),
        }),
    ))
}

/// POST /api/customers/signup - Register a customer with an unused email.
pub async fn sign_up_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<CustomerIdResponse>)> {
    let customer_id = state.identity.sign_up(request).await?;
    Ok(created(CustomerIdResponse { customer_id }))
}

/// POST /api/customers/login - Match a customer by name and email.
///
/// No secret is checked; this identifies a customer, it does not authenticate one.
pub async fn login_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<Json<CustomerIdResponse>> {
    let customer_id = state.identity.login(&request.name, &request.email).await?;
    Ok(Json(CustomerIdResponse { customer_id }))
}
