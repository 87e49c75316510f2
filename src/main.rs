//! Car Rental Backend
//!
//! REST backend for cars, customers and rentals with SQLite persistence.

mod api;
mod config;
mod db;
mod errors;
mod identity;
mod models;
mod rentals;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Store;
use errors::AppError;
use identity::CustomerIdentity;
use models::{Car, Customer, Rental};
use rentals::RentalLifecycle;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cars: Store<Car>,
    pub customers: Store<Customer>,
    pub rentals: Store<Rental>,
    pub lifecycle: RentalLifecycle,
    pub identity: CustomerIdentity,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire every component to the same pool.
    pub fn new(pool: sqlx::SqlitePool, config: Config) -> Self {
        let cars = Store::new(pool.clone());
        let customers = Store::new(pool.clone());
        let rentals = Store::new(pool);

        Self {
            lifecycle: RentalLifecycle::new(cars.clone(), rentals.clone()),
            identity: CustomerIdentity::new(customers.clone(), rentals.clone(), cars.clone()),
            cars,
            customers,
            rentals,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Car Rental Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Allowed origin: {}", config.cors_origin);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;

    let state = AppState::new(pool, config.clone());
    let app = create_router(state)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Result<Router, AppError> {
    let origin = HeaderValue::from_str(&state.config.cors_origin).map_err(|e| {
        AppError::Config(format!(
            "Invalid CORS origin {}: {}",
            state.config.cors_origin, e
        ))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    let api_routes = Router::new()
        // Cars
        .route("/car/{id}", get(api::get_car))
        .route("/cars", get(api::list_cars).post(api::create_car))
        .route("/cars/{id}", patch(api::update_car).delete(api::delete_car))
        // Customers
        .route("/customer/{id}", get(api::get_customer))
        .route(
            "/customers",
            get(api::list_customers).post(api::create_customer),
        )
        .route(
            "/customers/{id}",
            patch(api::update_customer).delete(api::delete_customer),
        )
        .route("/customers/signin", post(api::sign_in_customer))
        .route("/customers/signup", post(api::sign_up_customer))
        .route("/customers/login", post(api::login_customer))
        // Rentals
        .route("/rental/{id}", get(api::get_rental))
        .route("/rentals", get(api::list_rentals).post(api::create_rental))
        .route(
            "/rentals/{id}",
            patch(api::update_rental).delete(api::delete_rental),
        )
        .route("/rentals/create", post(api::open_rental))
        .route("/rentals/{id}/return", post(api::return_rental))
        .route(
            "/rentals/customer/{customer_id}",
            get(api::list_customer_rentals),
        );

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Ok(Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
