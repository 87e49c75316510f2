//! Configuration module for the car rental backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

const DEFAULT_PORT: &str = "5000";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Browser origin allowed by CORS (the rental front-ends)
    pub cors_origin: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("RENTAL_DB_PATH")
            .unwrap_or_else(|_| "./data/car_rental.sqlite".to_string())
            .into();

        let bind_addr = match env::var("RENTAL_BIND_ADDR") {
            Ok(addr) => addr,
            Err(_) => {
                let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
                format!("0.0.0.0:{}", port)
            }
        };
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address {}: {}", bind_addr, e)))?;

        let cors_origin = env::var("RENTAL_CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let log_level = env::var("RENTAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            db_path,
            bind_addr,
            cors_origin,
            log_level,
        })
    }
}
