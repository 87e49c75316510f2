//! Car model.

use serde::{Deserialize, Serialize};

use super::RecordId;

/// A car in the rental fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub car_type: String,
    /// False while an open rental references this car
    pub available: bool,
}

/// Request body for creating a new car.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCar {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default, rename = "type")]
    pub car_type: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Request body for a partial car update. Absent or null fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarPatch {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, rename = "type")]
    pub car_type: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}
