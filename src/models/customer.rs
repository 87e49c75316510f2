//! Customer model and identity payloads.

use serde::{Deserialize, Serialize};

use super::RecordId;

/// A rental customer. Email is the natural key for sign-in and sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivers_license: Option<String>,
}

/// Request body for creating a customer, also used by sign-in and sign-up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub drivers_license: Option<String>,
}

/// Request body for a partial customer update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub drivers_license: Option<String>,
}

/// Request body for the name + email login probe.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Response body of the identity flows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerIdResponse {
    pub customer_id: RecordId,
}
