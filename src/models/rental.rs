//! Rental model and the joined rented-car view.

use serde::{Deserialize, Serialize};

use super::{Car, RecordId};

/// A rental of one car by one customer.
///
/// A rental without an end date is open: the car is out with the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub car_id: RecordId,
    pub customer_id: RecordId,
    pub rental_start_date: String,
    #[serde(default, with = "end_date")]
    pub rental_end_date: Option<String>,
    /// Return date the customer announced when opening the rental
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<String>,
}

impl Rental {
    pub fn is_open(&self) -> bool {
        self.rental_end_date.is_none()
    }
}

/// Request body for creating a rental record directly.
///
/// Ids stay raw strings and are parsed when the record is built.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRental {
    #[serde(default)]
    pub car_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub rental_start_date: String,
    #[serde(default, with = "end_date")]
    pub rental_end_date: Option<String>,
    #[serde(default)]
    pub planned_end_date: Option<String>,
}

/// Request body for a partial rental update.
///
/// An empty `rental_end_date` reopens the rental.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RentalPatch {
    #[serde(default)]
    pub car_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub rental_start_date: Option<String>,
    #[serde(default)]
    pub rental_end_date: Option<String>,
    #[serde(default)]
    pub planned_end_date: Option<String>,
}

/// Request body for opening a rental through the lifecycle endpoint.
///
/// Ids stay raw strings so malformed ones surface as `InvalidId`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRentalRequest {
    #[serde(default)]
    pub car_id: String,
    #[serde(default)]
    pub customer_id: String,
    /// Optional planned return date; never closes the rental
    #[serde(default, alias = "planned_end_date", with = "end_date")]
    pub rental_end_date: Option<String>,
}

/// A customer's rental joined with the car it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentedCar {
    pub rental_id: RecordId,
    pub car_id: RecordId,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub car_type: String,
    pub rental_start_date: String,
    #[serde(with = "end_date")]
    pub rental_end_date: Option<String>,
}

impl RentedCar {
    pub fn new(rental: &Rental, car: &Car) -> Self {
        Self {
            rental_id: rental.id,
            car_id: car.id,
            make: car.make.clone(),
            model: car.model.clone(),
            year: car.year,
            car_type: car.car_type.clone(),
            rental_start_date: rental.rental_start_date.clone(),
            rental_end_date: rental.rental_end_date.clone(),
        }
    }
}

/// Wire form of an end date: `""` means open, as the front-ends expect.
mod end_date {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}
