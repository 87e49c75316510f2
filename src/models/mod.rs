//! Data models for the car rental backend.
//!
//! Field names and the `_id` key match what the admin and customer front-ends send and read.

mod car;
mod customer;
mod id;
mod rental;

pub use car::*;
pub use customer::*;
pub use id::*;
pub use rental::*;
