//! Table mappings for the three collections.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::store::{id_column, FieldValue, Record};
use crate::errors::AppError;
use crate::models::{
    Car, CarPatch, Customer, CustomerPatch, NewCar, NewCustomer, NewRental, RecordId, Rental,
    RentalPatch,
};

impl Record for Car {
    const TABLE: &'static str = "cars";
    const NAME: &'static str = "Car";
    const COLUMNS: &'static [&'static str] = &["make", "model", "year", "type", "available"];

    type Draft = NewCar;
    type Patch = CarPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewCar) -> Result<Self, AppError> {
        Ok(Car {
            id,
            make: draft.make,
            model: draft.model,
            year: draft.year,
            car_type: draft.car_type,
            available: draft.available,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.make.clone()),
            FieldValue::Text(self.model.clone()),
            FieldValue::Integer(self.year.into()),
            FieldValue::Text(self.car_type.clone()),
            FieldValue::Bool(self.available),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Car {
            id: id_column(row, "id")?,
            make: row.try_get("make")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            car_type: row.try_get("type")?,
            available: row.try_get("available")?,
        })
    }

    fn changes(patch: &CarPatch) -> Result<Vec<(&'static str, FieldValue)>, AppError> {
        let mut changes = Vec::new();
        if let Some(make) = &patch.make {
            changes.push(("make", FieldValue::Text(make.clone())));
        }
        if let Some(model) = &patch.model {
            changes.push(("model", FieldValue::Text(model.clone())));
        }
        if let Some(year) = patch.year {
            changes.push(("year", FieldValue::Integer(year.into())));
        }
        if let Some(car_type) = &patch.car_type {
            changes.push(("type", FieldValue::Text(car_type.clone())));
        }
        if let Some(available) = patch.available {
            changes.push(("available", FieldValue::Bool(available)));
        }
        Ok(changes)
    }
}

impl Record for Customer {
    const TABLE: &'static str = "customers";
    const NAME: &'static str = "Customer";
    const COLUMNS: &'static [&'static str] = &["name", "email", "phone_number", "drivers_license"];

    type Draft = NewCustomer;
    type Patch = CustomerPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewCustomer) -> Result<Self, AppError> {
        Ok(Customer {
            id,
            name: draft.name,
            email: draft.email,
            phone_number: draft.phone_number,
            drivers_license: draft.drivers_license,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.name.clone()),
            FieldValue::Text(self.email.clone()),
            FieldValue::Text(self.phone_number.clone()),
            FieldValue::NullableText(self.drivers_license.clone()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Customer {
            id: id_column(row, "id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone_number: row.try_get("phone_number")?,
            drivers_license: row.try_get("drivers_license")?,
        })
    }

    fn changes(patch: &CustomerPatch) -> Result<Vec<(&'static str, FieldValue)>, AppError> {
        let mut changes = Vec::new();
        if let Some(name) = &patch.name {
            changes.push(("name", FieldValue::Text(name.clone())));
        }
        if let Some(email) = &patch.email {
            changes.push(("email", FieldValue::Text(email.clone())));
        }
        if let Some(phone_number) = &patch.phone_number {
            changes.push(("phone_number", FieldValue::Text(phone_number.clone())));
        }
        if let Some(license) = &patch.drivers_license {
            changes.push(("drivers_license", FieldValue::NullableText(Some(license.clone()))));
        }
        Ok(changes)
    }
}

impl Record for Rental {
    const TABLE: &'static str = "rentals";
    const NAME: &'static str = "Rental";
    const COLUMNS: &'static [&'static str] = &[
        "car_id",
        "customer_id",
        "rental_start_date",
        "rental_end_date",
        "planned_end_date",
    ];

    type Draft = NewRental;
    type Patch = RentalPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_draft(id: RecordId, draft: NewRental) -> Result<Self, AppError> {
        Ok(Rental {
            id,
            car_id: RecordId::parse(&draft.car_id)?,
            customer_id: RecordId::parse(&draft.customer_id)?,
            rental_start_date: draft.rental_start_date,
            rental_end_date: draft.rental_end_date,
            planned_end_date: draft.planned_end_date,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Id(self.car_id),
            FieldValue::Id(self.customer_id),
            FieldValue::Text(self.rental_start_date.clone()),
            FieldValue::NullableText(self.rental_end_date.clone()),
            FieldValue::NullableText(self.planned_end_date.clone()),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Rental {
            id: id_column(row, "id")?,
            car_id: id_column(row, "car_id")?,
            customer_id: id_column(row, "customer_id")?,
            rental_start_date: row.try_get("rental_start_date")?,
            rental_end_date: row.try_get("rental_end_date")?,
            planned_end_date: row.try_get("planned_end_date")?,
        })
    }

    fn changes(patch: &RentalPatch) -> Result<Vec<(&'static str, FieldValue)>, AppError> {
        let mut changes = Vec::new();
        if let Some(car_id) = &patch.car_id {
            changes.push(("car_id", FieldValue::Id(RecordId::parse(car_id)?)));
        }
        if let Some(customer_id) = &patch.customer_id {
            changes.push(("customer_id", FieldValue::Id(RecordId::parse(customer_id)?)));
        }
        if let Some(start) = &patch.rental_start_date {
            changes.push(("rental_start_date", FieldValue::Text(start.clone())));
        }
        if let Some(end) = &patch.rental_end_date {
            // An empty end date reopens the rental.
            let end = Some(end.clone()).filter(|s| !s.trim().is_empty());
            changes.push(("rental_end_date", FieldValue::NullableText(end)));
        }
        if let Some(planned) = &patch.planned_end_date {
            changes.push(("planned_end_date", FieldValue::NullableText(Some(planned.clone()))));
        }
        Ok(changes)
    }
}
