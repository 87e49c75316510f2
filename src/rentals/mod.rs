//! Rental lifecycle coordination.
//!
//! Opening a rental marks its car unavailable and returning it marks the car
//! available again. Both writes of each operation share one transaction, so a
//! car is unavailable exactly while an open rental references it, as long as
//! rentals go through this module.

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, Transaction};

use crate::db::{FieldValue, Store};
use crate::errors::AppError;
use crate::models::{Car, RecordId, Rental};

/// Opens and closes rentals while keeping car availability in step.
#[derive(Clone)]
pub struct RentalLifecycle {
    cars: Store<Car>,
    rentals: Store<Rental>,
}

impl RentalLifecycle {
    pub fn new(cars: Store<Car>, rentals: Store<Rental>) -> Self {
        Self { cars, rentals }
    }

    /// Open a rental starting now and mark the car unavailable.
    ///
    /// Fails `NotFound` when the car does not exist and `Conflict` when it is
    /// already rented; nothing is written in either case.
    pub async fn open_rental(
        &self,
        car_id: &str,
        customer_id: &str,
        planned_end_date: Option<String>,
    ) -> Result<Rental, AppError> {
        let car_id = RecordId::parse(car_id)?;
        let customer_id = RecordId::parse(customer_id)?;

        let rental = Rental {
            id: RecordId::generate(),
            car_id,
            customer_id,
            rental_start_date: Utc::now().to_rfc3339(),
            rental_end_date: None,
            planned_end_date,
        };

        let mut tx = self.rentals.begin().await?;

        self.rentals.insert_on(&mut tx, &rental).await?;

        let flipped = self
            .cars
            .update_on(
                &mut tx,
                &car_id,
                vec![("available", FieldValue::Bool(false))],
                vec![("available", FieldValue::Bool(true))],
            )
            .await;

        match flipped {
            Ok(1) => {}
            Ok(_) => {
                let car = self.cars.find_on(&mut tx, &car_id).await?;
                tx.rollback().await?;
                return Err(match car {
                    None => AppError::NotFound("Car not found".to_string()),
                    Some(_) => {
                        tracing::warn!("Rejected rental of car {}: already rented", car_id);
                        AppError::Conflict(format!("Car {} is not available", car_id))
                    }
                });
            }
            Err(e) => {
                return Err(abort(tx, "Failed to update car availability", e).await);
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Opened rental {} of car {} for customer {}",
            rental.id,
            car_id,
            customer_id
        );
        Ok(rental)
    }

    /// Close an open rental now and mark its car available.
    ///
    /// The close is the first statement of the transaction so it takes the
    /// write lock up front instead of upgrading a read snapshot.
    pub async fn return_rental(&self, rental_id: &str) -> Result<Rental, AppError> {
        let rental_id = RecordId::parse(rental_id)?;
        let end_date = Utc::now().to_rfc3339();

        let mut tx = self.rentals.begin().await?;

        let closed = close_open_rental(&mut tx, &rental_id, &end_date).await?;
        if closed == 0 {
            let existing = self.rentals.find_on(&mut tx, &rental_id).await?;
            tx.rollback().await?;
            return Err(match existing {
                None => AppError::NotFound("Rental not found".to_string()),
                // The car may already be out again on a newer rental.
                Some(_) => AppError::Conflict(format!(
                    "Rental {} has already been returned",
                    rental_id
                )),
            });
        }

        let rental = match self.rentals.find_on(&mut tx, &rental_id).await {
            Ok(Some(rental)) => rental,
            Ok(None) => {
                tx.rollback().await?;
                return Err(AppError::NotFound("Rental not found".to_string()));
            }
            Err(e) => return Err(abort(tx, "Failed to read closed rental", e).await),
        };

        let flipped = self
            .cars
            .update_on(
                &mut tx,
                &rental.car_id,
                vec![("available", FieldValue::Bool(true))],
                Vec::new(),
            )
            .await;

        match flipped {
            Ok(0) => tracing::warn!(
                "Car {} of rental {} no longer exists; closing rental anyway",
                rental.car_id,
                rental_id
            ),
            Ok(_) => {}
            Err(e) => return Err(abort(tx, "Failed to update car availability", e).await),
        }

        tx.commit().await?;

        tracing::info!("Returned rental {} of car {}", rental_id, rental.car_id);
        Ok(rental)
    }
}

/// Stamp the end date on a rental that is still open. Returns the rows changed.
async fn close_open_rental(
    conn: &mut SqliteConnection,
    rental_id: &RecordId,
    end_date: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE rentals SET rental_end_date = ? WHERE id = ? AND rental_end_date IS NULL",
    )
    .bind(end_date)
    .bind(rental_id.to_hex())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Roll back after the second write failed and report which state was left behind.
async fn abort(tx: Transaction<'static, Sqlite>, message: &str, cause: AppError) -> AppError {
    let rolled_back = match tx.rollback().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Rollback failed: {:?}", e);
            false
        }
    };
    tracing::error!("{}: {}", message, cause);

    AppError::PartialFailure {
        message: message.to_string(),
        rolled_back,
    }
}
