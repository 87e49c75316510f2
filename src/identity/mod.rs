//! Customer identity resolution.
//!
//! Customers are identified by email. `login` only checks that a customer with
//! the given name and email exists: there is no secret involved, so it is an
//! identity probe and must not be treated as authentication.

use crate::db::{FieldValue, Store};
use crate::errors::AppError;
use crate::models::{Car, Customer, NewCustomer, RecordId, Rental, RentedCar};

/// Outcome of a find-or-create sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignIn {
    Existing(RecordId),
    Created(RecordId),
}

impl SignIn {
    pub fn customer_id(&self) -> RecordId {
        match self {
            SignIn::Existing(id) | SignIn::Created(id) => *id,
        }
    }
}

/// Resolves customers by email and assembles their rental history.
#[derive(Clone)]
pub struct CustomerIdentity {
    customers: Store<Customer>,
    rentals: Store<Rental>,
    cars: Store<Car>,
}

impl CustomerIdentity {
    pub fn new(customers: Store<Customer>, rentals: Store<Rental>, cars: Store<Car>) -> Self {
        Self {
            customers,
            rentals,
            cars,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        self.customers
            .find_one_by(vec![("email", FieldValue::Text(email.to_string()))])
            .await
    }

    /// Find the customer with this email, creating one if none exists.
    pub async fn sign_in(&self, customer: NewCustomer) -> Result<SignIn, AppError> {
        if let Some(existing) = self.find_by_email(&customer.email).await? {
            return Ok(SignIn::Existing(existing.id));
        }

        let created = self.customers.create(customer).await?;
        tracing::info!("Created customer {} on sign-in", created.id);
        Ok(SignIn::Created(created.id))
    }

    /// Register a new customer, failing `AlreadyExists` if the email is taken.
    pub async fn sign_up(&self, customer: NewCustomer) -> Result<RecordId, AppError> {
        if self.find_by_email(&customer.email).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Customer with this email already exists".to_string(),
            ));
        }

        let created = self.customers.create(customer).await?;
        tracing::info!("Signed up customer {}", created.id);
        Ok(created.id)
    }

    /// Return the id of the customer matching both name and email exactly.
    pub async fn login(&self, name: &str, email: &str) -> Result<RecordId, AppError> {
        self.customers
            .find_one_by(vec![
                ("name", FieldValue::Text(name.to_string())),
                ("email", FieldValue::Text(email.to_string())),
            ])
            .await?
            .map(|customer| customer.id)
            .ok_or(AppError::InvalidCredentials)
    }

    /// All rentals of a customer joined with their cars.
    ///
    /// Rentals whose car no longer exists are logged and left out.
    pub async fn list_customer_rentals(&self, customer_id: &str) -> Result<Vec<RentedCar>, AppError> {
        let customer_id = RecordId::parse(customer_id)?;

        let rentals = self
            .rentals
            .find_by(vec![("customer_id", FieldValue::Id(customer_id))])
            .await?;

        let mut rented = Vec::with_capacity(rentals.len());
        for rental in &rentals {
            match self.cars.find(&rental.car_id).await? {
                Some(car) => rented.push(RentedCar::new(rental, &car)),
                None => tracing::warn!(
                    "Skipping rental {}: car {} not found",
                    rental.id,
                    rental.car_id
                ),
            }
        }

        Ok(rented)
    }
}
