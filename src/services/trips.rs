use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::{
    error::AppError,
    models::trip::{NewTrip, Trip, TripPatch},
    store::TripStore,
};

/// Business rules over a [`TripStore`]. All validation lives here so both
/// backends behave identically, including re-validation after a patch.
#[derive(Clone)]
pub struct TripService {
    store: Arc<dyn TripStore>,
}

impl TripService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self { store }
    }

    /// Filter precedence is mutually exclusive by design: destination wins
    /// over category, category over the price range, and the price range
    /// only applies when both bounds are present. Without any filter the
    /// `only_active` flag decides between active trips and everything.
    /// Filters pass `only_active` through as the required active-flag value.
    pub async fn search(
        &self,
        destination: Option<&str>,
        category: Option<&str>,
        price_min: Option<f64>,
        price_max: Option<f64>,
        only_active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        if let Some(destination) = destination.filter(|d| !d.is_empty()) {
            self.store.find_by_destination(destination, only_active).await
        } else if let Some(category) = category.filter(|c| !c.is_empty()) {
            self.store.find_by_category(category, only_active).await
        } else if let (Some(min), Some(max)) = (price_min, price_max) {
            self.store.find_by_price_range(min, max, only_active).await
        } else if only_active {
            self.store.list_active().await
        } else {
            self.store.list().await
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Trip>, AppError> {
        self.store.get(id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Trip>, AppError> {
        self.store.list().await
    }

    pub async fn list_active(&self) -> Result<Vec<Trip>, AppError> {
        self.store.list_active().await
    }

    /// New trips always start active, whatever the payload says.
    pub async fn create(&self, new: NewTrip) -> Result<Trip, AppError> {
        let mut trip = new.into_trip(0);
        trip.active = true;
        validate_trip(&trip)?;
        let trip = self.store.insert(trip).await?;
        debug!(trip_id = trip.id, destination = %trip.destination, "trip created");
        Ok(trip)
    }

    /// Full replace. Validates before any mutation; the path id always wins
    /// over whatever the payload carries.
    pub async fn replace(&self, id: i64, new: NewTrip) -> Result<Option<Trip>, AppError> {
        if self.store.get(id).await?.is_none() {
            return Ok(None);
        }
        let trip = new.into_trip(id);
        validate_trip(&trip)?;
        if !self.store.update(&trip).await? {
            return Ok(None);
        }
        Ok(Some(trip))
    }

    /// Applies the supplied fields and re-validates the resulting record
    /// before persisting, so a patch can never store an invalid trip. Runs
    /// under the store's per-record atomicity: a reservation committed
    /// between read and write-back is never overwritten.
    pub async fn patch(&self, id: i64, patch: TripPatch) -> Result<Option<Trip>, AppError> {
        self.store
            .mutate(id, &move |trip| {
                patch.apply(trip);
                validate_trip(trip)
            })
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.store.delete(id).await
    }

    /// Soft delete. Idempotent in effect; there is no reactivation.
    pub async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let deactivated = self
            .store
            .mutate(id, &|trip| {
                trip.active = false;
                Ok(())
            })
            .await?;
        if deactivated.is_some() {
            debug!(trip_id = id, "trip deactivated");
        }
        Ok(deactivated.is_some())
    }

    /// Delegates to the store's atomic check-and-decrement. Quantity
    /// positivity is enforced at the route boundary.
    pub async fn reserve_seats(&self, id: i64, quantity: i64) -> Result<bool, AppError> {
        let reserved = self.store.reserve_seats(id, quantity).await?;
        if reserved {
            debug!(trip_id = id, quantity, "seats reserved");
        }
        Ok(reserved)
    }
}

fn validate_trip(trip: &Trip) -> Result<(), AppError> {
    if trip.destination.trim().is_empty() {
        return Err(AppError::bad_request("destination must not be empty"));
    }
    if trip.description.trim().is_empty() {
        return Err(AppError::bad_request("description must not be empty"));
    }
    if trip.price <= 0.0 {
        return Err(AppError::bad_request("price must be positive"));
    }
    if trip.departure_date > trip.return_date {
        return Err(AppError::bad_request(
            "departure date cannot be after the return date",
        ));
    }
    if trip.departure_date < Utc::now().date_naive() {
        return Err(AppError::bad_request("departure date cannot be in the past"));
    }
    if trip.available_seats < 0 {
        return Err(AppError::bad_request("available seats cannot be negative"));
    }
    Ok(())
}
