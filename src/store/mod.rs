pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        review::{NewReview, Review},
        trip::Trip,
    },
};

pub use memory::{MemoryReviewStore, MemoryTripStore};
pub use sqlite::{SqliteReviewStore, SqliteTripStore};

/// Storage contract for trips. "Not found" is absence, never an error.
///
/// Backends must serialize mutations to a single record; in particular
/// `reserve_seats` is a per-record atomic check-and-decrement so that
/// concurrent reservations can never over-allocate.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Trip>, AppError>;

    async fn list(&self) -> Result<Vec<Trip>, AppError>;

    async fn list_active(&self) -> Result<Vec<Trip>, AppError>;

    /// Persists the trip under a freshly assigned id and returns the stored
    /// record. The id carried by the argument is ignored.
    async fn insert(&self, trip: Trip) -> Result<Trip, AppError>;

    /// Overwrites the record with the trip's id. Returns false when no such
    /// record exists.
    async fn update(&self, trip: &Trip) -> Result<bool, AppError>;

    /// Read-modify-write under the store's per-record atomicity: `apply`
    /// runs against the current record and the result is persisted only if
    /// no concurrent mutation slipped in between, so a reservation committed
    /// meanwhile is never overwritten. An `Err` from `apply` aborts with the
    /// record unchanged. `None` when the id is unknown.
    async fn mutate(
        &self,
        id: i64,
        apply: &(dyn for<'a> Fn(&'a mut Trip) -> Result<(), AppError> + Send + Sync),
    ) -> Result<Option<Trip>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Case-insensitive substring match on the destination, restricted to
    /// trips whose active flag equals `active`.
    async fn find_by_destination(
        &self,
        destination: &str,
        active: bool,
    ) -> Result<Vec<Trip>, AppError>;

    /// Case-insensitive equality match on the category.
    async fn find_by_category(&self, category: &str, active: bool)
        -> Result<Vec<Trip>, AppError>;

    /// Inclusive price range.
    async fn find_by_price_range(
        &self,
        min: f64,
        max: f64,
        active: bool,
    ) -> Result<Vec<Trip>, AppError>;

    /// Atomically decrements available seats by `quantity` when the trip
    /// exists, is active, and has enough seats left. Returns whether the
    /// reservation was taken.
    async fn reserve_seats(&self, id: i64, quantity: i64) -> Result<bool, AppError>;
}

/// Storage contract for reviews. Listing preserves insertion order.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, trip_id: i64, review: NewReview) -> Result<Review, AppError>;

    async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<Review>, AppError>;
}
