use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        review::{NewReview, Review},
        trip::Trip,
    },
    store::{ReviewStore, TripStore},
};

/// In-memory trip backend: a lock-guarded map plus a monotonically
/// incremented id counter. Every operation takes the lock for its whole
/// read-modify-write, which is what makes `reserve_seats` safe against
/// concurrent callers. State is lost on shutdown; meant for demos and tests.
#[derive(Clone, Default)]
pub struct MemoryTripStore {
    inner: Arc<Mutex<TripMap>>,
}

#[derive(Default)]
struct TripMap {
    trips: HashMap<i64, Trip>,
    next_id: i64,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut trips: Vec<Trip>) -> Vec<Trip> {
        trips.sort_by_key(|trip| trip.id);
        trips
    }

    fn filtered<F>(&self, predicate: F) -> Vec<Trip>
    where
        F: Fn(&Trip) -> bool,
    {
        let inner = self.inner.lock().expect("trip store lock poisoned");
        Self::sorted(inner.trips.values().filter(|t| predicate(t)).cloned().collect())
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn get(&self, id: i64) -> Result<Option<Trip>, AppError> {
        let inner = self.inner.lock().expect("trip store lock poisoned");
        Ok(inner.trips.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.filtered(|_| true))
    }

    async fn list_active(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.filtered(|trip| trip.active))
    }

    async fn insert(&self, mut trip: Trip) -> Result<Trip, AppError> {
        let mut inner = self.inner.lock().expect("trip store lock poisoned");
        inner.next_id += 1;
        trip.id = inner.next_id;
        inner.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn update(&self, trip: &Trip) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().expect("trip store lock poisoned");
        if !inner.trips.contains_key(&trip.id) {
            return Ok(false);
        }
        inner.trips.insert(trip.id, trip.clone());
        Ok(true)
    }

    async fn mutate(
        &self,
        id: i64,
        apply: &(dyn for<'a> Fn(&'a mut Trip) -> Result<(), AppError> + Send + Sync),
    ) -> Result<Option<Trip>, AppError> {
        let mut inner = self.inner.lock().expect("trip store lock poisoned");
        let Some(trip) = inner.trips.get_mut(&id) else {
            return Ok(None);
        };
        let mut updated = trip.clone();
        apply(&mut updated)?;
        *trip = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().expect("trip store lock poisoned");
        Ok(inner.trips.remove(&id).is_some())
    }

    async fn find_by_destination(
        &self,
        destination: &str,
        active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        let needle = destination.to_lowercase();
        Ok(self.filtered(|trip| {
            trip.active == active && trip.destination.to_lowercase().contains(&needle)
        }))
    }

    async fn find_by_category(
        &self,
        category: &str,
        active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        Ok(self.filtered(|trip| {
            trip.active == active && trip.category.eq_ignore_ascii_case(category)
        }))
    }

    async fn find_by_price_range(
        &self,
        min: f64,
        max: f64,
        active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        Ok(self.filtered(|trip| trip.active == active && trip.price >= min && trip.price <= max))
    }

    async fn reserve_seats(&self, id: i64, quantity: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().expect("trip store lock poisoned");
        let Some(trip) = inner.trips.get_mut(&id) else {
            return Ok(false);
        };
        if !trip.active || trip.available_seats < quantity {
            return Ok(false);
        }
        trip.available_seats -= quantity;
        Ok(true)
    }
}

/// In-memory review backend, insertion-ordered.
#[derive(Clone, Default)]
pub struct MemoryReviewStore {
    inner: Arc<Mutex<ReviewList>>,
}

#[derive(Default)]
struct ReviewList {
    reviews: Vec<Review>,
    next_id: i64,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn insert(&self, trip_id: i64, review: NewReview) -> Result<Review, AppError> {
        let mut inner = self.inner.lock().expect("review store lock poisoned");
        inner.next_id += 1;
        let review = Review {
            id: inner.next_id,
            trip_id,
            rating: review.rating,
            comment: review.comment,
        };
        inner.reviews.push(review.clone());
        Ok(review)
    }

    async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<Review>, AppError> {
        let inner = self.inner.lock().expect("review store lock poisoned");
        Ok(inner
            .reviews
            .iter()
            .filter(|review| review.trip_id == trip_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip(destination: &str, category: &str, price: f64, seats: i64) -> Trip {
        Trip {
            id: 0,
            destination: destination.to_string(),
            departure_date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
            price,
            description: format!("ten days in {destination}"),
            available_seats: seats,
            category: category.to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn insert_assigns_monotonic_ids() {
        let store = MemoryTripStore::new();
        let first = store.insert(trip("Paris", "ECONOMY", 100.0, 5)).await.unwrap();
        let second = store.insert(trip("Rome", "ECONOMY", 200.0, 5)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn destination_match_is_case_insensitive_substring() {
        let store = MemoryTripStore::new();
        store.insert(trip("Paris", "ECONOMY", 100.0, 5)).await.unwrap();
        store.insert(trip("Porto", "ECONOMY", 100.0, 5)).await.unwrap();

        let hits = store.find_by_destination("ARI", true).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].destination, "Paris");
    }

    #[tokio::test]
    async fn filters_honor_the_active_flag_value() {
        let store = MemoryTripStore::new();
        let mut inactive = trip("Paris", "BUSINESS", 100.0, 5);
        inactive.active = false;
        store.insert(inactive).await.unwrap();
        store.insert(trip("Paris", "BUSINESS", 100.0, 5)).await.unwrap();

        assert_eq!(store.find_by_category("business", true).await.unwrap().len(), 1);
        assert_eq!(store.find_by_category("business", false).await.unwrap().len(), 1);
        assert_eq!(store.list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn price_range_is_inclusive() {
        let store = MemoryTripStore::new();
        store.insert(trip("Paris", "ECONOMY", 100.0, 5)).await.unwrap();
        store.insert(trip("Rome", "ECONOMY", 250.0, 5)).await.unwrap();

        let hits = store.find_by_price_range(100.0, 250.0, true).await.unwrap();
        assert_eq!(hits.len(), 2);
        let hits = store.find_by_price_range(100.01, 249.99, true).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn reserve_seats_checks_capacity_and_active_flag() {
        let store = MemoryTripStore::new();
        let stored = store.insert(trip("Paris", "ECONOMY", 100.0, 3)).await.unwrap();

        assert!(store.reserve_seats(stored.id, 2).await.unwrap());
        assert!(!store.reserve_seats(stored.id, 2).await.unwrap());
        assert_eq!(store.get(stored.id).await.unwrap().unwrap().available_seats, 1);

        let mut deactivated = store.get(stored.id).await.unwrap().unwrap();
        deactivated.active = false;
        store.update(&deactivated).await.unwrap();
        assert!(!store.reserve_seats(stored.id, 1).await.unwrap());
    }

    #[tokio::test]
    async fn mutations_interleaved_with_reservations_lose_no_writes() {
        let store = MemoryTripStore::new();
        let stored = store.insert(trip("Paris", "ECONOMY", 100.0, 40)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            let id = stored.id;
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    assert!(store.reserve_seats(id, 2).await.unwrap());
                } else {
                    store
                        .mutate(id, &|t| {
                            t.description.push('!');
                            Ok(())
                        })
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.get(stored.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 30);
        assert_eq!(stored.description.matches('!').count(), 5);
    }

    #[tokio::test]
    async fn mutate_rejection_leaves_the_record_unchanged() {
        let store = MemoryTripStore::new();
        let stored = store.insert(trip("Paris", "ECONOMY", 100.0, 5)).await.unwrap();

        let err = store
            .mutate(stored.id, &|t| {
                t.available_seats = -1;
                Err(AppError::bad_request("available seats cannot be negative"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.get(stored.id).await.unwrap().unwrap(), stored);

        assert!(store.mutate(999, &|_| Ok(())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_then_get_is_absent() {
        let store = MemoryTripStore::new();
        let stored = store.insert(trip("Paris", "ECONOMY", 100.0, 3)).await.unwrap();
        assert!(store.delete(stored.id).await.unwrap());
        assert!(!store.delete(stored.id).await.unwrap());
        assert!(store.get(stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reviews_keep_insertion_order() {
        let store = MemoryReviewStore::new();
        store
            .insert(1, NewReview { rating: 5, comment: "great".into() })
            .await
            .unwrap();
        store
            .insert(1, NewReview { rating: 3, comment: "okay".into() })
            .await
            .unwrap();
        store
            .insert(2, NewReview { rating: 1, comment: "meh".into() })
            .await
            .unwrap();

        let reviews = store.list_by_trip(1).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].comment, "great");
        assert_eq!(reviews[1].comment, "okay");
    }
}
