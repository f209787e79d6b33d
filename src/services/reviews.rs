use std::sync::Arc;

use tracing::debug;

use crate::{
    error::AppError,
    models::review::{NewReview, Review},
    store::{ReviewStore, TripStore},
};

/// Reviews only exist through their owning trip, so the service holds the
/// trip store as well for existence checks.
#[derive(Clone)]
pub struct ReviewService {
    trips: Arc<dyn TripStore>,
    store: Arc<dyn ReviewStore>,
}

impl ReviewService {
    pub fn new(trips: Arc<dyn TripStore>, store: Arc<dyn ReviewStore>) -> Self {
        Self { trips, store }
    }

    pub async fn add(&self, trip_id: i64, review: NewReview) -> Result<Review, AppError> {
        if !(1..=5).contains(&review.rating) {
            return Err(AppError::bad_request("rating must be between 1 and 5"));
        }
        if review.comment.trim().is_empty() {
            return Err(AppError::bad_request("comment must not be empty"));
        }
        if self.trips.get(trip_id).await?.is_none() {
            return Err(AppError::bad_request(format!(
                "trip {trip_id} does not exist"
            )));
        }

        let review = self.store.insert(trip_id, review).await?;
        debug!(trip_id, review_id = review.id, "review added");
        Ok(review)
    }

    /// Referencing a nonexistent trip is a caller error, mirroring `add`.
    pub async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<Review>, AppError> {
        if self.trips.get(trip_id).await?.is_none() {
            return Err(AppError::bad_request(format!(
                "trip {trip_id} does not exist"
            )));
        }
        self.store.list_by_trip(trip_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::trip::NewTrip,
        services::trips::TripService,
        store::{MemoryReviewStore, MemoryTripStore},
    };
    use chrono::{Duration, Utc};

    async fn setup() -> (TripService, ReviewService) {
        let trip_store = Arc::new(MemoryTripStore::new());
        let trips = TripService::new(trip_store.clone());
        let reviews = ReviewService::new(trip_store, Arc::new(MemoryReviewStore::new()));
        (trips, reviews)
    }

    fn new_trip() -> NewTrip {
        let today = Utc::now().date_naive();
        NewTrip {
            destination: "Paris".into(),
            departure_date: today + Duration::days(30),
            return_date: today + Duration::days(40),
            price: 2500.0,
            description: "ten days in Paris".into(),
            available_seats: 20,
            category: "ECONOMY".into(),
            active: true,
        }
    }

    #[tokio::test]
    async fn reviews_round_trip_through_their_trip() {
        let (trips, reviews) = setup().await;
        let trip = trips.create(new_trip()).await.unwrap();

        let review = reviews
            .add(trip.id, NewReview { rating: 5, comment: "Great".into() })
            .await
            .unwrap();
        assert_eq!(review.trip_id, trip.id);

        let listed = reviews.list_by_trip(trip.id).await.unwrap();
        assert_eq!(listed, vec![review]);
    }

    #[tokio::test]
    async fn rejects_missing_trip_bad_rating_and_blank_comment() {
        let (trips, reviews) = setup().await;
        let trip = trips.create(new_trip()).await.unwrap();

        let missing = reviews
            .add(999, NewReview { rating: 4, comment: "Nice".into() })
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::BadRequest(_)));

        for rating in [0, 6] {
            let err = reviews
                .add(trip.id, NewReview { rating, comment: "Nice".into() })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }

        let blank = reviews
            .add(trip.id, NewReview { rating: 3, comment: "  ".into() })
            .await
            .unwrap_err();
        assert!(matches!(blank, AppError::BadRequest(_)));

        assert!(reviews.list_by_trip(trip.id).await.unwrap().is_empty());
        assert!(reviews.list_by_trip(999).await.is_err());
    }
}
