use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        review::{NewReview, Review},
        trip::Trip,
    },
    store::{ReviewStore, TripStore},
};

/// Durable trip backend over the sqlx SQLite pool. One row per trip; seat
/// reservation is a single conditional UPDATE so concurrent reservations
/// serialize on the database.
#[derive(Clone)]
pub struct SqliteTripStore {
    db: DbPool,
}

impl SqliteTripStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TripStore for SqliteTripStore {
    async fn get(&self, id: i64) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, departure_date, return_date, price, description, \
             available_seats, category, active FROM trips WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(trip)
    }

    async fn list(&self) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, departure_date, return_date, price, description, \
             available_seats, category, active FROM trips ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    async fn list_active(&self) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, departure_date, return_date, price, description, \
             available_seats, category, active FROM trips WHERE active = 1 ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    async fn insert(&self, trip: Trip) -> Result<Trip, AppError> {
        let result = sqlx::query(
            "INSERT INTO trips (destination, departure_date, return_date, price, description, \
             available_seats, category, active) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&trip.destination)
        .bind(trip.departure_date)
        .bind(trip.return_date)
        .bind(trip.price)
        .bind(&trip.description)
        .bind(trip.available_seats)
        .bind(&trip.category)
        .bind(trip.active)
        .execute(&self.db)
        .await?;

        Ok(Trip {
            id: result.last_insert_rowid(),
            ..trip
        })
    }

    async fn update(&self, trip: &Trip) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE trips SET destination = ?, departure_date = ?, return_date = ?, price = ?, \
             description = ?, available_seats = ?, category = ?, active = ? WHERE id = ?",
        )
        .bind(&trip.destination)
        .bind(trip.departure_date)
        .bind(trip.return_date)
        .bind(trip.price)
        .bind(&trip.description)
        .bind(trip.available_seats)
        .bind(&trip.category)
        .bind(trip.active)
        .bind(trip.id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mutate(
        &self,
        id: i64,
        apply: &(dyn for<'a> Fn(&'a mut Trip) -> Result<(), AppError> + Send + Sync),
    ) -> Result<Option<Trip>, AppError> {
        loop {
            let Some(current) = self.get(id).await? else {
                return Ok(None);
            };
            let mut updated = current.clone();
            apply(&mut updated)?;

            // Guarded on the seat count read above: if a reservation commits
            // in between, the update misses and we retry on the fresh row.
            let result = sqlx::query(
                "UPDATE trips SET destination = ?, departure_date = ?, return_date = ?, \
                 price = ?, description = ?, available_seats = ?, category = ?, active = ? \
                 WHERE id = ? AND available_seats = ?",
            )
            .bind(&updated.destination)
            .bind(updated.departure_date)
            .bind(updated.return_date)
            .bind(updated.price)
            .bind(&updated.description)
            .bind(updated.available_seats)
            .bind(&updated.category)
            .bind(updated.active)
            .bind(id)
            .bind(current.available_seats)
            .execute(&self.db)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(Some(updated));
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_destination(
        &self,
        destination: &str,
        active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        // instr avoids LIKE wildcard characters in user input.
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, departure_date, return_date, price, description, \
             available_seats, category, active FROM trips \
             WHERE active = ? AND instr(lower(destination), lower(?)) > 0 ORDER BY id",
        )
        .bind(active)
        .bind(destination)
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    async fn find_by_category(
        &self,
        category: &str,
        active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, departure_date, return_date, price, description, \
             available_seats, category, active FROM trips \
             WHERE active = ? AND lower(category) = lower(?) ORDER BY id",
        )
        .bind(active)
        .bind(category)
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    async fn find_by_price_range(
        &self,
        min: f64,
        max: f64,
        active: bool,
    ) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT id, destination, departure_date, return_date, price, description, \
             available_seats, category, active FROM trips \
             WHERE active = ? AND price BETWEEN ? AND ? ORDER BY id",
        )
        .bind(active)
        .bind(min)
        .bind(max)
        .fetch_all(&self.db)
        .await?;
        Ok(trips)
    }

    async fn reserve_seats(&self, id: i64, quantity: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE trips SET available_seats = available_seats - ? \
             WHERE id = ? AND active = 1 AND available_seats >= ?",
        )
        .bind(quantity)
        .bind(id)
        .bind(quantity)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Durable review backend; rows are returned in id order, which matches
/// insertion order.
#[derive(Clone)]
pub struct SqliteReviewStore {
    db: DbPool,
}

impl SqliteReviewStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    async fn insert(&self, trip_id: i64, review: NewReview) -> Result<Review, AppError> {
        let result = sqlx::query("INSERT INTO reviews (trip_id, rating, comment) VALUES (?, ?, ?)")
            .bind(trip_id)
            .bind(review.rating)
            .bind(&review.comment)
            .execute(&self.db)
            .await?;

        Ok(Review {
            id: result.last_insert_rowid(),
            trip_id,
            rating: review.rating,
            comment: review.comment,
        })
    }

    async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT id, trip_id, rating, comment FROM reviews WHERE trip_id = ? ORDER BY id",
        )
        .bind(trip_id)
        .fetch_all(&self.db)
        .await?;
        Ok(reviews)
    }
}
