use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A rating plus comment attached to exactly one trip. Reviews are never
/// updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub trip_id: i64,
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: i64,
    pub comment: String,
}
