use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A sellable travel offering. The id is assigned by the store on insert and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: i64,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: f64,
    pub description: String,
    pub available_seats: i64,
    pub category: String,
    pub active: bool,
}

/// Payload for creating or fully replacing a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrip {
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub price: f64,
    pub description: String,
    #[serde(default)]
    pub available_seats: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewTrip {
    pub fn into_trip(self, id: i64) -> Trip {
        Trip {
            id,
            destination: self.destination,
            departure_date: self.departure_date,
            return_date: self.return_date,
            price: self.price,
            description: self.description,
            available_seats: self.available_seats,
            category: self.category,
            active: self.active,
        }
    }
}

/// The fixed set of patchable trip fields. Unknown JSON keys are ignored at
/// the boundary; malformed values fail deserialization before they reach the
/// service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripPatch {
    pub destination: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub available_seats: Option<i64>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl TripPatch {
    pub fn apply(&self, trip: &mut Trip) {
        if let Some(destination) = &self.destination {
            trip.destination = destination.clone();
        }
        if let Some(departure_date) = self.departure_date {
            trip.departure_date = departure_date;
        }
        if let Some(return_date) = self.return_date {
            trip.return_date = return_date;
        }
        if let Some(price) = self.price {
            trip.price = price;
        }
        if let Some(description) = &self.description {
            trip.description = description.clone();
        }
        if let Some(available_seats) = self.available_seats {
            trip.available_seats = available_seats;
        }
        if let Some(category) = &self.category {
            trip.category = category.clone();
        }
        if let Some(active) = self.active {
            trip.active = active;
        }
    }
}
