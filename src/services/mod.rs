pub mod reviews;
pub mod trips;
