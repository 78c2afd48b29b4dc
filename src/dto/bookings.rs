use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBookingRequest {
    pub show_id: Uuid,
    /// Seat labels to claim, e.g. `["A1", "A2"]`.
    pub seats: Vec<String>,
    /// Client origin used to build the checkout return URLs.
    pub origin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCheckout {
    /// Hosted checkout URL the client is redirected to.
    pub redirect_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingStatusView {
    pub id: Uuid,
    pub status: BookingStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OccupiedSeats {
    pub seats: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShowInfo {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieCard {
    pub id: i64,
    pub title: String,
    pub poster_path: String,
    pub backdrop_path: String,
    pub release_date: String,
    pub runtime: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingView {
    pub booking: Booking,
    pub show: ShowInfo,
    pub movie: MovieCard,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<BookingView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminBookingList {
    pub items: Vec<Booking>,
}
