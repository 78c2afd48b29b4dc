use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Movie;
use crate::providers::MovieSummary;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddShowsRequest {
    /// Catalog-provider movie id; imported on first use.
    pub movie_id: i64,
    pub showtimes: Vec<DateTime<Utc>>,
    /// Ticket price in minor currency units.
    pub price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieList {
    pub items: Vec<Movie>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NowPlayingList {
    pub items: Vec<MovieSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShowtimeEntry {
    pub time: DateTime<Utc>,
    pub show_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieShowtimes {
    pub movie: Movie,
    /// Upcoming showtimes keyed by UTC calendar date (`YYYY-MM-DD`).
    pub date_time: BTreeMap<String, Vec<ShowtimeEntry>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminShowRow {
    pub id: Uuid,
    pub movie_title: String,
    pub start_time: DateTime<Utc>,
    pub price: i64,
    pub total_bookings: i64,
    pub earnings: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminShowList {
    pub items: Vec<AdminShowRow>,
}
