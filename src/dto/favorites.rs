use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Movie;
use crate::services::favorite_service::ToggleAction;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ToggleFavoriteRequest {
    pub movie_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleFavoriteResult {
    pub status: ToggleAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteMovieList {
    pub items: Vec<Movie>,
}
