use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bookings::OccupiedSeats,
    dto::shows::{MovieList, MovieShowtimes, NowPlayingList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{booking_service, show_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shows))
        .route("/now-playing", get(now_playing))
        .route("/{id}", get(movie_showtimes))
        .route("/{id}/occupied-seats", get(occupied_seats))
}

#[utoipa::path(
    get,
    path = "/api/shows",
    responses(
        (status = 200, description = "Movies with upcoming shows", body = ApiResponse<MovieList>)
    ),
    tag = "Shows"
)]
pub async fn list_shows(State(state): State<AppState>) -> AppResult<Json<ApiResponse<MovieList>>> {
    let resp = show_service::upcoming_movies(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shows/now-playing",
    responses(
        (status = 200, description = "Now-playing movies from the catalog provider", body = ApiResponse<NowPlayingList>),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Catalog provider unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Shows"
)]
pub async fn now_playing(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<NowPlayingList>>> {
    let resp = show_service::now_playing(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shows/{id}",
    params(
        ("id" = i64, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie with upcoming showtimes grouped by date", body = ApiResponse<MovieShowtimes>),
        (status = 404, description = "Not Found")
    ),
    tag = "Shows"
)]
pub async fn movie_showtimes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MovieShowtimes>>> {
    let resp = show_service::movie_showtimes(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/shows/{id}/occupied-seats",
    params(
        ("id" = Uuid, Path, description = "Show ID")
    ),
    responses(
        (status = 200, description = "Occupied seat labels", body = ApiResponse<OccupiedSeats>),
        (status = 404, description = "Not Found")
    ),
    tag = "Shows"
)]
pub async fn occupied_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OccupiedSeats>>> {
    let resp = booking_service::occupied_seats(&state.pool, id).await?;
    Ok(Json(resp))
}
