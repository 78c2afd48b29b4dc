//! Show catalog: admin show creation (with on-demand movie import from the
//! catalog provider) and the public browsing projections.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::shows::{AddShowsRequest, MovieList, MovieShowtimes, NowPlayingList, ShowtimeEntry},
    entity::{
        movies::{self, Entity as Movies},
        shows::{self, Column as ShowCol, Entity as Shows},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Movie,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Catalog provider's now-playing list, shown on the admin add-show screen.
pub async fn now_playing(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NowPlayingList>> {
    ensure_admin(user)?;
    let movies = state.catalog.now_playing().await?;
    Ok(ApiResponse::success(
        "OK",
        NowPlayingList { items: movies },
        Some(Meta::empty()),
    ))
}

pub async fn add_shows(
    state: &AppState,
    user: &AuthUser,
    payload: AddShowsRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    if payload.price <= 0 {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }
    if payload.showtimes.is_empty() {
        return Err(AppError::BadRequest("No showtimes provided".into()));
    }
    let now = Utc::now();
    if payload.showtimes.iter().any(|t| *t <= now) {
        return Err(AppError::BadRequest(
            "Showtimes must be in the future".into(),
        ));
    }

    ensure_movie(state, payload.movie_id).await?;

    let count = payload.showtimes.len();
    let rows: Vec<shows::ActiveModel> = payload
        .showtimes
        .iter()
        .map(|start| shows::ActiveModel {
            id: Set(Uuid::new_v4()),
            movie_id: Set(payload.movie_id),
            start_time: Set((*start).into()),
            price: Set(payload.price),
            occupied_seats: Set(serde_json::json!({})),
            created_at: NotSet,
            updated_at: NotSet,
        })
        .collect();
    Shows::insert_many(rows).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(&user.user_id),
        "shows_added",
        Some("shows"),
        Some(serde_json::json!({
            "movie_id": payload.movie_id,
            "count": count,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Shows added successfully",
        serde_json::json!({ "count": count }),
        Some(Meta::empty()),
    ))
}

/// Import the movie from the catalog provider unless it is already local.
async fn ensure_movie(state: &AppState, movie_id: i64) -> AppResult<()> {
    if Movies::find_by_id(movie_id)
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Ok(());
    }

    tracing::info!(movie_id, "importing movie from catalog");
    let detail = state.catalog.details(movie_id).await?;

    movies::ActiveModel {
        id: Set(detail.id),
        title: Set(detail.title),
        overview: Set(detail.overview),
        poster_path: Set(detail.poster_path.unwrap_or_default()),
        backdrop_path: Set(detail.backdrop_path.unwrap_or_default()),
        release_date: Set(detail.release_date.unwrap_or_default()),
        original_language: Set(detail.original_language),
        tagline: Set(detail.tagline),
        genres: Set(detail.genres),
        casts: Set(detail.casts),
        vote_average: Set(detail.vote_average),
        runtime: Set(detail.runtime),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(())
}

/// Distinct movies that still have at least one upcoming show, in order of
/// their earliest showtime.
pub async fn upcoming_movies(state: &AppState) -> AppResult<ApiResponse<MovieList>> {
    let rows = Shows::find()
        .filter(ShowCol::StartTime.gte(Utc::now()))
        .order_by_asc(ShowCol::StartTime)
        .find_also_related(Movies)
        .all(&state.orm)
        .await?;

    let mut seen: HashSet<i64> = HashSet::new();
    let mut items = Vec::new();
    for (_, movie) in rows {
        if let Some(movie) = movie {
            if seen.insert(movie.id) {
                items.push(movie_from_entity(movie));
            }
        }
    }

    Ok(ApiResponse::success(
        "OK",
        MovieList { items },
        Some(Meta::empty()),
    ))
}

/// A movie plus its upcoming showtimes grouped by calendar date (UTC).
pub async fn movie_showtimes(
    state: &AppState,
    movie_id: i64,
) -> AppResult<ApiResponse<MovieShowtimes>> {
    let movie = Movies::find_by_id(movie_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let shows = Shows::find()
        .filter(ShowCol::MovieId.eq(movie_id))
        .filter(ShowCol::StartTime.gte(Utc::now()))
        .order_by_asc(ShowCol::StartTime)
        .all(&state.orm)
        .await?;

    let mut date_time: BTreeMap<String, Vec<ShowtimeEntry>> = BTreeMap::new();
    for show in shows {
        let start = show.start_time.with_timezone(&Utc);
        date_time
            .entry(start.format("%Y-%m-%d").to_string())
            .or_default()
            .push(ShowtimeEntry {
                time: start,
                show_id: show.id,
            });
    }

    Ok(ApiResponse::success(
        "OK",
        MovieShowtimes {
            movie: movie_from_entity(movie),
            date_time,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) fn movie_from_entity(model: movies::Model) -> Movie {
    Movie {
        id: model.id,
        title: model.title,
        overview: model.overview,
        poster_path: model.poster_path,
        backdrop_path: model.backdrop_path,
        release_date: model.release_date,
        original_language: model.original_language,
        tagline: model.tagline,
        genres: model.genres,
        casts: model.casts,
        vote_average: model.vote_average,
        runtime: model.runtime,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
