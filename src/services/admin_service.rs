//! Admin projections over shows and bookings.

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    dto::bookings::AdminBookingList,
    dto::shows::{AdminShowList, AdminShowRow},
    entity::{
        bookings::{Column as BookingCol, Entity as Bookings},
        movies::Entity as Movies,
        shows::{Column as ShowCol, Entity as Shows},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::booking_service::booking_from_entity,
    state::AppState,
};

/// Upcoming shows with their booking counts and earnings. Earnings are
/// derived from the occupancy map: every held seat was sold at the show
/// price.
pub async fn list_shows(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminShowList>> {
    ensure_admin(user)?;

    let rows = Shows::find()
        .filter(ShowCol::StartTime.gte(Utc::now()))
        .order_by_asc(ShowCol::StartTime)
        .find_also_related(Movies)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(show, movie)| {
            let booked = show
                .occupied_seats
                .as_object()
                .map(|seats| seats.len())
                .unwrap_or(0) as i64;
            AdminShowRow {
                id: show.id,
                movie_title: movie.map(|m| m.title).unwrap_or_default(),
                start_time: show.start_time.with_timezone(&Utc),
                price: show.price,
                total_bookings: booked,
                earnings: booked * show.price,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        AdminShowList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_bookings(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<AdminBookingList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Bookings::find().order_by_desc(BookingCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let mut items = Vec::new();
    for model in finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
    {
        items.push(booking_from_entity(model)?);
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        AdminBookingList { items },
        Some(meta),
    ))
}
