use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::bookings::AdminBookingList,
    dto::shows::{AddShowsRequest, AdminShowList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::{admin_service, show_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shows", get(list_shows).post(add_shows))
        .route("/bookings", get(list_bookings))
}

#[utoipa::path(
    post,
    path = "/api/admin/shows",
    request_body = AddShowsRequest,
    responses(
        (status = 200, description = "Shows created", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid price or showtimes"),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Catalog provider unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_shows(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddShowsRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = show_service::add_shows(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/shows",
    responses(
        (status = 200, description = "Upcoming shows with bookings and earnings", body = ApiResponse<AdminShowList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_shows(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminShowList>>> {
    let resp = admin_service::list_shows(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All bookings, newest first", body = ApiResponse<AdminBookingList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<AdminBookingList>>> {
    let resp = admin_service::list_bookings(&state, &user, pagination).await?;
    Ok(Json(resp))
}
