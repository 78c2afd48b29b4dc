use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod bookings;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod params;
pub mod shows;
pub mod webhooks;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/shows", shows::router())
        .nest("/bookings", bookings::router())
        .nest("/favorites", favorites::router())
        .nest("/admin", admin::router())
}
