use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bookings::{
            AdminBookingList, BookingCheckout, BookingList, BookingStatusView, BookingView,
            CreateBookingRequest, MovieCard, OccupiedSeats, ShowInfo,
        },
        favorites::{FavoriteMovieList, ToggleFavoriteRequest, ToggleFavoriteResult},
        shows::{
            AddShowsRequest, AdminShowList, AdminShowRow, MovieList, MovieShowtimes,
            NowPlayingList, ShowtimeEntry,
        },
    },
    models::{Booking, BookingStatus, Movie, Show},
    providers::MovieSummary,
    response::{ApiResponse, Meta},
    routes::{admin, bookings, favorites, health, params, shows, webhooks},
    services::favorite_service::ToggleAction,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        shows::list_shows,
        shows::now_playing,
        shows::movie_showtimes,
        shows::occupied_seats,
        bookings::create_booking,
        bookings::list_bookings,
        bookings::booking_status,
        favorites::toggle_favorite,
        favorites::list_favorites,
        admin::add_shows,
        admin::list_shows,
        admin::list_bookings,
        webhooks::payment_webhook
    ),
    components(
        schemas(
            Movie,
            Show,
            Booking,
            BookingStatus,
            MovieSummary,
            CreateBookingRequest,
            BookingCheckout,
            BookingStatusView,
            BookingView,
            BookingList,
            AdminBookingList,
            OccupiedSeats,
            ShowInfo,
            MovieCard,
            ToggleFavoriteRequest,
            ToggleFavoriteResult,
            ToggleAction,
            FavoriteMovieList,
            AddShowsRequest,
            AdminShowList,
            AdminShowRow,
            MovieList,
            MovieShowtimes,
            NowPlayingList,
            ShowtimeEntry,
            params::Pagination,
            webhooks::WebhookEvent,
            Meta,
            ApiResponse<BookingCheckout>,
            ApiResponse<BookingList>,
            ApiResponse<OccupiedSeats>,
            ApiResponse<MovieList>,
            ApiResponse<FavoriteMovieList>,
            ApiResponse<AdminShowList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Shows", description = "Movie and showtime endpoints"),
        (name = "Bookings", description = "Booking endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Webhooks", description = "Payment provider callbacks"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
