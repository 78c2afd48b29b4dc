use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    audit::log_audit,
    dto::favorites::{FavoriteMovieList, ToggleFavoriteRequest, ToggleFavoriteResult},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::favorite_service::{self, ToggleAction},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/toggle", post(toggle_favorite))
}

#[utoipa::path(
    post,
    path = "/api/favorites/toggle",
    request_body = ToggleFavoriteRequest,
    responses(
        (status = 200, description = "Membership flipped", body = ApiResponse<ToggleFavoriteResult>),
        (status = 502, description = "Identity provider unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ToggleFavoriteRequest>,
) -> AppResult<Json<ApiResponse<ToggleFavoriteResult>>> {
    let action =
        favorite_service::toggle_favorite(state.identity.as_ref(), &user.user_id, payload.movie_id)
            .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(&user.user_id),
        match action {
            ToggleAction::Added => "favorite_add",
            ToggleAction::Removed => "favorite_remove",
        },
        Some("favorites"),
        Some(serde_json::json!({ "movie_id": payload.movie_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = match action {
        ToggleAction::Added => "Added to favorites",
        ToggleAction::Removed => "Removed from favorites",
    };
    Ok(Json(ApiResponse::success(
        message,
        ToggleFavoriteResult { status: action },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    responses(
        (status = 200, description = "The caller's favorite movies", body = ApiResponse<FavoriteMovieList>),
        (status = 502, description = "Identity provider unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FavoriteMovieList>>> {
    let resp = favorite_service::list_favorites(&state, &user).await?;
    Ok(Json(resp))
}
