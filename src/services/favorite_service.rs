//! Favorites Toggle Service.
//!
//! Favorites live in the identity provider's per-user profile metadata, not
//! in Postgres. Toggling is a read-modify-write on that document: read the
//! current metadata, flip membership, write the full resulting set back.
//! The store offers no conditional write, so two concurrent toggles for the
//! same user can race and one update can be lost; this is an accepted
//! limitation of the integration.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    dto::favorites::FavoriteMovieList,
    entity::movies::{Column as MovieCol, Entity as Movies},
    error::AppResult,
    middleware::auth::AuthUser,
    providers::IdentityProvider,
    response::{ApiResponse, Meta},
    services::show_service::movie_from_entity,
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

pub async fn toggle_favorite(
    identity: &dyn IdentityProvider,
    user_id: &str,
    movie_id: i64,
) -> AppResult<ToggleAction> {
    let profile = identity.get_profile(user_id).await?;
    let mut metadata = match profile.private_metadata {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    let mut favorites = metadata
        .get("favorites")
        .map(favorites_from_value)
        .unwrap_or_default();

    let action = if let Some(pos) = favorites.iter().position(|id| *id == movie_id) {
        favorites.remove(pos);
        ToggleAction::Removed
    } else {
        favorites.push(movie_id);
        ToggleAction::Added
    };

    // Write back the whole document so other metadata keys survive.
    metadata.insert("favorites".into(), serde_json::json!(favorites));
    identity
        .update_metadata(user_id, Value::Object(metadata))
        .await?;

    Ok(action)
}

/// Resolve the user's favorite ids against locally imported movies.
pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteMovieList>> {
    let profile = state.identity.get_profile(&user.user_id).await?;
    let favorites = profile
        .private_metadata
        .get("favorites")
        .map(favorites_from_value)
        .unwrap_or_default();

    let items = if favorites.is_empty() {
        Vec::new()
    } else {
        Movies::find()
            .filter(MovieCol::Id.is_in(favorites))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(movie_from_entity)
            .collect()
    };

    Ok(ApiResponse::success(
        "OK",
        FavoriteMovieList { items },
        Some(Meta::empty()),
    ))
}

fn favorites_from_value(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}
