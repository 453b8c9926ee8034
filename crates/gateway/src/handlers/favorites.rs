//! Favorite list handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::middleware::auth::CurrentUser;
use crate::AppState;
use cinescope_common::{
    db::models::Movie,
    db::{FavoriteFilter, Repository, SortOrder},
    errors::Result,
    metrics,
};

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub movie_id: i32,
}

/// Filters and sort selection for the favorites list
#[derive(Debug, Deserialize)]
pub struct FavoriteListParams {
    pub year: Option<i32>,
    pub name: Option<String>,
    pub imdb: Option<f64>,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default)]
    pub order: SortOrder,
}

fn default_sort_by() -> String {
    "year".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RemoveFavoriteParams {
    pub movie_id: Option<i32>,
}

/// Favorited movie summary
#[derive(Debug, Serialize)]
pub struct FavoriteMovieOut {
    pub id: i32,
    pub name: String,
    pub year: NaiveDate,
    pub imdb: f64,
}

impl From<Movie> for FavoriteMovieOut {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            name: movie.name,
            year: movie.year,
            imdb: movie.imdb,
        }
    }
}

/// Put a movie on the caller's favorites list
pub async fn add_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteMovieOut>)> {
    let repo = Repository::new(state.db.clone());
    let movie = repo
        .add_favorite(current_user.user.id, request.movie_id)
        .await?;

    metrics::record_favorite_added();
    tracing::info!(
        user_id = current_user.user.id,
        movie_id = request.movie_id,
        "Movie added to favorites"
    );

    Ok((StatusCode::CREATED, Json(movie.into())))
}

/// The caller's favorites, filtered and sorted
pub async fn list_favorites(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<FavoriteListParams>,
) -> Result<Json<Vec<FavoriteMovieOut>>> {
    let filter = FavoriteFilter {
        year: params.year,
        name: params.name,
        imdb: params.imdb,
    };

    let repo = Repository::new(state.db.clone());
    let movies = repo
        .list_favorites(current_user.user.id, &filter, &params.sort_by, params.order)
        .await?;

    Ok(Json(movies.into_iter().map(Into::into).collect()))
}

/// Drop one movie from the caller's favorites
pub async fn remove_favorite(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<RemoveFavoriteParams>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());
    repo.remove_favorite(current_user.user.id, params.movie_id)
        .await?;

    tracing::info!(
        user_id = current_user.user.id,
        movie_id = params.movie_id,
        "Movie removed from favorites"
    );

    Ok(StatusCode::NO_CONTENT)
}
