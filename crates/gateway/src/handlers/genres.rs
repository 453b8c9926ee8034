//! Genre handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::handlers::movies::MovieListItemOut;
use crate::AppState;
use cinescope_common::{
    db::{GenreWithCount, Repository},
    errors::Result,
};

/// Genres carrying at least one movie, busiest first
pub async fn list_genres(State(state): State<AppState>) -> Result<Json<Vec<GenreWithCount>>> {
    let repo = Repository::new(state.db.clone());
    let genres = repo.list_genres_with_counts().await?;

    Ok(Json(genres))
}

/// Movies attached to one genre
pub async fn movies_by_genre(
    State(state): State<AppState>,
    Path(genre_id): Path<i32>,
) -> Result<Json<Vec<MovieListItemOut>>> {
    let repo = Repository::new(state.db.clone());
    let movies = repo.list_movies_by_genre(genre_id).await?;

    Ok(Json(movies.into_iter().map(Into::into).collect()))
}
