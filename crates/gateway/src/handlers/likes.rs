//! Movie like/dislike handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::auth::CurrentUser;
use crate::AppState;
use cinescope_common::{db::Repository, errors::Result, metrics};

/// A like or dislike for one movie
#[derive(Debug, Deserialize)]
pub struct MovieLikeRequest {
    pub movie_id: i32,
    pub is_like: bool,
}

#[derive(Debug, Serialize)]
pub struct LikeSavedResponse {
    pub message: &'static str,
}

/// Per-movie like and dislike counts
#[derive(Debug, Serialize)]
pub struct LikeStatsResponse {
    pub likes: u64,
    pub dislikes: u64,
}

/// Save the caller's verdict; a repeated submission flips the stored one
pub async fn like_movie(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<MovieLikeRequest>,
) -> Result<(StatusCode, Json<LikeSavedResponse>)> {
    let repo = Repository::new(state.db.clone());
    repo.save_movie_like(current_user.user.id, request.movie_id, request.is_like)
        .await?;

    metrics::record_movie_like(request.is_like);
    tracing::info!(
        user_id = current_user.user.id,
        movie_id = request.movie_id,
        is_like = request.is_like,
        "Movie like saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(LikeSavedResponse {
            message: "Like saved",
        }),
    ))
}

/// Like and dislike counts for a movie
pub async fn movie_like_stats(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> Result<Json<LikeStatsResponse>> {
    let repo = Repository::new(state.db.clone());
    let (likes, dislikes) = repo.movie_like_stats(movie_id).await?;

    Ok(Json(LikeStatsResponse { likes, dislikes }))
}
