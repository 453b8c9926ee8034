//! Movie rating handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::auth::CurrentUser;
use crate::AppState;
use cinescope_common::{
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

/// One-time rating on a 1-10 scale
#[derive(Debug, Deserialize, Validate)]
pub struct RateMovieRequest {
    pub movie_id: i32,

    #[validate(range(min = 1, max = 10))]
    pub rating: i32,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub movie_id: i32,
    pub rating: i32,
}

/// Record the caller's rating; a second attempt is a conflict
pub async fn rate_movie(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<RateMovieRequest>,
) -> Result<(StatusCode, Json<RatingResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    repo.rate_movie(current_user.user.id, request.movie_id, request.rating)
        .await?;

    metrics::record_rating();
    tracing::info!(
        user_id = current_user.user.id,
        movie_id = request.movie_id,
        rating = request.rating,
        "Movie rated"
    );

    Ok((
        StatusCode::CREATED,
        Json(RatingResponse {
            movie_id: request.movie_id,
            rating: request.rating,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_stay_on_scale() {
        let low = RateMovieRequest {
            movie_id: 1,
            rating: 0,
        };
        assert!(low.validate().is_err());

        let high = RateMovieRequest {
            movie_id: 1,
            rating: 11,
        };
        assert!(high.validate().is_err());

        let valid = RateMovieRequest {
            movie_id: 1,
            rating: 10,
        };
        assert!(valid.validate().is_ok());
    }
}
