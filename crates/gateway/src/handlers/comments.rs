//! Comment handlers
//!
//! Covers top-level comments, threaded replies, and comment likes.
//! Replies and likes notify the comment's author unless the author
//! acts on their own comment.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handlers::DetailResponse;
use crate::middleware::auth::CurrentUser;
use crate::AppState;
use cinescope_common::{
    db::models::Comment,
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub content: String,

    pub movie_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub content: String,
    pub created_at: String,
    pub user_id: i32,
    pub movie_id: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
            user_id: comment.user_id,
            movie_id: comment.movie_id,
            parent_id: comment.parent_id,
        }
    }
}

/// Leave a top-level comment on a movie
pub async fn create_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<CommentResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let comment = repo
        .create_comment(current_user.user.id, request.movie_id, request.content)
        .await?;

    metrics::record_comment(false);
    tracing::info!(
        user_id = current_user.user.id,
        movie_id = request.movie_id,
        comment_id = comment.id,
        "Comment created"
    );

    Ok(Json(comment.into()))
}

/// Reply to an existing comment
pub async fn reply_to_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(comment_id): Path<i32>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<CommentResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let reply = repo
        .reply_to_comment(comment_id, &current_user.user, request.content)
        .await?;

    metrics::record_comment(true);
    tracing::info!(
        user_id = current_user.user.id,
        parent_id = comment_id,
        reply_id = reply.id,
        "Reply created"
    );

    Ok(Json(reply.into()))
}

/// Like a comment once
pub async fn like_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(comment_id): Path<i32>,
) -> Result<Json<DetailResponse>> {
    let repo = Repository::new(state.db.clone());
    repo.like_comment(comment_id, &current_user.user).await?;

    metrics::record_comment_like();
    tracing::info!(
        user_id = current_user.user.id,
        comment_id,
        "Comment liked"
    );

    Ok(Json(DetailResponse {
        detail: "Comment liked",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_content_is_rejected() {
        let request = CreateCommentRequest {
            content: String::new(),
            movie_id: 1,
        };
        assert!(request.validate().is_err());

        let reply = ReplyRequest {
            content: String::new(),
        };
        assert!(reply.validate().is_err());
    }

    #[test]
    fn top_level_comment_omits_parent_id() {
        let comment = Comment {
            id: 10,
            content: "Loved the ending.".to_string(),
            user_id: 3,
            movie_id: 5,
            parent_id: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 4, 12, 0, 0).unwrap().fixed_offset(),
        };

        let body = serde_json::to_value(CommentResponse::from(comment)).unwrap();
        assert!(body.get("parent_id").is_none());
        assert_eq!(body["movie_id"], 5);
    }

    #[test]
    fn reply_carries_parent_id() {
        let reply = Comment {
            id: 11,
            content: "Same here.".to_string(),
            user_id: 4,
            movie_id: 5,
            parent_id: Some(10),
            created_at: Utc.with_ymd_and_hms(2025, 5, 4, 12, 5, 0).unwrap().fixed_offset(),
        };

        let body = serde_json::to_value(CommentResponse::from(reply)).unwrap();
        assert_eq!(body["parent_id"], 10);
    }
}
