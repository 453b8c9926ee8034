//! Notification handlers

use axum::{extract::State, Json};

use crate::handlers::DetailResponse;
use crate::middleware::auth::CurrentUser;
use crate::AppState;
use cinescope_common::{db::Repository, errors::Result};

/// The caller's notification messages, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    let messages = repo.list_notifications(current_user.user.id).await?;

    Ok(Json(messages))
}

/// Mark every unread notification of the caller as read
pub async fn mark_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<DetailResponse>> {
    let repo = Repository::new(state.db.clone());
    let updated = repo.mark_notifications_read(current_user.user.id).await?;

    tracing::info!(
        user_id = current_user.user.id,
        updated,
        "Notifications marked read"
    );

    Ok(Json(DetailResponse {
        detail: "Notifications read",
    }))
}
