//! API handlers module

use serde::Serialize;

pub mod comments;
pub mod favorites;
pub mod genres;
pub mod health;
pub mod likes;
pub mod movies;
pub mod notifications;
pub mod ratings;

/// Fixed acknowledgement body used by several endpoints
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: &'static str,
}
