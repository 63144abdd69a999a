//! HTTP route handlers.

pub mod attachment;
pub mod auth;
pub mod health;
pub mod helpers;
pub mod integration;
pub mod tag;
pub mod user;
pub mod workshop;

use axum::Router;

use crate::state::AppState;

/// Assemble the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(workshop::router())
        .merge(tag::router())
        .merge(attachment::router())
        .merge(user::router())
        .merge(integration::router())
        .merge(health::router())
}
