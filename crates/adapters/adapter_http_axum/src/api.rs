//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod circuits;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/circuits", get(circuits::list))
        .route("/circuits/{alias}", get(circuits::get).put(circuits::set))
        .route("/circuits/{alias}/identify", post(circuits::identify))
}
