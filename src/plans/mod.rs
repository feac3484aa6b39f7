pub mod completion;
pub mod dto;
pub mod grid;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/plans",
            get(handlers::list_plans).post(handlers::create_plan),
        )
        .route(
            "/plans/:id",
            get(handlers::get_plan)
                .put(handlers::update_plan)
                .delete(handlers::delete_plan),
        )
        .route("/plans/:id/copy", post(handlers::copy_plan))
}
