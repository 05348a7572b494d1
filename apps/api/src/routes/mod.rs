pub mod health;

use axum::{
    routing::{any, delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::users::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(health::root_handler))
        .route("/hello", any(health::hello_handler))
        .route("/health", get(health::health_handler))
        // User API
        .route("/user", post(handlers::handle_create_user))
        .route(
            "/user/:user_id",
            get(handlers::handle_get_user)
                .put(handlers::handle_update_user)
                .delete(handlers::handle_delete_user),
        )
        .route(
            "/delete/:name",
            delete(handlers::handle_delete_users_by_name),
        )
        .with_state(state)
}
