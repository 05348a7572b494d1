use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::db::ping;
use crate::state::AppState;

/// ANY /
pub async fn root_handler() -> &'static str {
    info!("got / request");
    "This is my website!\n"
}

/// ANY /hello
pub async fn hello_handler() -> &'static str {
    info!("got /hello request");
    "Hello, HTTP!\n"
}

/// GET /health
/// Always 200 while the process is up; `database` reports whether a round
/// trip succeeded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = match ping(&state.db).await {
        Ok(()) => "ok",
        Err(e) => {
            warn!("Health check could not reach the database: {e}");
            "unreachable"
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database
    }))
}
