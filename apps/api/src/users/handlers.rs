use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{User, UserPayload};
use crate::state::AppState;
use crate::users::repository::{
    create_user, delete_user, delete_users_by_name, get_user, update_user,
};

/// Unwraps a decoded body, turning a rejection into `AppError::Decode`.
fn decode(body: Result<Json<UserPayload>, JsonRejection>) -> Result<UserPayload, AppError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::Decode(rejection.body_text()))
}

/// POST /user
pub async fn handle_create_user(
    State(state): State<AppState>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = decode(body)?;
    let user_id = create_user(&state.db, &payload.name, &payload.password).await?;

    let mut response = (StatusCode::CREATED, "User created successfully\n").into_response();
    let location = user_id.and_then(|id| format!("/user/{id}").parse::<HeaderValue>().ok());
    if let Some(location) = location {
        response.headers_mut().insert(header::LOCATION, location);
    }
    Ok(response)
}

/// GET /user/:user_id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    info!("got /user/{user_id} request");
    let user = get_user(&state.db, &user_id).await?;
    Ok(Json(user))
}

/// PUT /user/:user_id
/// The body is decoded before the UPDATE is issued; a bad body mutates nothing.
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let payload = decode(body)?;
    update_user(&state.db, &user_id, &payload.name, &payload.password).await?;
    Ok("User updated successfully\n")
}

/// DELETE /user/:user_id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<&'static str, AppError> {
    delete_user(&state.db, &user_id).await?;
    Ok("User deleted successfully\n")
}

/// DELETE /delete/:name
/// Bulk removal of every user carrying this name.
pub async fn handle_delete_users_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<&'static str, AppError> {
    let removed = delete_users_by_name(&state.db, &name).await?;
    info!("Deleted {removed} user(s) named {name}");
    Ok("User deleted successfully\n")
}
