//! Signup and profile routes.

use super::{
    AppState, Caller,
    extract::JsonBody,
};
use crate::{
    core::{
        farm::FarmInput,
        user::{self, ProfileInput},
    },
    entities::{farm, user as user_entity},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Auth routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/profile", get(get_profile).put(update_profile))
}

/// Body of `POST /auth/signup`
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// E-mail to register
    pub email: String,
    /// Descriptive profile fields
    #[serde(default)]
    pub profile: ProfileInput,
    /// The user's first farm
    pub farm: FarmInput,
}

/// Response of `POST /auth/signup`
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// The new user
    pub user: user_entity::Model,
    /// Their first farm, already active
    pub farm: farm::Model,
}

async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let (user, farm) =
        user::signup(&state.database, &request.email, request.profile, request.farm).await?;
    Ok((StatusCode::CREATED, Json(SignupResponse { user, farm })))
}

async fn get_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<user_entity::Model>> {
    Ok(Json(user::get_user(&state.database, &caller.email).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(profile): JsonBody<ProfileInput>,
) -> Result<Json<user_entity::Model>> {
    Ok(Json(
        user::update_profile(&state.database, &caller.email, profile).await?,
    ))
}
