use axum::{debug_handler, extract::State, routing::{get, post}, Json, Router};
use serde::Serialize;

use crate::{rocketchat::{Provisioned, RocketChat, UserProfile}, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    /// Where the course page should point the chat iframe.
    pub public_url: String,
    #[serde(flatten)]
    pub provisioned: Provisioned,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/provision", post(provision))
        .route("/health", get(health))
}

#[debug_handler(state = AppState)]
pub(crate) async fn provision(
    State(client): State<RocketChat>,
    State(public_url): State<String>,
    Json(profile): Json<UserProfile>,
) -> AppResult<Json<ProvisionResponse>> {
    let provisioned = client.provision(&profile).await?;

    Ok(Json(ProvisionResponse { public_url, provisioned }))
}

#[debug_handler]
pub(crate) async fn health() -> &'static str {
    "ok"
}
