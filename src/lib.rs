pub mod appresult;
pub mod config;
pub mod provision;
pub mod rocketchat;

use anyhow::anyhow;
use axum::extract::FromRef;
use serde_json::Value;

pub use appresult::{AppError, AppResult};
use rocketchat::RocketChat;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub client: RocketChat,
    /// Browser-facing Rocket.Chat URL handed back to the course page.
    pub public_url: String,
}

/// Field access on loosely-shaped Rocket.Chat replies.
pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
    /// Whether the reply self-reports `"success": true`. Absent reads as false.
    fn is_success(&self) -> bool;
}

impl GetField for Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or_else(|| anyhow!("expected {field} in Rocket.Chat reply"))?
            .as_str()
            .ok_or_else(|| anyhow!("expected {field} in Rocket.Chat reply to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        Ok(
            self.get(field)
            .ok_or_else(|| anyhow!("expected {field} in Rocket.Chat reply"))?
        )
    }

    fn is_success(&self) -> bool {
        self.get("success").and_then(Value::as_bool).unwrap_or(false)
    }
}
