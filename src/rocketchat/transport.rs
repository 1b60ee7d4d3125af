use std::future::Future;

use anyhow::anyhow;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{config::{AdminCredentials, Config}, AppResult, GetField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One call against the Rocket.Chat REST API. `path` is relative to
/// `/api/v1/` and may carry a query string. The reply body comes back decoded
/// but otherwise untouched, whatever its status code.
pub trait Transport {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> impl Future<Output = AppResult<Value>> + Send;
}

#[derive(Serialize)]
struct AdminLogin<'a> {
    user: &'a str,
    password: &'a str,
}

#[derive(Clone)]
pub struct HttpTransport {
    http_client: Client,
    api_url: String,
    user_id: String,
    auth_token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, user_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_url: format!("{}/api/v1", base_url.trim_end_matches('/')),
            user_id: user_id.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Builds a transport authenticated as the configured admin, logging in
    /// first when only a username and password were supplied.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        match &config.admin {
            AdminCredentials::Token { user_id, auth_token } => {
                Ok(Self::new(&config.private_url, user_id, auth_token))
            }
            AdminCredentials::Password { username, password } => {
                let mut transport = Self::new(&config.private_url, "", "");
                let (user_id, auth_token) = transport.admin_login(username, password).await?;
                transport.user_id = user_id;
                transport.auth_token = auth_token;
                Ok(transport)
            }
        }
    }

    #[instrument(skip(self, password))]
    async fn admin_login(&self, username: &str, password: &str) -> AppResult<(String, String)> {
        let body: Value = self.http_client
            .post(format!("{}/login", self.api_url))
            .json(&AdminLogin { user: username, password })
            .send()
            .await?
            .json()
            .await?;

        if body.get("status").and_then(Value::as_str) != Some("success") {
            return Err(anyhow!("Rocket.Chat rejected admin login for {username}: {body}").into());
        }

        let data = body.get_obj_field("data")?;
        let user_id = data.get_str_field("userId")?;
        let auth_token = data.get_str_field("authToken")?;
        info!(%user_id, "admin session established");

        Ok((user_id, auth_token))
    }
}

impl Transport for HttpTransport {
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> AppResult<Value> {
        let url = format!("{}/{path}", self.api_url);
        debug!(?method, %url, "rocket.chat request");

        let request = match method {
            Method::Get => self.http_client.get(&url),
            Method::Post => self.http_client.post(&url),
        }
        .header("X-User-Id", &self.user_id)
        .header("X-Auth-Token", &self.auth_token);

        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };

        let response = request.send().await?;
        debug!(status = %response.status(), %url, "rocket.chat response");

        Ok(response.json().await?)
    }
}
