use std::fmt;

use anyhow::{anyhow, bail};
use tracing::warn;

/// Salt every existing deployment derived user passwords with. Changing it
/// locks out accounts created under it.
pub const DEFAULT_PASSWORD_SALT: &str = "HarryPotter_y_elPrisonero_deAzkaban";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone)]
pub enum AdminCredentials {
    /// `X-User-Id` / `X-Auth-Token` pair issued by Rocket.Chat.
    Token { user_id: String, auth_token: String },
    /// Exchanged for a token through `/api/v1/login` at startup.
    Password { username: String, password: String },
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AdminCredentials::Token { user_id, .. } => f
                .debug_struct("Token")
                .field("user_id", user_id)
                .field("auth_token", &"[REDACTED]")
                .finish(),
            AdminCredentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL the server uses to reach Rocket.Chat.
    pub private_url: String,
    /// Base URL the learner's browser uses.
    pub public_url: String,
    pub admin: AdminCredentials,
    pub password_salt: String,
    pub bind_addr: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let private_url = var("ROCKETCHAT_URL")
            .ok_or_else(|| anyhow!("ROCKETCHAT_URL must be set"))?
            .trim_end_matches('/')
            .to_owned();
        let public_url = var("ROCKETCHAT_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| private_url.clone());

        let admin = match (
            var("ROCKETCHAT_ADMIN_USER_ID"),
            var("ROCKETCHAT_ADMIN_AUTH_TOKEN"),
            var("ROCKETCHAT_ADMIN_USERNAME"),
            var("ROCKETCHAT_ADMIN_PASSWORD"),
        ) {
            (Some(user_id), Some(auth_token), _, _) => AdminCredentials::Token { user_id, auth_token },
            (_, _, Some(username), Some(password)) => AdminCredentials::Password { username, password },
            _ => bail!(
                "admin credentials missing: set ROCKETCHAT_ADMIN_USER_ID and ROCKETCHAT_ADMIN_AUTH_TOKEN, \
                 or ROCKETCHAT_ADMIN_USERNAME and ROCKETCHAT_ADMIN_PASSWORD"
            ),
        };

        let password_salt = match var("ROCKETCHAT_PASSWORD_SALT") {
            Some(salt) => salt,
            None => {
                warn!("ROCKETCHAT_PASSWORD_SALT not set, deriving user passwords with the shared default salt");
                DEFAULT_PASSWORD_SALT.to_owned()
            }
        };

        Ok(Self {
            private_url,
            public_url,
            admin,
            password_salt,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn token_credentials_and_defaults() {
        let cfg = config(&[
            ("ROCKETCHAT_URL", "http://rocket.internal:3000/"),
            ("ROCKETCHAT_ADMIN_USER_ID", "admin-id"),
            ("ROCKETCHAT_ADMIN_AUTH_TOKEN", "admin-token"),
        ])
        .unwrap();

        assert_eq!(cfg.private_url, "http://rocket.internal:3000");
        assert_eq!(cfg.public_url, "http://rocket.internal:3000");
        assert_eq!(cfg.password_salt, DEFAULT_PASSWORD_SALT);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        match cfg.admin {
            AdminCredentials::Token { user_id, auth_token } => {
                assert_eq!(user_id, "admin-id");
                assert_eq!(auth_token, "admin-token");
            }
            other => panic!("unexpected credentials {other:?}"),
        }
    }

    #[test]
    fn password_credentials_and_overrides() {
        let cfg = config(&[
            ("ROCKETCHAT_URL", "http://rocket.internal:3000"),
            ("ROCKETCHAT_PUBLIC_URL", "https://chat.example.org/"),
            ("ROCKETCHAT_ADMIN_USERNAME", "root"),
            ("ROCKETCHAT_ADMIN_PASSWORD", "hunter2"),
            ("ROCKETCHAT_PASSWORD_SALT", "per-site"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();

        assert_eq!(cfg.public_url, "https://chat.example.org");
        assert_eq!(cfg.password_salt, "per-site");
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert!(matches!(cfg.admin, AdminCredentials::Password { ref username, .. } if username == "root"));
    }

    #[test]
    fn missing_values_are_errors() {
        assert!(config(&[("ROCKETCHAT_ADMIN_USER_ID", "a"), ("ROCKETCHAT_ADMIN_AUTH_TOKEN", "b")]).is_err());
        assert!(config(&[("ROCKETCHAT_URL", "http://x"), ("ROCKETCHAT_ADMIN_USER_ID", "a")]).is_err());
        assert!(config(&[("ROCKETCHAT_URL", "  "), ("ROCKETCHAT_ADMIN_USERNAME", "a"), ("ROCKETCHAT_ADMIN_PASSWORD", "b")]).is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let creds = AdminCredentials::Password { username: "root".into(), password: "hunter2".into() };
        let shown = format!("{creds:?}");
        assert!(shown.contains("root"));
        assert!(!shown.contains("hunter2"));
    }
}
