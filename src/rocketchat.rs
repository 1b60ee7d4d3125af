//! Provisioning of Rocket.Chat users and course groups through the REST API.

mod password;
mod transport;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::{AppResult, GetField};

pub use password::derive_password;
pub use transport::{HttpTransport, Method, Transport};

/// `<endpoint>?<key>=<value>` with the value form-encoded, so names carrying
/// `+`, `&` or `#` reach Rocket.Chat intact.
fn lookup_path(endpoint: &str, key: &str, value: &str) -> String {
    let value: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{endpoint}?{key}={value}")
}

/// The learner as the course runtime describes them. Nothing here is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub anonymous_student_id: String,
    pub email: String,
    pub course: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Provisioned {
    /// `users.createToken` reply, success or not.
    pub token: Value,
    /// Last reply of the course group step. Absent when no token was issued.
    pub group: Option<Value>,
}

#[derive(Clone)]
pub struct RocketChat<T = HttpTransport> {
    transport: T,
    password_salt: String,
}

impl<T: Transport> RocketChat<T> {
    pub fn new(transport: T, password_salt: impl Into<String>) -> Self {
        Self {
            transport,
            password_salt: password_salt.into(),
        }
    }

    pub async fn request_rocket_chat(&self, method: Method, path: &str, body: Option<&Value>) -> AppResult<Value> {
        self.transport.request(method, path, body).await
    }

    pub async fn search_user(&self, username: &str) -> AppResult<Value> {
        self.request_rocket_chat(Method::Get, &lookup_path("users.info", "username", username), None).await
    }

    /// Creates an account whose password is derived from `name`, so the same
    /// learner always maps to the same credentials.
    pub async fn create_user(&self, name: &str, email: &str, username: &str) -> AppResult<Value> {
        let password = derive_password(name, &self.password_salt);
        let body = json!({
            "name": name,
            "email": email,
            "password": password,
            "username": username,
        });
        self.request_rocket_chat(Method::Post, "users.create", Some(&body)).await
    }

    pub async fn create_token(&self, username: &str) -> AppResult<Value> {
        self.request_rocket_chat(Method::Post, "users.createToken", Some(&json!({"username": username}))).await
    }

    pub async fn search_group(&self, room_name: &str) -> AppResult<Value> {
        self.request_rocket_chat(Method::Get, &lookup_path("groups.info", "roomName", room_name), None).await
    }

    pub async fn create_group(&self, name: &str) -> AppResult<Value> {
        self.request_rocket_chat(Method::Post, "groups.create", Some(&json!({"name": name}))).await
    }

    pub async fn invite_to_group(&self, room_id: &str, user_id: &str) -> AppResult<Value> {
        let body = json!({"roomId": room_id, "userId": user_id});
        self.request_rocket_chat(Method::Post, "groups.invite", Some(&body)).await
    }

    /// Issues a session token for the learner, creating their account first
    /// if Rocket.Chat doesn't know them. Returns the `users.createToken` reply.
    #[instrument(skip_all, fields(username = %profile.username))]
    pub async fn login(&self, profile: &UserProfile) -> AppResult<Value> {
        let found = self.search_user(&profile.username).await?;
        if found.is_success() {
            debug!("user exists");
        } else {
            info!("user unknown to Rocket.Chat, creating");
            let created = self
                .create_user(&profile.anonymous_student_id, &profile.email, &profile.username)
                .await?;
            if !created.is_success() {
                warn!(reply = %created, "users.create failed");
            }
        }

        self.create_token(&profile.username).await
    }

    /// Puts the user in the course's private group, creating the group when
    /// it doesn't exist yet. Returns the last reply received.
    #[instrument(skip(self))]
    pub async fn add_to_course_group(&self, course: &str, user_id: &str) -> AppResult<Value> {
        let mut group = self.search_group(course).await?;
        if !group.is_success() {
            info!("course group missing, creating");
            group = self.create_group(course).await?;
            if !group.is_success() {
                warn!(reply = %group, "groups.create failed");
                return Ok(group);
            }
        }

        let room_id = group.get_obj_field("group")?.get_str_field("_id")?;
        self.invite_to_group(&room_id, user_id).await
    }

    pub async fn provision(&self, profile: &UserProfile) -> AppResult<Provisioned> {
        let token = self.login(profile).await?;
        if !token.is_success() {
            warn!(username = %profile.username, reply = %token, "no token issued");
            return Ok(Provisioned { token, group: None });
        }

        let user_id = token.get_obj_field("data")?.get_str_field("userId")?;
        let group = self.add_to_course_group(&profile.course, &user_id).await?;

        Ok(Provisioned { token, group: Some(group) })
    }
}
