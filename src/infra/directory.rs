use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::user::DirectoryUser;
use crate::error::{AppError, AppResult};
use crate::services::UserDirectoryService;

/// HTTP/JSON client for the user-directory service. One request per lookup,
/// bounded by the configured timeout; directory unavailability surfaces as an
/// error, never as a silent default.
pub struct HttpUserDirectory {
    http: Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(base_url: String, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|err| {
            AppError::Configuration(format!("failed to build directory client: {err}"))
        })?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn fetch_user(&self, url: String, query: &[(&str, &str)]) -> AppResult<DirectoryUser> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| AppError::Directory(format!("failed to call user directory: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Directory(format!(
                "user directory responded with {status}: {body}"
            )));
        }

        let payload: UserLookupResponse = response.json().await.map_err(|err| {
            AppError::Directory(format!("failed to parse directory response: {err}"))
        })?;

        Ok(DirectoryUser {
            id: payload.user.id,
            name: payload.user.name,
            profile_pic: payload.user.profile_pic,
        })
    }
}

#[async_trait]
impl UserDirectoryService for HttpUserDirectory {
    async fn get_user_by_email(&self, email: &str) -> AppResult<DirectoryUser> {
        self.fetch_user(self.endpoint("users/by-email"), &[("email", email)])
            .await
    }

    async fn get_user_by_user_id(&self, user_id: &str) -> AppResult<DirectoryUser> {
        self.fetch_user(self.endpoint(&format!("users/{user_id}")), &[])
            .await
    }
}

#[derive(Deserialize)]
struct UserLookupResponse {
    user: UserPayload,
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    name: String,
    #[serde(default)]
    profile_pic: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_handles_trailing_slash() {
        let directory =
            HttpUserDirectory::new("http://directory:9000/".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            directory.endpoint("users/by-email"),
            "http://directory:9000/users/by-email"
        );
    }

    #[test]
    fn parses_lookup_payload() {
        let payload: UserLookupResponse = serde_json::from_str(
            r#"{"user": {"id": "u-1", "name": "Alice", "profile_pic": "https://pics/u-1.png"}}"#,
        )
        .unwrap();
        assert_eq!(payload.user.id, "u-1");
        assert_eq!(payload.user.name, "Alice");
    }

    #[test]
    fn profile_pic_defaults_to_empty() {
        let payload: UserLookupResponse =
            serde_json::from_str(r#"{"user": {"id": "u-1", "name": "Alice"}}"#).unwrap();
        assert_eq!(payload.user.profile_pic, "");
    }
}
