use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::user::DirectoryUser;
use crate::error::{AppError, AppResult};
use crate::infra::sqlite::{SqliteTicketStore, migrate};
use crate::services::UserDirectoryService;

/// In-memory stand-in for the user directory, keyed by email.
#[derive(Default, Clone)]
pub struct StubDirectory {
    by_email: HashMap<String, DirectoryUser>,
}

impl StubDirectory {
    pub fn with_user(mut self, email: &str, id: &str, name: &str) -> Self {
        self.by_email.insert(
            email.to_string(),
            DirectoryUser {
                id: id.to_string(),
                name: name.to_string(),
                profile_pic: format!("https://pics.test/{id}.png"),
            },
        );
        self
    }
}

#[async_trait]
impl UserDirectoryService for StubDirectory {
    async fn get_user_by_email(&self, email: &str) -> AppResult<DirectoryUser> {
        self.by_email
            .get(email)
            .cloned()
            .ok_or_else(|| AppError::Directory(format!("no user for email {email}")))
    }

    async fn get_user_by_user_id(&self, user_id: &str) -> AppResult<DirectoryUser> {
        self.by_email
            .values()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::Directory(format!("no user for id {user_id}")))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        database_path: ":memory:".to_string(),
        directory_base_url: "http://directory.test".to_string(),
        directory_timeout: Duration::from_secs(1),
    }
}

pub async fn test_context(directory: StubDirectory) -> AppContext {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    AppContext::new(
        test_config(),
        Arc::new(SqliteTicketStore::new(pool)),
        Arc::new(directory),
    )
}
