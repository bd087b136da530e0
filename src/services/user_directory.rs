use async_trait::async_trait;

use crate::domain::user::DirectoryUser;
use crate::error::AppResult;

/// The external service of record for user identity. Lookups are synchronous
/// remote calls; failures propagate unchanged with no retry and no caching.
#[async_trait]
pub trait UserDirectoryService: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> AppResult<DirectoryUser>;
    async fn get_user_by_user_id(&self, user_id: &str) -> AppResult<DirectoryUser>;
}
