use serde::{Deserialize, Serialize};

/// A user record as resolved by the external user directory. Directory ids
/// are treated as opaque strings; this service never persists user records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub name: String,
    pub profile_pic: String,
}
