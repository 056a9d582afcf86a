use serde::{Deserialize, Serialize};

use super::RecordId;

/// Registered user as listed by `GET /admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: RecordId,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Body of `PUT /admin/users/{id}`. An empty password leaves it unchanged
/// on the backend.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub password: String,
}
