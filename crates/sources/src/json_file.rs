//! JSON fixture source: serves recorded users from a single file.
//!
//! The file lists users, each reachable through a session token:
//!
//! ```json
//! { "users": [ { "token": "demo", "profile": { "name": "Maya" }, "legacy_facts": ["..."] } ] }
//! ```
//!
//! Every [`UserRecord`] field is optional. A missing `user_id` gets a fresh
//! random id.

use kindred_core::error::SourceError;
use kindred_core::user::UserId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::in_memory::InMemorySource;
use crate::record::UserRecord;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub users: Vec<FixtureUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureUser {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub record: UserRecord,
}

impl FixtureFile {
    pub fn parse(content: &str) -> Result<Self, SourceError> {
        serde_json::from_str(content)
            .map_err(|e| SourceError::Decode(format!("invalid fixture JSON: {e}")))
    }

    /// Turn the fixture into a queryable source.
    pub fn into_source(self) -> InMemorySource {
        self.users
            .into_iter()
            .fold(InMemorySource::named("json_file"), |src, user| {
                let id = user.user_id.unwrap_or_default();
                src.with_user(&user.token, id, user.record)
            })
    }
}

/// Load a fixture file into an in-memory source.
pub fn load_fixture(path: &Path) -> Result<InMemorySource, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SourceError::Decode(format!("failed to read fixture {}: {e}", path.display()))
    })?;
    let fixture = FixtureFile::parse(&content)?;
    debug!(path = %path.display(), users = fixture.users.len(), "Fixture source loaded");
    Ok(fixture.into_source())
}
