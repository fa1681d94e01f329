//! Identity directory

use std::collections::HashMap;
use std::path::Path;

use crate::document::UserIdentity;
use crate::types::{PrepareError, Result};

/// Trait for resolving usernames to people
#[async_trait::async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Look up a person by user id. `None` when the directory has no entry.
    async fn lookup(&self, user_id: &str) -> Option<UserIdentity>;
}

/// Fixed set of people, optionally loaded from a JSON array
#[derive(Debug, Default)]
pub struct StaticDirectory {
    people: HashMap<String, UserIdentity>,
}

impl StaticDirectory {
    pub fn new(people: impl IntoIterator<Item = UserIdentity>) -> Self {
        Self {
            people: people.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Load a JSON array of `{ "id", "first_name", "last_name" }` objects
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PrepareError::Config(format!("Cannot read users file {}: {}", path.display(), e))
        })?;
        let people: Vec<UserIdentity> = serde_json::from_str(&raw).map_err(|e| {
            PrepareError::Config(format!("Invalid users file {}: {}", path.display(), e))
        })?;
        Ok(Self::new(people))
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for StaticDirectory {
    async fn lookup(&self, user_id: &str) -> Option<UserIdentity> {
        self.people.get(user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup() {
        let directory = StaticDirectory::new([UserIdentity {
            id: "jdoe".into(),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
        }]);

        let person = directory.lookup("jdoe").await.unwrap();
        assert_eq!(person.display_name(), "Jane Doe");
        assert!(directory.lookup("ghost").await.is_none());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"[{"id": "admin"}, {"id": "jdoe", "first_name": "Jane", "last_name": "Doe"}]"#,
        )
        .unwrap();

        let directory = StaticDirectory::from_json_file(&path).unwrap();
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_from_bad_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = StaticDirectory::from_json_file(&path).unwrap_err();
        assert!(matches!(err, PrepareError::Config(_)));
    }
}
