//! Teacher credential store.
//!
//! Credentials are loaded once at startup from a JSON document of the form
//! `{"teachers": [{"username": "...", "password": "..."}, ...]}`. A missing
//! file yields an empty store and every login is rejected; a structurally
//! corrupt file is a fatal startup error.
//!
//! Passwords are held and compared in plaintext to match the backing file
//! format. The comparison is isolated behind [`CredentialStore::authenticate`]
//! so a hashed scheme can replace it without touching callers.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct TeacherEntry {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TeachersFile {
    #[serde(default)]
    teachers: Vec<TeacherEntry>,
}

/// Immutable username -> password mapping for teacher logins.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    teachers: HashMap<String, String>,
}

impl CredentialStore {
    /// Load credentials from the JSON document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("credential file {} not found; starting with an empty store", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credential file {}", path.display()))?;
        let parsed: TeachersFile = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed credential file {}", path.display()))?;
        let teachers: HashMap<String, String> = parsed
            .teachers
            .into_iter()
            .map(|t| (t.username, t.password))
            .collect();
        Ok(Self { teachers })
    }

    pub fn lookup(&self, username: &str) -> Option<&str> {
        self.teachers.get(username).map(String::as_str)
    }

    /// Plaintext comparison against the stored password.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.lookup(username).map(|stored| stored == password).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.teachers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_from(json: &str) -> Result<CredentialStore> {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("teachers.json");
        std::fs::write(&path, json).unwrap();
        CredentialStore::load(&path)
    }

    #[test]
    fn missing_file_yields_empty_store() {
        let tmp = tempdir().unwrap();
        let store = CredentialStore::load(tmp.path().join("teachers.json")).unwrap();
        assert!(store.is_empty());
        assert!(!store.authenticate("anyone", "anything"));
    }

    #[test]
    fn load_and_lookup() {
        let store = store_from(
            r#"{"teachers":[{"username":"mrodriguez","password":"art123"},{"username":"jsmith","password":"chess456"}]}"#,
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup("mrodriguez"), Some("art123"));
        assert_eq!(store.lookup("nobody"), None);
    }

    #[test]
    fn authenticate_is_exact_match() {
        let store = store_from(r#"{"teachers":[{"username":"mrodriguez","password":"art123"}]}"#).unwrap();
        assert!(store.authenticate("mrodriguez", "art123"));
        assert!(!store.authenticate("mrodriguez", "art124"));
        assert!(!store.authenticate("unknown", "art123"));
    }

    #[test]
    fn missing_teachers_key_is_tolerated() {
        let store = store_from("{}").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_is_fatal() {
        assert!(store_from("{not json").is_err());
    }
}
