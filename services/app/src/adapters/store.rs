//! services/app/src/adapters/store.rs
//!
//! This module contains the on-disk store adapter, the concrete
//! implementation of the `ChallengeStore` port from the `core` crate. One
//! JSON document per logical key under a root directory, mirroring a
//! browser-local key-value store: reads are permissive (missing or corrupt
//! data yields the empty value) and write failures are absorbed.

use std::fs;
use std::path::{Path, PathBuf};

use briefcraft_core::domain::{Project, User};
use briefcraft_core::ports::ChallengeStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

const USERS_KEY: &str = "users_db";
const SESSION_KEY: &str = "session";
const PROJECTS_PREFIX: &str = "projects_";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed adapter that implements the `ChallengeStore` port.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a new `FileStore` rooted at `root`. The directory is created
    /// lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Emails become part of a file name; anything the filesystem might
    /// object to is flattened to '_'.
    fn projects_key(email: &str) -> String {
        let sanitized: String = email
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '+' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", PROJECTS_PREFIX, sanitized)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = fs::read_to_string(self.key_path(key)).ok()?;
        match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding corrupt store entry");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = fs::create_dir_all(&self.root) {
            warn!(error = %e, "could not create store directory");
            return;
        }
        let data = match serde_json::to_string_pretty(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "could not serialize store entry");
                return;
            }
        };
        if let Err(e) = fs::write(self.key_path(key), data) {
            warn!(key, error = %e, "store write failed");
        }
    }
}

//=========================================================================================
// `ChallengeStore` Trait Implementation
//=========================================================================================

impl ChallengeStore for FileStore {
    fn registered_users(&self) -> Vec<User> {
        self.read_json(USERS_KEY).unwrap_or_default()
    }

    fn register_user(&self, user: User) -> User {
        let mut users = self.registered_users();
        if let Some(existing) = users.iter().find(|u| u.email == user.email) {
            return existing.clone();
        }
        users.push(user.clone());
        self.write_json(USERS_KEY, &users);
        user
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.registered_users()
            .into_iter()
            .find(|u| u.email == email)
    }

    fn save_session(&self, user: &User) {
        self.write_json(SESSION_KEY, user);
    }

    fn session(&self) -> Option<User> {
        self.read_json(SESSION_KEY)
    }

    fn clear_session(&self) {
        match fs::remove_file(self.key_path(SESSION_KEY)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, "could not clear session"),
        }
    }

    fn projects_for(&self, email: &str) -> Vec<Project> {
        self.read_json(&Self::projects_key(email)).unwrap_or_default()
    }

    fn save_projects_for(&self, email: &str, projects: &[Project]) {
        self.write_json(&Self::projects_key(email), &projects);
    }
}
