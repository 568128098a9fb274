//! User repository for JSON storage
//!
//! Manages loading and saving staff users to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::PastificioError;
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), PastificioError> {
        let file_data: UserData = read_json(&self.path)?;
        self.replace_all(file_data.users)
    }

    pub fn save(&self) -> Result<(), PastificioError> {
        let users = self.get_all()?;
        write_json_atomic(&self.path, &UserData { users })
    }

    /// Get all users, by username
    pub fn get_all(&self) -> Result<Vec<User>, PastificioError> {
        let data = self.data.read().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));
        Ok(users)
    }

    pub fn upsert(&self, user: User) -> Result<(), PastificioError> {
        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(user.id, user);
        Ok(())
    }

    pub fn replace_all(&self, users: Vec<User>) -> Result<(), PastificioError> {
        let mut data = self.data.write().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for user in users {
            data.insert(user.id, user);
        }
        Ok(())
    }

    pub fn count(&self) -> Result<usize, PastificioError> {
        let data = self.data.read().map_err(|e| {
            PastificioError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.len())
    }
}
