use crate::db::models::{NewUser, User};
use crate::db::operations::UserStore;
use crate::error::DatabaseError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store keyed by email. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        // Check and insert under the same write guard
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(DatabaseError::Duplicate);
        }
        let user = User::from_new(new_user);
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}
