use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, UpsertOutcome, User, UserEventPayload};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with a store-assigned id
    async fn create(&self, input: CreateUser) -> UserResult<User>;

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Page of users ordered by ascending id
    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>>;

    /// Apply a partial update; `NotFound` when the id is absent
    async fn update(&self, id: i32, input: UpdateUser) -> UserResult<User>;

    /// Overwrite the stored password; `NotFound` when the id is absent
    async fn set_password(&self, id: i32, hashed_password: String) -> UserResult<User>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i32) -> UserResult<bool>;

    /// Insert the user with its producer id, or merge the present fields
    /// into the existing row
    async fn upsert_from_event(
        &self,
        id: i32,
        payload: UserEventPayload,
    ) -> UserResult<UpsertOutcome>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<i32, User>>>,
    last_id: Arc<AtomicI32>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_unique<'a>(
    mut users: impl Iterator<Item = &'a User>,
    id: Option<i32>,
    username: Option<&str>,
    email: Option<&str>,
) -> UserResult<()> {
    // Empty values are placeholders on replicated rows and never clash.
    let username = username.filter(|u| !u.is_empty());
    let email = email.filter(|e| !e.is_empty());

    if let Some(clash) = users.find(|u| {
        Some(u.id) != id
            && (username == Some(u.username.as_str()) || email == Some(u.email.as_str()))
    }) {
        return Err(if email == Some(clash.email.as_str()) {
            UserError::DuplicateEmail(clash.email.clone())
        } else {
            UserError::DuplicateUsername(clash.username.clone())
        });
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        ensure_unique(
            users.values(),
            None,
            Some(&input.username),
            Some(&input.email),
        )?;

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let user = User {
            id,
            username: input.username,
            email: input.email,
            name: input.name,
            surname: input.surname,
            hashed_password: input.hashed_password,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, input: UpdateUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        ensure_unique(
            users.values(),
            Some(id),
            input.username.as_deref(),
            input.email.as_deref(),
        )?;

        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        user.apply_update(input);

        tracing::info!(user_id = %id, "Updated user");
        Ok(user.clone())
    }

    async fn set_password(&self, id: i32, hashed_password: String) -> UserResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        user.hashed_password = hashed_password;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: i32) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn upsert_from_event(
        &self,
        id: i32,
        payload: UserEventPayload,
    ) -> UserResult<UpsertOutcome> {
        let mut users = self.users.write().await;

        ensure_unique(
            users.values(),
            Some(id),
            payload.username.as_deref(),
            payload.email.as_deref(),
        )?;

        if let Some(user) = users.get_mut(&id) {
            user.merge_event(payload);
            return Ok(UpsertOutcome::Updated);
        }

        self.last_id.fetch_max(id, Ordering::SeqCst);
        let now = Utc::now();
        users.insert(
            id,
            User {
                id,
                username: payload.username.unwrap_or_default(),
                email: payload.email.unwrap_or_default(),
                name: payload.name.unwrap_or_default(),
                surname: payload.surname.unwrap_or_default(),
                hashed_password: String::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(UpsertOutcome::Inserted)
    }
}
