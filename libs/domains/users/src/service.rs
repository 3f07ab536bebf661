use messaging::{EventPublisher, Operation};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    ChangePassword, CreateUser, ListParams, UpdateUser, User, UserDeleted, UserResponse,
};
use crate::repository::UserRepository;

/// Entity segment of the routing key, e.g. `user.create`
pub const EVENT_ENTITY: &str = "user";

/// Service layer for User business logic
///
/// Mutations publish a lifecycle event after the write has been committed.
/// Publishing is best-effort and never fails the mutation.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    publisher: Option<EventPublisher>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: EventPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    async fn emit<T: Serialize + Send + Sync>(&self, operation: Operation, payload: &T) {
        if let Some(publisher) = &self.publisher {
            publisher
                .publish(&operation.routing_key(EVENT_ENTITY), operation, payload)
                .await;
        }
    }

    /// Reject an email or username already held by another user.
    async fn ensure_available(
        &self,
        id: Option<i32>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> UserResult<()> {
        if let Some(email) = email {
            if let Some(existing) = self.repository.get_by_email(email).await? {
                if Some(existing.id) != id {
                    return Err(UserError::DuplicateEmail(email.to_string()));
                }
            }
        }
        if let Some(username) = username {
            if let Some(existing) = self.repository.get_by_username(username).await? {
                if Some(existing.id) != id {
                    return Err(UserError::DuplicateUsername(username.to_string()));
                }
            }
        }
        Ok(())
    }

    pub async fn list_users(&self, params: ListParams) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list(params.limit, params.offset).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn get_user(&self, id: i32) -> UserResult<UserResponse> {
        self.repository
            .get_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        input.validate()?;
        self.ensure_available(None, Some(&input.username), Some(&input.email))
            .await?;

        let created: UserResponse = self.repository.create(input).await?.into();
        self.emit(Operation::Create, &created).await;
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i32, input: UpdateUser) -> UserResult<UserResponse> {
        input.validate()?;

        let current = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let changed_username = input
            .username
            .as_deref()
            .filter(|u| *u != current.username);
        let changed_email = input.email.as_deref().filter(|e| *e != current.email);
        self.ensure_available(Some(id), changed_username, changed_email)
            .await?;

        let updated: UserResponse = self.repository.update(id, input).await?.into();
        self.emit(Operation::Update, &updated).await;
        Ok(updated)
    }

    /// Replace the password when `old_password` equals the stored value.
    ///
    /// Passwords are compared as stored, without hashing.
    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    pub async fn change_password(&self, input: ChangePassword) -> UserResult<()> {
        let user: User = self
            .repository
            .get_by_id(input.user_id)
            .await?
            .ok_or(UserError::NotFound(input.user_id))?;

        if user.hashed_password != input.old_password {
            return Err(UserError::PasswordMismatch);
        }

        let updated: UserResponse = self
            .repository
            .set_password(input.user_id, input.new_password)
            .await?
            .into();
        self.emit(Operation::Update, &updated).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        self.emit(Operation::Delete, &UserDeleted { id }).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use messaging::{InMemoryBroker, MessageBroker};
    use serde_json::Value;

    fn create_input(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            name: "gaga".to_string(),
            surname: "gagoso".to_string(),
            hashed_password: "admin".to_string(),
        }
    }

    fn service_with_broker() -> (UserService<InMemoryUserRepository>, Arc<InMemoryBroker>) {
        let broker = Arc::new(InMemoryBroker::new());
        let publisher = EventPublisher::new(
            broker.clone() as Arc<dyn MessageBroker>,
            "user.events",
            "users",
        );
        let service = UserService::new(InMemoryUserRepository::new()).with_publisher(publisher);
        (service, broker)
    }

    fn event_bodies(broker: &InMemoryBroker) -> Vec<(String, Value)> {
        broker
            .published()
            .into_iter()
            .map(|m| {
                let body: Value = serde_json::from_slice(&m.payload).unwrap();
                (m.subject, body)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_create_rejects_short_username_and_bad_email() {
        let service = UserService::new(InMemoryUserRepository::new());

        let result = service.create_user(create_input("ab", "ok@example.com")).await;
        assert!(matches!(result, Err(UserError::Validation(_))));

        let result = service.create_user(create_input("abc", "no-at-sign")).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let service = UserService::new(InMemoryUserRepository::new());
        service
            .create_user(create_input("admin", "gaga@gaga.com"))
            .await
            .unwrap();

        let result = service
            .create_user(create_input("another", "gaga@gaga.com"))
            .await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_invalid_update_never_touches_repository() {
        // No expectations: any repository call panics.
        let service = UserService::new(MockUserRepository::new());

        let result = service
            .update_user(
                1,
                UpdateUser {
                    username: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user_performs_no_write() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let service = UserService::new(repo);
        let result = service
            .update_user(
                99,
                UpdateUser {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_partial_update_changes_named_fields_only() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service
            .create_user(create_input("admin", "gaga@gaga.com"))
            .await
            .unwrap();

        let updated = service
            .update_user(
                created.id,
                UpdateUser {
                    surname: Some("Germanotta".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.surname, "Germanotta");
        assert_eq!(updated.username, created.username);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.name, created.name);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let service = UserService::new(InMemoryUserRepository::new());
        service
            .create_user(create_input("first", "first@example.com"))
            .await
            .unwrap();
        let second = service
            .create_user(create_input("second", "second@example.com"))
            .await
            .unwrap();

        let result = service
            .update_user(
                second.id,
                UpdateUser {
                    email: Some("first@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

        // Re-sending the user's own email is not a conflict.
        let result = service
            .update_user(
                second.id,
                UpdateUser {
                    email: Some("second@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_requires_matching_old_value() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service
            .create_user(create_input("admin", "gaga@gaga.com"))
            .await
            .unwrap();

        let change = |old: &str, new: &str| ChangePassword {
            user_id: created.id,
            old_password: old.to_string(),
            new_password: new.to_string(),
        };

        let result = service.change_password(change("wrong", "next")).await;
        assert!(matches!(result, Err(UserError::PasswordMismatch)));

        service.change_password(change("admin", "next")).await.unwrap();
        let stored = service
            .repository()
            .get_by_id(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.hashed_password, "next");

        let result = service.change_password(change("admin", "again")).await;
        assert!(matches!(result, Err(UserError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_change_password_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_set_password().never();

        let service = UserService::new(repo);
        let result = service
            .change_password(ChangePassword {
                user_id: 5,
                old_password: "a".to_string(),
                new_password: "b".to_string(),
            })
            .await;
        assert!(matches!(result, Err(UserError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service
            .create_user(create_input("admin", "gaga@gaga.com"))
            .await
            .unwrap();

        service.delete_user(created.id).await.unwrap();
        assert!(matches!(
            service.get_user(created.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(created.id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_pages_in_insertion_order() {
        let service = UserService::new(InMemoryUserRepository::new());
        for i in 0..5 {
            service
                .create_user(create_input(&format!("user{}", i), &format!("u{}@example.com", i)))
                .await
                .unwrap();
        }

        let first = service
            .list_users(ListParams { limit: 3, offset: 0 })
            .await
            .unwrap();
        let second = service
            .list_users(ListParams { limit: 3, offset: 3 })
            .await
            .unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        let ids: Vec<i32> = first.iter().chain(second.iter()).map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_mutations_publish_events_without_password() {
        let (service, broker) = service_with_broker();

        let created = service
            .create_user(create_input("admin", "gaga@gaga.com"))
            .await
            .unwrap();
        service
            .update_user(
                created.id,
                UpdateUser {
                    name: Some("Stefani".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service
            .change_password(ChangePassword {
                user_id: created.id,
                old_password: "admin".to_string(),
                new_password: "s3cret".to_string(),
            })
            .await
            .unwrap();
        service.delete_user(created.id).await.unwrap();

        let events = event_bodies(&broker);
        let subjects: Vec<&str> = events.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(
            subjects,
            vec![
                "user.events.user.create",
                "user.events.user.update",
                "user.events.user.update",
                "user.events.user.delete",
            ]
        );

        let types: Vec<&str> = events
            .iter()
            .map(|(_, body)| body["type"].as_str().unwrap())
            .collect();
        assert_eq!(types, vec!["CREATE", "UPDATE", "UPDATE", "DELETE"]);

        for (_, body) in &events {
            let data = body["data"].as_object().unwrap();
            assert!(!data.contains_key("hashed_password"));
            assert_eq!(body["source"], "users");
        }

        assert_eq!(events[0].1["data"]["username"], "admin");
        assert_eq!(events[1].1["data"]["name"], "Stefani");
        assert_eq!(events[3].1["data"], serde_json::json!({"id": created.id}));
    }

    #[tokio::test]
    async fn test_broker_failure_does_not_fail_mutation() {
        let (service, broker) = service_with_broker();
        broker.set_available(false);

        let created = service
            .create_user(create_input("admin", "gaga@gaga.com"))
            .await
            .unwrap();

        assert!(service.get_user(created.id).await.is_ok());
        assert!(broker.published().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_publishes_nothing() {
        let (service, broker) = service_with_broker();

        let _ = service.delete_user(404).await;
        let _ = service.create_user(create_input("ab", "bad")).await;

        assert!(broker.published().is_empty());
    }
}
