use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{CreateUser, UpdateUser, UpsertOutcome, User, UserEventPayload},
    repository::UserRepository,
};

/// SeaORM-backed repository; works on any backend the connection points at.
#[derive(Clone)]
pub struct SqlUserRepository {
    db: DatabaseConnection,
}

impl SqlUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Largest page bound the drivers accept; SQL binds LIMIT/OFFSET as i64.
const MAX_PAGE_BOUND: u64 = i64::MAX as u64;

/// Move the id sequence past rows inserted with explicit ids.
async fn sync_id_sequence<C: ConnectionTrait>(conn: &C) -> UserResult<()> {
    if conn.get_database_backend() == DatabaseBackend::Postgres {
        conn.execute_unprepared(
            "SELECT setval(pg_get_serial_sequence('users', 'id'), \
             GREATEST((SELECT MAX(id) FROM users), 1))",
        )
        .await?;
    }
    Ok(())
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .limit(limit.min(MAX_PAGE_BOUND))
            .offset(offset.min(MAX_PAGE_BOUND))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i32, input: UpdateUser) -> UserResult<User> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active_model = model.into_active_model();
        if let Some(username) = input.username {
            active_model.username = Set(username);
        }
        if let Some(email) = input.email {
            active_model.email = Set(email);
        }
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(surname) = input.surname {
            active_model.surname = Set(surname);
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(&self.db).await?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(updated.into())
    }

    async fn set_password(&self, id: i32, hashed_password: String) -> UserResult<User> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active_model = model.into_active_model();
        active_model.hashed_password = Set(hashed_password);
        active_model.updated_at = Set(Utc::now());

        Ok(active_model.update(&self.db).await?.into())
    }

    async fn delete(&self, id: i32) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
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
        let txn = self.db.begin().await?;

        let outcome = match entity::Entity::find_by_id(id).one(&txn).await? {
            Some(model) => {
                let mut active_model = model.into_active_model();
                active_model.merge_event(payload);
                active_model.update(&txn).await?;
                UpsertOutcome::Updated
            }
            None => {
                entity::ActiveModel::from_event(id, payload)
                    .insert(&txn)
                    .await?;
                sync_id_sequence(&txn).await?;
                UpsertOutcome::Inserted
            }
        };

        txn.commit().await?;
        Ok(outcome)
    }
}
