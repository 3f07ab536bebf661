use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{CreateUser, User, UserEventPayload};

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique when non-empty
    pub username: String,
    /// Unique when non-empty
    pub email: String,
    pub name: String,
    pub surname: String,
    pub hashed_password: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// OpenAPI tag for the users endpoints
    pub const TAG: &'static str = "users";
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            name: model.name,
            surname: model.surname,
            hashed_password: model.hashed_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<CreateUser> for ActiveModel {
    fn from(input: CreateUser) -> Self {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            username: Set(input.username),
            email: Set(input.email),
            name: Set(input.name),
            surname: Set(input.surname),
            hashed_password: Set(input.hashed_password),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

impl ActiveModel {
    /// Row for a user first seen through an event; the id comes from the producer.
    pub fn from_event(id: i32, payload: UserEventPayload) -> Self {
        let now = Utc::now();
        ActiveModel {
            id: Set(id),
            username: Set(payload.username.unwrap_or_default()),
            email: Set(payload.email.unwrap_or_default()),
            name: Set(payload.name.unwrap_or_default()),
            surname: Set(payload.surname.unwrap_or_default()),
            hashed_password: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    /// Overwrite only the fields present in the event.
    pub fn merge_event(&mut self, payload: UserEventPayload) {
        if let Some(username) = payload.username {
            self.username = Set(username);
        }
        if let Some(email) = payload.email {
            self.email = Set(email);
        }
        if let Some(name) = payload.name {
            self.name = Set(name);
        }
        if let Some(surname) = payload.surname {
            self.surname = Set(surname);
        }
        self.updated_at = Set(Utc::now());
    }
}
