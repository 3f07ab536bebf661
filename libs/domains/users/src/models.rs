use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// User record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    /// Opaque credential, never exposed in responses or events
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as returned by the API and carried in events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            surname: user.surname,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "username": "admin",
    "email": "gaga@gaga.com",
    "name": "gaga",
    "surname": "gagoso",
    "hashed_password": "admin"
}))]
pub struct CreateUser {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(contains(pattern = "@", message = "email must contain '@'"))]
    pub email: String,
    pub name: String,
    pub surname: String,
    pub hashed_password: String,
}

/// DTO for a partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: Option<String>,
    #[validate(contains(pattern = "@", message = "email must contain '@'"))]
    pub email: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    pub user_id: i32,
    pub old_password: String,
    #[validate(length(min = 1, message = "new_password must not be empty"))]
    pub new_password: String,
}

/// Pagination for listing users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of users to return
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of users to skip
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// User fields as received from an event; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserEventPayload {
    pub id: Option<i32>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
}

/// Body of a delete event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeleted {
    pub id: i32,
}

/// What an event upsert did to the local store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl User {
    /// Apply the fields present in `update`
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(surname) = update.surname {
            self.surname = surname;
        }
        self.updated_at = Utc::now();
    }

    /// Apply the fields present in an event payload
    pub fn merge_event(&mut self, payload: UserEventPayload) {
        self.apply_update(UpdateUser {
            username: payload.username,
            email: payload.email,
            name: payload.name,
            surname: payload.surname,
        });
    }
}
