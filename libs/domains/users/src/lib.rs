//! Users Domain
//!
//! User records, their HTTP surface and the event path that keeps
//! replicas in sync.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐        ┌──────────────────┐
//! │  Handlers   │        │ UserEventHandler │  ← HTTP endpoints / broker events
//! └──────┬──────┘        └────────┬─────────┘
//!        │                        │
//! ┌──────▼──────┐                 │
//! │   Service   │  ← validation, uniqueness, event publishing
//! └──────┬──────┘                 │
//!        │                        │
//! ┌──────▼────────────────────────▼┐
//! │           Repository           │  ← trait + in-memory and SQL implementations
//! └────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod sql;
pub mod sync;

pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    ChangePassword, CreateUser, ListParams, UpdateUser, UpsertOutcome, User, UserDeleted,
    UserEventPayload, UserResponse,
};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{EVENT_ENTITY, UserService};
pub use sql::SqlUserRepository;
pub use sync::{SyncOutcome, UserEventHandler};
