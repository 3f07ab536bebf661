//! Typed HTTP client for the users API.
//!
//! ```rust,no_run
//! use users_client::{ClientConfig, UsersClient};
//!
//! # async fn run() -> Result<(), users_client::ClientError> {
//! let client = UsersClient::new(ClientConfig::new("http://localhost:8000"))?;
//! let user = client.get_user(1).await?;
//! println!("{}", user.username);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::UsersClient;
pub use config::{ClientConfig, DEFAULT_API_PREFIX, DEFAULT_USERS_SERVICE_URL};
pub use error::{ClientError, ClientResult};

pub use domain_users::{ChangePassword, CreateUser, ListParams, UpdateUser, UserResponse};
