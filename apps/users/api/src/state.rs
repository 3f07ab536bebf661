//! Shared application state.

use domain_users::{SqlUserRepository, UserService};
use messaging::{EventPublisher, MessageBroker};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;

/// State handed to routers; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    /// Present when a broker was reachable at startup
    pub broker: Option<Arc<dyn MessageBroker>>,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection) -> Self {
        Self {
            config,
            db,
            broker: None,
        }
    }

    pub fn with_broker(mut self, broker: Arc<dyn MessageBroker>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Publisher for user events, if a broker is attached
    pub fn publisher(&self) -> Option<EventPublisher> {
        self.broker.as_ref().map(|broker| {
            EventPublisher::new(
                broker.clone(),
                self.config.broker.exchange.clone(),
                self.config.app.name.clone(),
            )
        })
    }

    pub fn user_service(&self) -> UserService<SqlUserRepository> {
        let service = UserService::new(SqlUserRepository::new(self.db.clone()));
        match self.publisher() {
            Some(publisher) => service.with_publisher(publisher),
            None => service,
        }
    }
}
