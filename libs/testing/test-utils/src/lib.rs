//! Shared test utilities for the users crates
//!
//! - `TestDatabase`: migrated SQLite (in-memory) or PostgreSQL (container) database
//! - `TestDataBuilder`: deterministic test data generation
//! - `assertions`: custom assertion helpers
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_repository_test() {
//!     let db = TestDatabase::sqlite().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let email = builder.email("main");
//!     let username = builder.username("main");
//! }
//! ```

mod database;

pub use database::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_user");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Positive id derived from the seed, for rows inserted with an explicit key
    pub fn user_id(&self) -> i32 {
        (self.seed % 1_000_000) as i32 + 1000
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(42);
    /// assert_eq!(builder.name("user", "main"), "test-user-42-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Username that passes the minimum length rule
    pub fn username(&self, suffix: &str) -> String {
        format!("user_{}_{}", self.seed % 100_000, suffix)
    }

    pub fn email(&self, suffix: &str) -> String {
        format!("{}.{}@example.com", suffix, self.seed % 100_000)
    }
}

/// Test assertion helpers
pub mod assertions {
    use serde_json::Value;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that a serialized user carries no password field
    pub fn assert_no_password(value: &Value, context: &str) {
        let object = value
            .as_object()
            .unwrap_or_else(|| panic!("{}: expected a JSON object, got {}", context, value));

        for key in ["hashed_password", "password"] {
            assert!(
                !object.contains_key(key),
                "{}: unexpected '{}' field in {}",
                context,
                key,
                value
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.user_id(), builder2.user_id());
        assert_eq!(builder1.email("a"), builder2.email("a"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.username("x"), builder2.username("x"));
    }

    #[test]
    fn test_data_builder_values_are_valid() {
        let builder = TestDataBuilder::from_test_name("valid");
        assert!(builder.user_id() > 0);
        assert!(builder.username("a").len() >= 3);
        assert!(builder.email("a").contains('@'));
    }

    #[test]
    #[should_panic(expected = "hashed_password")]
    fn test_assert_no_password_rejects_password() {
        assertions::assert_no_password(
            &serde_json::json!({"id": 1, "hashed_password": "x"}),
            "user",
        );
    }
}
