//! Provider trait: a module of related bindings.
//!
//! Providers group registrations by concern, so application setup reads
//! as a list of modules instead of one long block.
//!
//! # Examples
//! ```rust,ignore
//! struct RepositoryProvider;
//!
//! impl Provider for RepositoryProvider {
//!     fn register(&self, container: &Container) -> Result<()> {
//!         container.bind(
//!             "UserRepository",
//!             PostgresUserRepository::descriptor()
//!                 .expose(|repo: Arc<PostgresUserRepository>| repo as Arc<dyn UserRepository>),
//!         );
//!         container.singleton(ConnectionPool::descriptor())
//!     }
//! }
//!
//! let container = Container::builder()
//!     .add_provider(RepositoryProvider)
//!     .build()?;
//! ```

use crate::container::Container;
use crate::error::Result;

/// A module that registers related bindings into a container.
pub trait Provider: Send + Sync {
    /// Adds this module's bindings.
    ///
    /// Runs once per container, either from
    /// [`ContainerBuilder::build`](crate::container::ContainerBuilder::build)
    /// or [`Container::add_provider`].
    fn register(&self, container: &Container) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Arguments, Injectable};
    use crate::error::ContainerError;
    use std::sync::Arc;

    struct Pool;

    impl Injectable for Pool {
        const NAME: &'static str = "ConnectionPool";
        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Pool)
        }
    }

    struct StorageProvider;

    impl Provider for StorageProvider {
        fn register(&self, container: &Container) -> Result<()> {
            container.instance("database_url", Arc::new(String::from("postgres://localhost")));
            container.singleton(Pool::descriptor())
        }
    }

    struct NamedProvider;

    impl Provider for NamedProvider {
        fn register(&self, _: &Container) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "named"
        }
    }

    #[test]
    fn provider_registers_into_builder() {
        let container = Container::builder()
            .add_provider(StorageProvider)
            .build()
            .unwrap();

        assert!(container.has("connection_pool"));
        assert!(container.has("DatabaseUrl"));
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn provider_added_later() {
        let container = Container::new();
        container.add_provider(&StorageProvider).unwrap();
        assert!(container.get::<Pool>("ConnectionPool").is_ok());
    }

    #[test]
    fn provider_error_fails_build() {
        let result = Container::builder()
            .add_provider(StorageProvider)
            .add_provider(StorageProvider)
            .build();

        assert!(matches!(result, Err(ContainerError::DuplicateBinding(_))));
    }

    #[test]
    fn provider_name_defaults_to_type() {
        assert!(StorageProvider.name().ends_with("StorageProvider"));
        assert_eq!(NamedProvider.name(), "named");
    }
}
