use std::sync::Arc;

use khazin::{Container, Injectable, Provider, Result};

use super::contracts::UserRepository;
use super::mock_user_repository::MockUserRepository;
use super::singleton_test::SingletonTest;

/// Contract bindings the application makes before autoloading.
pub struct Dependencies;

impl Provider for Dependencies {
    fn register(&self, container: &Container) -> Result<()> {
        container.bind(
            "UserRepository",
            MockUserRepository::descriptor()
                .expose(|repo: Arc<MockUserRepository>| repo as Arc<dyn UserRepository>),
        );
        container.singleton(SingletonTest::descriptor())
    }
}
