use std::fmt;
use std::sync::Arc;

use khazin::Injectable;

use super::contracts::{User, UserRepository};
use super::singleton_test::SingletonTest;

#[derive(Injectable)]
pub struct UserService {
    pub user_repository: Arc<dyn UserRepository>,
    /// Only set when composed by hand.
    #[inject(default)]
    pub singleton_test: Option<Arc<SingletonTest>>,
}

impl UserService {
    pub fn with_singleton(user_repository: Arc<dyn UserRepository>, singleton_test: Arc<SingletonTest>) -> Self {
        Self {
            user_repository,
            singleton_test: Some(singleton_test),
        }
    }

    pub fn all(&self) -> Vec<User> {
        self.user_repository.all()
    }
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService")
            .field("singleton_test", &self.singleton_test)
            .finish_non_exhaustive()
    }
}
