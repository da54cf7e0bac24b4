use khazin::Injectable;

use super::contracts::{User, UserRepository};

#[derive(Injectable)]
pub struct MockUserRepository;

impl UserRepository for MockUserRepository {
    fn all(&self) -> Vec<User> {
        vec![User::new(0, "Jon Snow"), User::new(1, "Daenerys Targaryen")]
    }
}
