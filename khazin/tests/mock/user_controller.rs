use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use khazin::Injectable;

use super::contracts::User;
use super::user_service::UserService;

#[derive(Debug)]
pub struct Body {
    pub users: Vec<User>,
}

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub body: Body,
}

#[derive(Injectable)]
pub struct UserController {
    user_service: Arc<UserService>,
    #[inject(default)]
    served: AtomicU64,
}

impl UserController {
    pub fn all(&self) -> Response {
        self.served.fetch_add(1, Ordering::Relaxed);
        Response {
            status: 200,
            body: Body {
                users: self.user_service.all(),
            },
        }
    }

    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }
}
