use std::time::Instant;

use khazin::Injectable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAt(pub Instant);

impl Default for CreatedAt {
    fn default() -> Self {
        CreatedAt(Instant::now())
    }
}

#[derive(Debug, Injectable)]
pub struct SingletonTest {
    #[inject(default)]
    pub created_at: CreatedAt,
}
