//! # Khazin: a name-based IoC container for Rust
//!
//! Types declare their constructor parameters by name; the container
//! resolves each parameter against its bindings, recursively, applying
//! each binding's lifetime (transient, singleton or pre-built instance).
//!
//! ```rust
//! use khazin::{Container, Injectable};
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! struct Clock;
//!
//! #[derive(Injectable)]
//! struct Greeter {
//!     clock: Arc<Clock>,
//! }
//!
//! let container = Container::new();
//! container.singleton(Clock::descriptor()).unwrap();
//! container.register(Greeter::descriptor()).unwrap();
//!
//! let greeter: Arc<Greeter> = container.get("greeter").unwrap();
//! assert!(Arc::ptr_eq(&greeter.clock, &container.get::<Clock>("clock").unwrap()));
//! ```

pub use khazin_container::*;
pub use khazin_derive::*;
pub use khazin_support::*;
