//! Core container implementation for Khazin.

pub mod container;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod global;
pub mod instance;
pub mod key;
pub mod lifetime;
mod plan;
pub mod provider;
mod registry;
mod resolver;

pub use container::{Container, ContainerBuilder, ContainerOptions, prelude};
pub use descriptor::{Arguments, Injectable, TypeDescriptor};
pub use discovery::{Discoverable, catalog};
#[cfg(feature = "async")]
pub use discovery::{Discover, SourceTreeDiscovery};
pub use error::{ContainerError, Result};
pub use global::global;
pub use instance::Instance;
pub use key::{DependencyKey, normalize};
pub use lifetime::Lifetime;
pub use provider::Provider;
pub use registry::{FactoryFn, Resolver};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
