//! # The Container: heart of Khazin
//!
//! A registry of named bindings that builds object graphs on demand,
//! supplying each constructor's dependencies by parameter name.
//!
//! # Architecture
//! ```text
//! register / bind / singleton / instance / bind_factory
//!                     │
//!                     ▼
//!                 Registry ──get(name)──> Planner ──> materialize ──> value
//! ```
//!
//! # Examples
//! ```rust
//! use khazin_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Clock;
//!
//! struct Greeter {
//!     clock: Arc<Clock>,
//! }
//!
//! impl Injectable for Clock {
//!     const NAME: &'static str = "Clock";
//!     fn construct(_: &mut Arguments) -> Result<Self> {
//!         Ok(Clock)
//!     }
//! }
//!
//! impl Injectable for Greeter {
//!     const NAME: &'static str = "Greeter";
//!     fn parameters() -> &'static [&'static str] {
//!         &["clock"]
//!     }
//!     fn construct(arguments: &mut Arguments) -> Result<Self> {
//!         Ok(Greeter { clock: arguments.next()? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.singleton(Clock::descriptor()).unwrap();
//! container.register(Greeter::descriptor()).unwrap();
//!
//! let greeter: Arc<Greeter> = container.get("greeter").unwrap();
//! let clock: Arc<Clock> = container.get("Clock").unwrap();
//! assert!(Arc::ptr_eq(&greeter.clock, &clock));
//! ```

use std::any::type_name;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use khazin_support::rendering::render_tree;
use parking_lot::ReentrantMutex;
use serde::Deserialize;
use tracing::{debug, info, instrument, trace};

use crate::descriptor::{Injectable, TypeDescriptor};
use crate::error::{ContainerError, Result};
use crate::instance::Instance;
use crate::key::{DependencyKey, normalize};
use crate::lifetime::Lifetime;
use crate::plan::{Planner, not_found};
use crate::provider::Provider;
use crate::registry::{Binding, Registry, Resolver};
use crate::resolver::{materialize, produce};

// ============================================================
// Options
// ============================================================

/// Container settings.
///
/// Deserializable so they can live in an application's config file;
/// every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// Let `register`/`singleton` replace existing bindings instead of
    /// failing with [`ContainerError::DuplicateBinding`].
    pub allow_override: bool,
    /// Directory scanned by `autoload_configured`.
    pub autoload_root: Option<PathBuf>,
}

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] from options and provider modules.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .allow_override(true)
///     .add_provider(RepositoryProvider)
///     .add_provider(ServiceProvider)
///     .build()?;
/// ```
pub struct ContainerBuilder {
    options: ContainerOptions,
    providers: Vec<Box<dyn Provider>>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            options: ContainerOptions::default(),
            providers: Vec::new(),
        }
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    /// Allow `register`/`singleton` to overwrite existing bindings.
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.options.allow_override = allow;
        self
    }

    /// Directory used by `autoload_configured`.
    pub fn autoload_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.options.autoload_root = Some(root.into());
        self
    }

    /// Add a [`Provider`] module, run in insertion order by `build`.
    pub fn add_provider(mut self, provider: impl Provider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Build the container and run every provider against it.
    ///
    /// # Errors
    /// The first error returned by a provider.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        let container = Container::with_options(self.options);
        for provider in &self.providers {
            container.add_provider(provider.as_ref())?;
        }

        info!(bindings = container.len(), "Container built");
        Ok(container)
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Name-based, thread-safe dependency injection container.
///
/// All methods take `&self`: bindings may be added at any time, from
/// any thread. Resolution of not-yet-resolved bindings is serialized;
/// producing values from resolved bindings is not.
pub struct Container {
    registry: Registry,
    options: ContainerOptions,
    // Re-entrant: factories may call `get` while a resolution is running.
    resolution: ReentrantMutex<()>,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty container.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            registry: Registry::new(),
            options,
            resolution: ReentrantMutex::new(()),
        }
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    // ── Registration ──

    /// Registers a type under its own name with a transient lifetime.
    ///
    /// # Errors
    /// [`ContainerError::DuplicateBinding`] if the name is taken and
    /// overrides are not allowed.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<()> {
        self.insert_strict(self_named(Lifetime::Transient, descriptor))
    }

    /// Binds a type under an explicit name, replacing any existing binding.
    ///
    /// This is how a contract name is pointed at an implementation:
    ///
    /// ```rust,ignore
    /// container.bind(
    ///     "UserRepository",
    ///     MockUserRepository::descriptor()
    ///         .expose(|repo: Arc<MockUserRepository>| repo as Arc<dyn UserRepository>),
    /// );
    /// ```
    pub fn bind(&self, name: &str, descriptor: TypeDescriptor) {
        self.registry.insert(Binding::reflective(
            DependencyKey::new(name),
            Lifetime::Transient,
            descriptor,
        ));
    }

    /// Registers a type under its own name, built once and shared.
    ///
    /// # Errors
    /// Same duplicate policy as [`Container::register`].
    pub fn singleton(&self, descriptor: TypeDescriptor) -> Result<()> {
        self.insert_strict(self_named(Lifetime::Singleton, descriptor))
    }

    /// Binds a pre-built value; `get` returns exactly this `Arc`.
    pub fn instance<T: ?Sized + Send + Sync + 'static>(&self, name: &str, value: Arc<T>) {
        self.registry
            .insert(Binding::instance(DependencyKey::new(name), Instance::new(value)));
    }

    /// Binds a pre-built value under its type's registration name.
    pub fn instance_of<T: Injectable>(&self, value: T) {
        self.instance(T::NAME, Arc::new(value));
    }

    /// Binds a factory that runs on every request.
    ///
    /// No constructor parameters are read: the factory composes its value
    /// by hand from the [`Resolver`] it receives.
    pub fn bind_factory<T, F>(&self, name: &str, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.insert_factory(name, Lifetime::Transient, factory);
    }

    /// Binds a factory that runs once, on first request.
    pub fn singleton_factory<T, F>(&self, name: &str, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.insert_factory(name, Lifetime::Singleton, factory);
    }

    /// Runs a [`Provider`] module against this container.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Running provider");
        provider.register(self)
    }

    // ── Resolution ──

    /// Resolves a name to a value of type `T`.
    ///
    /// ```rust,ignore
    /// let controller: Arc<UserController> = container.get("UserController")?;
    /// ```
    ///
    /// # Errors
    /// - [`ContainerError::NotFound`]: the name or one of its dependencies is unbound
    /// - [`ContainerError::CyclicDependency`]: the dependency graph loops
    /// - [`ContainerError::TypeMismatch`]: the binding produces another type
    /// - [`ContainerError::ConstructionFailed`]: a constructor or factory failed
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        let instance = self.get_instance(name)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                name: DependencyKey::new(name),
                expected: type_name::<T>(),
                found: instance.type_name(),
            })
    }

    /// Resolves a name to its type-erased value.
    pub fn get_instance(&self, name: &str) -> Result<Instance> {
        let key = DependencyKey::new(name);
        trace!(key = %key, "Resolving");

        let binding = self.lookup(&key)?;
        let binding = if binding.is_resolved() {
            binding
        } else {
            self.resolve(&key)?
        };

        produce(&binding, self)
    }

    /// Returns `true` if `name` (in any spelling) has a binding.
    pub fn has(&self, name: &str) -> bool {
        self.registry.contains(&normalize(name))
    }

    /// Canonical names of every binding, sorted.
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Renders the dependency tree below `name` with lifetimes.
    ///
    /// Nothing is constructed.
    ///
    /// ```text
    /// [Transient] UserController
    /// [Transient]   UserService
    /// [Transient]     UserRepository
    /// ```
    pub fn explain(&self, name: &str) -> Result<String> {
        let entries = Planner::new(&self.registry).tree(&DependencyKey::new(name))?;
        Ok(render_tree(&entries))
    }

    // ── Internal ──

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    fn lookup(&self, key: &DependencyKey) -> Result<Arc<Binding>> {
        self.registry
            .lookup(key.canonical())
            .ok_or_else(|| not_found(&self.registry, key, None))
    }

    /// Plans and materializes everything `key` needs.
    ///
    /// Returns the binding that was planned, even if `key` was rebound
    /// while it was being built.
    #[instrument(skip_all, fields(key = %key), name = "container_resolve")]
    fn resolve(&self, key: &DependencyKey) -> Result<Arc<Binding>> {
        let _lock = self.resolution.lock();
        let plan = Planner::new(&self.registry).plan(key)?;
        materialize(&self.registry, self, &plan.steps)?;
        Ok(plan.root)
    }

    fn insert_strict(&self, binding: Binding) -> Result<()> {
        if self.options.allow_override {
            self.registry.insert(binding);
            Ok(())
        } else {
            self.registry.try_insert(binding)
        }
    }

    fn insert_factory<T, F>(&self, name: &str, lifetime: Lifetime, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let closure = Arc::new(move |resolver: &dyn Resolver| Ok(Instance::new(factory(resolver)?)));
        self.registry
            .insert(Binding::factory(DependencyKey::new(name), lifetime, closure));
    }
}

/// A binding keyed by the descriptor's declared name.
pub(crate) fn self_named(lifetime: Lifetime, descriptor: TypeDescriptor) -> Binding {
    let key = DependencyKey::new(descriptor.name());
    Binding::reflective(key, lifetime, descriptor)
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for Container {
    fn get_instance(&self, name: &str) -> Result<Instance> {
        Container::get_instance(self, name)
    }

    fn has(&self, name: &str) -> bool {
        Container::has(self, name)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.registry.len())
            .field("allow_override", &self.options.allow_override)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, ContainerOptions};
    pub use crate::descriptor::{Arguments, Injectable, TypeDescriptor};
    pub use crate::error::{ContainerError, Result};
    pub use crate::instance::Instance;
    pub use crate::lifetime::Lifetime;
    pub use crate::provider::Provider;
    pub use crate::registry::Resolver;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
