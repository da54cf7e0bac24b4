//! Binding registry: normalized name → [`Binding`].
//!
//! The registry owns create/overwrite semantics. Resolution state lives
//! on each binding and is filled in lazily by the resolver.

use std::any::type_name;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::descriptor::TypeDescriptor;
use crate::error::{ContainerError, DuplicateBindingError, Result};
use crate::instance::Instance;
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;

/// Construction closure: builds one value for a binding.
///
/// Receives the [`Resolver`] so factories can compose manually. Shared by
/// the closures of dependent bindings.
pub type FactoryFn = Arc<dyn Fn(&dyn Resolver) -> Result<Instance> + Send + Sync>;

/// What factory closures see of the container.
///
/// Separated from `Container` so closures don't hold the container itself.
pub trait Resolver: Send + Sync {
    /// Resolves a name to its type-erased value.
    fn get_instance(&self, name: &str) -> Result<Instance>;

    /// Returns `true` if `name` has a binding.
    fn has(&self, name: &str) -> bool;
}

impl dyn Resolver + '_ {
    /// Resolves a name and downcasts it.
    ///
    /// ```rust,ignore
    /// container.bind_factory("Report", |r| {
    ///     let clock = r.get::<Clock>("clock")?;
    ///     Ok(Arc::new(Report::at(clock.now())))
    /// });
    /// ```
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
}

/// The registry's record of how to produce a value for one name.
///
/// "Resolved" is derived from what has been filled in: a transient
/// binding is resolved once it has a closure, a singleton once it has a
/// cached value, an instance binding from the start.
pub(crate) struct Binding {
    pub key: DependencyKey,
    pub lifetime: Lifetime,
    pub descriptor: Option<TypeDescriptor>,
    closure: OnceCell<FactoryFn>,
    cached: OnceCell<Instance>,
}

impl Binding {
    /// A binding built from a type descriptor; closure comes later.
    pub fn reflective(key: DependencyKey, lifetime: Lifetime, descriptor: TypeDescriptor) -> Self {
        Self {
            key,
            lifetime,
            descriptor: Some(descriptor),
            closure: OnceCell::new(),
            cached: OnceCell::new(),
        }
    }

    /// A binding whose closure is supplied by the caller.
    pub fn factory(key: DependencyKey, lifetime: Lifetime, factory: FactoryFn) -> Self {
        Self {
            key,
            lifetime,
            descriptor: None,
            closure: OnceCell::with_value(factory),
            cached: OnceCell::new(),
        }
    }

    /// A binding around a pre-built value.
    pub fn instance(key: DependencyKey, value: Instance) -> Self {
        Self {
            key,
            lifetime: Lifetime::Instance,
            descriptor: None,
            closure: OnceCell::new(),
            cached: OnceCell::with_value(value),
        }
    }

    pub fn is_resolved(&self) -> bool {
        if self.lifetime.is_cached() {
            self.cached.get().is_some()
        } else {
            self.closure.get().is_some()
        }
    }

    /// Constructor parameter names; empty for factories and instances.
    pub fn parameters(&self) -> &[String] {
        self.descriptor
            .as_ref()
            .map(TypeDescriptor::parameters)
            .unwrap_or_default()
    }

    pub fn closure(&self) -> Option<&FactoryFn> {
        self.closure.get()
    }

    /// Stores the closure built by the resolver. First one wins.
    pub fn set_closure(&self, closure: FactoryFn) {
        if self.closure.set(closure).is_err() {
            trace!(key = %self.key, "Construction closure already present");
        }
    }

    pub fn cached(&self) -> Option<&Instance> {
        self.cached.get()
    }

    /// Returns the cached value, computing it with `init` the first time.
    pub fn cache_with(&self, init: impl FnOnce() -> Result<Instance>) -> Result<Instance> {
        self.cached.get_or_try_init(init).cloned()
    }

    /// Type of the values this binding produces, when known up front.
    pub fn type_name(&self) -> Option<&'static str> {
        self.descriptor
            .as_ref()
            .map(TypeDescriptor::type_name)
            .or_else(|| self.cached().map(Instance::type_name))
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("type", &self.type_name())
            .field("parameters", &self.parameters())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Stores all bindings of one container.
///
/// Bindings are handed out as `Arc`s so no map guard is ever held
/// while resolving.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: DashMap<DependencyKey, Arc<Binding>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a binding, failing if its key is taken.
    ///
    /// # Errors
    /// Returns [`ContainerError::DuplicateBinding`] if the key is already bound.
    pub fn try_insert(&self, binding: Binding) -> Result<()> {
        match self.bindings.entry(binding.key.clone()) {
            Entry::Occupied(occupied) => Err(ContainerError::DuplicateBinding(DuplicateBindingError {
                name: occupied.key().clone(),
            })),
            Entry::Vacant(vacant) => {
                debug!(key = %binding.key, lifetime = %binding.lifetime, "Registered binding");
                vacant.insert(Arc::new(binding));
                Ok(())
            }
        }
    }

    /// Inserts a binding, replacing whatever was bound under its key.
    ///
    /// Bindings already resolved keep the closures they captured from
    /// the replaced binding.
    pub fn insert(&self, binding: Binding) {
        let key = binding.key.clone();
        let lifetime = binding.lifetime;
        match self.bindings.insert(key.clone(), Arc::new(binding)) {
            Some(_) => debug!(key = %key, lifetime = %lifetime, "Replaced binding"),
            None => debug!(key = %key, lifetime = %lifetime, "Registered binding"),
        }
    }

    /// Looks up a binding by canonical name.
    pub fn lookup(&self, canonical: &str) -> Option<Arc<Binding>> {
        let found = self.bindings.get(canonical).map(|entry| Arc::clone(entry.value()));
        trace!(key = canonical, found = found.is_some(), "Lookup");
        found
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.bindings.contains_key(canonical)
    }

    /// Canonical names of all bindings, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .iter()
            .map(|entry| entry.key().canonical().to_string())
            .collect();
        names.sort();
        names
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_binding(name: &str, value: i32) -> Binding {
        Binding::instance(DependencyKey::new(name), Instance::new(Arc::new(value)))
    }

    fn transient_binding(name: &str) -> Binding {
        Binding::factory(
            DependencyKey::new(name),
            Lifetime::Transient,
            Arc::new(|_: &dyn Resolver| Ok(Instance::new(Arc::new(42i32)))),
        )
    }

    #[test]
    fn insert_and_lookup_any_spelling() {
        let registry = Registry::new();
        registry.try_insert(value_binding("UserRepository", 1)).unwrap();

        assert!(registry.lookup("userrepository").is_some());
        assert!(registry.contains("userrepository"));
        assert!(registry.lookup("UserRepository").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn strict_insert_rejects_duplicate() {
        let registry = Registry::new();
        registry.try_insert(value_binding("Clock", 1)).unwrap();

        let err = registry.try_insert(value_binding("clock", 2)).unwrap_err();
        assert!(matches!(err, ContainerError::DuplicateBinding(_)));
    }

    #[test]
    fn insert_replaces() {
        let registry = Registry::new();
        registry.try_insert(value_binding("Clock", 1)).unwrap();
        registry.insert(value_binding("clock", 2));

        let binding = registry.lookup("clock").unwrap();
        let value = binding.cached().unwrap().downcast::<i32>().unwrap();
        assert_eq!(*value, 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolved_state_follows_lifetime() {
        assert!(value_binding("a", 1).is_resolved());
        assert!(transient_binding("b").is_resolved());

        let singleton = Binding::factory(
            DependencyKey::new("c"),
            Lifetime::Singleton,
            Arc::new(|_: &dyn Resolver| Ok(Instance::new(Arc::new(1u8)))),
        );
        assert!(!singleton.is_resolved());
        assert!(singleton.cached().is_none());

        singleton
            .cache_with(|| Ok(Instance::new(Arc::new(1u8))))
            .unwrap();
        assert!(singleton.is_resolved());
    }

    #[test]
    fn cache_is_set_once() {
        let binding = value_binding("a", 1);
        let again = binding.cache_with(|| Ok(Instance::new(Arc::new(2i32)))).unwrap();
        assert_eq!(*again.downcast::<i32>().unwrap(), 1);
    }

    #[test]
    fn names_are_sorted_canonical() {
        let registry = Registry::new();
        registry.insert(value_binding("Zeta", 1));
        registry.insert(value_binding("alpha_one", 1));
        assert_eq!(registry.names(), vec!["alphaone", "zeta"]);
    }
}
