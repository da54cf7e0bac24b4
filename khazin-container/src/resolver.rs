//! Turning a resolution plan into construction closures.
//!
//! For every planned binding, in dependency order:
//! 1. Capture each constructor parameter as a *source*: the dependency's
//!    closure if it is transient, its cached value otherwise.
//! 2. Build the binding's construction closure over those sources.
//! 3. Singletons run their closure once and cache the result.
//!
//! Closures are invoked through [`construct`], which keeps a per-thread
//! stack of bindings under construction. Factories that resolve names by
//! hand can still loop back on themselves; the stack turns that into a
//! [`ContainerError::CyclicDependency`] instead of unbounded recursion.

use std::cell::RefCell;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::descriptor::{Arguments, TypeDescriptor};
use crate::error::{ContainerError, CyclicDependencyError, Result};
use crate::instance::Instance;
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;
use crate::plan::not_found;
use crate::registry::{Binding, FactoryFn, Registry, Resolver};

thread_local! {
    // Bindings whose closures are running on this thread, outermost first.
    static CONSTRUCTING: RefCell<Vec<DependencyKey>> = const { RefCell::new(Vec::new()) };
}

/// Marks a binding as under construction until dropped.
struct ConstructionGuard;

impl ConstructionGuard {
    fn enter(key: &DependencyKey) -> Result<Self> {
        CONSTRUCTING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|k| k == key) {
                let mut chain = stack[start..].to_vec();
                chain.push(key.clone());
                warn!(cycle = ?chain, "Circular construction detected!");
                return Err(ContainerError::CyclicDependency(CyclicDependencyError { chain }));
            }
            stack.push(key.clone());
            Ok(ConstructionGuard)
        })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs a binding's construction closure under the cycle guard.
pub(crate) fn construct(key: &DependencyKey, closure: &FactoryFn, resolver: &dyn Resolver) -> Result<Instance> {
    let _guard = ConstructionGuard::enter(key)?;
    trace!(key = %key, "Constructing");
    closure(resolver)
}

/// Produces a value for a resolved binding according to its lifetime.
pub(crate) fn produce(binding: &Binding, resolver: &dyn Resolver) -> Result<Instance> {
    match binding.lifetime {
        Lifetime::Transient => construct(&binding.key, closure_of(binding)?, resolver),
        Lifetime::Singleton => {
            if let Some(value) = binding.cached() {
                return Ok(value.clone());
            }
            // Guard before the cell: re-entering its init on this thread would block.
            let _guard = ConstructionGuard::enter(&binding.key)?;
            let closure = closure_of(binding)?;
            binding.cache_with(|| {
                trace!(key = %binding.key, "Constructing singleton");
                closure(resolver)
            })
        }
        Lifetime::Instance => binding.cached().cloned().ok_or_else(|| {
            ContainerError::construction(binding.key.clone(), "instance binding holds no value")
        }),
    }
}

fn closure_of(binding: &Binding) -> Result<&FactoryFn> {
    binding.closure().ok_or_else(|| {
        ContainerError::construction(binding.key.clone(), "binding has no construction closure")
    })
}

/// Where a constructor argument comes from.
enum Source {
    /// Transient dependency: run its closure for every construction.
    Fresh {
        parameter: String,
        key: DependencyKey,
        closure: FactoryFn,
    },
    /// Singleton or instance dependency: hand out the cached value.
    Shared { parameter: String, value: Instance },
}

impl Source {
    fn capture(registry: &Registry, owner: &DependencyKey, parameter: &str) -> Result<Self> {
        let key = DependencyKey::new(parameter);
        let dependency = registry
            .lookup(key.canonical())
            .ok_or_else(|| not_found(registry, &key, Some(owner)))?;

        let unresolved = || {
            ContainerError::construction(
                owner.clone(),
                format!("dependency {key} was not resolved before its consumer"),
            )
        };

        if dependency.lifetime.is_cached() {
            Ok(Source::Shared {
                parameter: parameter.to_string(),
                value: dependency.cached().cloned().ok_or_else(unresolved)?,
            })
        } else {
            Ok(Source::Fresh {
                parameter: parameter.to_string(),
                closure: dependency.closure().cloned().ok_or_else(unresolved)?,
                key: dependency.key.clone(),
            })
        }
    }

    fn produce(&self, resolver: &dyn Resolver) -> Result<(String, Instance)> {
        match self {
            Source::Fresh { parameter, key, closure } => {
                Ok((parameter.clone(), construct(key, closure, resolver)?))
            }
            Source::Shared { parameter, value } => Ok((parameter.clone(), value.clone())),
        }
    }
}

/// Closure that builds `descriptor` from its captured sources, in order.
fn reflective_closure(descriptor: TypeDescriptor, sources: Vec<Source>) -> FactoryFn {
    Arc::new(move |resolver: &dyn Resolver| {
        let values = sources
            .iter()
            .map(|source| source.produce(resolver))
            .collect::<Result<Vec<_>>>()?;
        descriptor.construct(&mut Arguments::new(descriptor.name(), values))
    })
}

/// Builds closures and caches singletons for planned bindings.
///
/// `steps` must list dependencies before their consumers, as
/// [`Planner::plan`](crate::plan::Planner::plan) returns them.
pub(crate) fn materialize(registry: &Registry, resolver: &dyn Resolver, steps: &[Arc<Binding>]) -> Result<()> {
    for binding in steps {
        if binding.closure().is_none() {
            let descriptor = binding.descriptor.as_ref().ok_or_else(|| {
                ContainerError::construction(binding.key.clone(), "binding has nothing to construct from")
            })?;

            let sources = binding
                .parameters()
                .iter()
                .map(|parameter| Source::capture(registry, &binding.key, parameter))
                .collect::<Result<Vec<_>>>()?;

            binding.set_closure(reflective_closure(descriptor.clone(), sources));
        }

        if binding.lifetime == Lifetime::Singleton {
            produce(binding, resolver)?;
        }

        debug!(key = %binding.key, lifetime = %binding.lifetime, "Resolved");
    }
    Ok(())
}
