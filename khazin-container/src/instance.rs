//! Type-erased values produced by bindings.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A value produced by the container, with its concrete type erased.
///
/// An `Instance` wraps an `Arc<T>` where `T` may be unsized (a trait
/// object), so a binding can hand out `Arc<dyn UserRepository>` just as
/// easily as `Arc<Clock>`. Cloning an `Instance` clones the inner `Arc`:
/// both clones point at the same value.
///
/// # Examples
/// ```
/// use khazin_container::instance::Instance;
/// use std::sync::Arc;
///
/// let shared = Arc::new(String::from("hello"));
/// let instance = Instance::new(shared.clone());
///
/// let back = instance.downcast::<String>().unwrap();
/// assert!(Arc::ptr_eq(&shared, &back));
/// assert!(instance.downcast::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wraps a shared value.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the shared value if it was created as `Arc<T>`.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Name of the type the value is exposed as.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_name)
            .finish()
    }
}
