//! Type descriptors: what the container knows about a constructible type.
//!
//! Rust has no runtime parameter reflection, so a type declares its
//! constructor through [`Injectable`]: a registration name plus the ordered
//! list of dependency names its constructor takes. `#[derive(Injectable)]`
//! writes that table from a struct's fields; [`TypeDescriptor::new`] builds
//! one by hand.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::error::{ContainerError, Result};
use crate::instance::Instance;
use crate::key::DependencyKey;

/// Type-erased constructor stored in a descriptor.
pub type ConstructorFn = Arc<dyn Fn(&mut Arguments) -> Result<Instance> + Send + Sync>;

/// A type the container can build from named dependencies.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// struct UserService {
///     user_repository: Arc<dyn UserRepository>,
/// }
/// ```
///
/// which is equivalent to:
///
/// ```
/// use khazin_container::descriptor::{Arguments, Injectable};
/// use khazin_container::error::Result;
/// use std::sync::Arc;
///
/// struct Database;
/// struct UserService {
///     database: Arc<Database>,
/// }
///
/// impl Injectable for UserService {
///     const NAME: &'static str = "UserService";
///
///     fn parameters() -> &'static [&'static str] {
///         &["database"]
///     }
///
///     fn construct(arguments: &mut Arguments) -> Result<Self> {
///         Ok(Self { database: arguments.next()? })
///     }
/// }
///
/// assert_eq!(UserService::descriptor().parameters(), ["database"]);
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Name used as the default registration key.
    const NAME: &'static str;

    /// Constructor parameter names, in the order `construct` consumes them.
    fn parameters() -> &'static [&'static str] {
        &[]
    }

    /// Builds the value from resolved arguments.
    fn construct(arguments: &mut Arguments) -> Result<Self>;

    /// The descriptor registered for this type.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }
}

/// Declared name, ordered constructor parameters, and a way to build.
///
/// Descriptors are cheap to clone; the constructor is shared.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    type_name: &'static str,
    parameters: Vec<String>,
    constructor: ConstructorFn,
}

impl TypeDescriptor {
    /// Describes an [`Injectable`] type.
    pub fn of<T: Injectable>() -> Self {
        Self::new(T::NAME, T::parameters().iter().copied(), T::construct)
    }

    /// Describes a type by hand.
    ///
    /// # Examples
    /// ```
    /// use khazin_container::descriptor::TypeDescriptor;
    ///
    /// struct Greeting(String);
    ///
    /// let descriptor = TypeDescriptor::new("Greeting", ["name"], |args| {
    ///     let name = args.next::<String>()?;
    ///     Ok(Greeting(format!("hello {name}")))
    /// });
    /// assert_eq!(descriptor.name(), "Greeting");
    /// assert_eq!(descriptor.parameters(), ["name"]);
    /// ```
    pub fn new<T, I, F>(name: impl Into<String>, parameters: I, constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator,
        I::Item: Into<String>,
        F: Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            type_name: type_name::<T>(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            constructor: Arc::new(move |arguments: &mut Arguments| {
                Ok(Instance::new(Arc::new(constructor(arguments)?)))
            }),
        }
    }

    /// Hands the constructed value out as another type, typically a
    /// trait object the concrete type implements.
    ///
    /// # Examples
    /// ```
    /// use khazin_container::descriptor::TypeDescriptor;
    /// use std::sync::Arc;
    ///
    /// trait Repository: Send + Sync {}
    /// struct InMemory;
    /// impl Repository for InMemory {}
    ///
    /// let descriptor = TypeDescriptor::new("InMemory", Vec::<String>::new(), |_| Ok(InMemory))
    ///     .expose(|repo: Arc<InMemory>| repo as Arc<dyn Repository>);
    /// assert!(descriptor.type_name().contains("Repository"));
    /// ```
    pub fn expose<T, C, F>(self, upcast: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        let inner = self.constructor;
        let owner = self.name.clone();
        Self {
            name: self.name,
            type_name: type_name::<C>(),
            parameters: self.parameters,
            constructor: Arc::new(move |arguments: &mut Arguments| {
                let produced = inner(arguments)?;
                let concrete =
                    produced
                        .downcast::<T>()
                        .ok_or_else(|| ContainerError::TypeMismatch {
                            name: DependencyKey::new(owner.as_str()),
                            expected: type_name::<T>(),
                            found: produced.type_name(),
                        })?;
                Ok(Instance::new(upcast(concrete)))
            }),
        }
    }

    /// Declared name, the default registration key.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructor parameter names, in order.
    #[inline]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Rust type of the values this descriptor produces.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Runs the constructor.
    pub fn construct(&self, arguments: &mut Arguments) -> Result<Instance> {
        (self.constructor)(arguments)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    owner: String,
    values: std::vec::IntoIter<(String, Instance)>,
}

impl Arguments {
    /// Creates arguments for `owner`'s constructor from `(parameter, value)` pairs.
    pub fn new(owner: impl Into<String>, values: Vec<(String, Instance)>) -> Self {
        Self {
            owner: owner.into(),
            values: values.into_iter(),
        }
    }

    /// Takes the next argument as `Arc<T>`.
    ///
    /// # Errors
    /// - [`ContainerError::TypeMismatch`] if the dependency produces another type
    /// - [`ContainerError::ConstructionFailed`] if the constructor reads more
    ///   arguments than it declares
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let (parameter, instance) = self.values.next().ok_or_else(|| {
            ContainerError::construction(
                self.owner.as_str(),
                format!(
                    "constructor reads more arguments than it declares (wanted {})",
                    type_name::<T>()
                ),
            )
        })?;

        instance
            .downcast::<T>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                name: DependencyKey::new(parameter),
                expected: type_name::<T>(),
                found: instance.type_name(),
            })
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("remaining", &self.values.len())
            .finish()
    }
}
