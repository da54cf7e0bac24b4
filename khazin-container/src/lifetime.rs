//! Binding lifetimes.
//!
//! A lifetime decides what `get` hands back for a binding:
//! - [`Lifetime::Transient`]: the construction closure runs on every request
//! - [`Lifetime::Singleton`]: the closure runs once, the result is cached
//! - [`Lifetime::Instance`]: a value supplied up front, never constructed
use std::fmt;

/// How long a value produced by a binding lives.
///
/// # Examples
/// ```
/// use khazin_container::lifetime::Lifetime;
///
/// assert!(Lifetime::Singleton.is_cached());
/// assert!(!Lifetime::Transient.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// A fresh value for every request.
    ///
    /// The default for `register` and `bind`.
    Transient,

    /// One value, built on first request and shared afterwards.
    ///
    /// # When to use
    /// - Clocks, configuration, connection pools
    /// - Anything whose identity must be stable
    Singleton,

    /// A pre-built value handed to the container.
    ///
    /// The container never constructs it and never replaces it.
    Instance,
}

impl Lifetime {
    /// Returns `true` if `get` returns a cached value.
    ///
    /// Singleton and Instance both cache; Transient does not.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Instance)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => write!(f, "Transient"),
            Lifetime::Singleton => write!(f, "Singleton"),
            Lifetime::Instance => write!(f, "Instance"),
        }
    }
}
