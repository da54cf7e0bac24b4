//! Dependency names and their canonical form.
//!
//! Every registration and lookup goes through [`normalize`], so
//! `"UserRepository"`, `"userRepository"`, `"user_repository"` and
//! `"user-repository"` all address the same binding.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonicalizes a dependency name.
///
/// Lower-cases the input and drops `_` and `-`. Total and idempotent.
///
/// # Examples
/// ```
/// use khazin_container::key::normalize;
///
/// assert_eq!(normalize("UserRepository"), "userrepository");
/// assert_eq!(normalize("user_repository"), "userrepository");
/// assert_eq!(normalize("user-repository"), "userrepository");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Identifies a binding in the container.
///
/// Equality and hashing use only the canonical form; the spelling
/// the key was created from is kept for error messages.
///
/// # Examples
/// ```
/// use khazin_container::key::DependencyKey;
///
/// let a = DependencyKey::new("UserService");
/// let b = DependencyKey::new("user_service");
/// assert_eq!(a, b);
/// assert_eq!(a.spelling(), "UserService");
/// assert_eq!(b.canonical(), "userservice");
/// ```
#[derive(Clone)]
pub struct DependencyKey {
    canonical: String,
    spelling: String,
}

impl DependencyKey {
    /// Creates a key from any spelling of a name.
    pub fn new(raw: impl Into<String>) -> Self {
        let spelling = raw.into();
        Self {
            canonical: normalize(&spelling),
            spelling,
        }
    }

    /// The normalized form used for lookups.
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The spelling this key was created from.
    #[inline]
    pub fn spelling(&self) -> &str {
        &self.spelling
    }
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

// Lets maps keyed by `DependencyKey` be queried with a canonical `&str`.
impl Borrow<str> for DependencyKey {
    fn borrow(&self) -> &str {
        &self.canonical
    }
}

impl From<&str> for DependencyKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for DependencyKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyKey({:?})", self.canonical)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spelling == self.canonical {
            write!(f, "{}", self.spelling)
        } else {
            write!(f, "{} ({})", self.spelling, self.canonical)
        }
    }
}
