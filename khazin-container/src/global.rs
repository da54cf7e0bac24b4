//! Process-wide container.

use once_cell::sync::Lazy;

use crate::container::Container;

// Created on first access.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Returns the process-wide container.
///
/// Useful for registering from anywhere in an application without
/// threading a container through; tests usually want their own
/// [`Container::new`] instead.
///
/// # Examples
/// ```
/// use khazin_container::global;
/// use std::sync::Arc;
///
/// global().instance("app_name", Arc::new(String::from("khazin")));
/// assert!(global().has("AppName"));
/// ```
pub fn global() -> &'static Container {
    &GLOBAL_CONTAINER
}
