//! Procedural macros for Khazin.
//!
//! Use them through the `khazin` crate:
//!
//! ```rust,ignore
//! use khazin::Injectable;
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! struct UserService {
//!     user_repository: Arc<dyn UserRepository>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod injectable;

/// Derives `Injectable` for a struct.
///
/// Each field is a constructor parameter named after the field, in
/// declaration order, and must be an `Arc<T>` (`T` may be a trait object).
/// The struct's name is its registration name. The type is also added to
/// the discovery catalog, so `Container::autoload` can find it.
///
/// # Attributes
/// - `#[inject(name = "...")]` on the struct: registration name
/// - `#[inject(name = "...")]` on a field: dependency name
/// - `#[inject(default)]` on a field: filled with `Default::default()`,
///   not a parameter
/// - `#[inject(crate = "...")]` on the struct: path to the `khazin` crate
///
/// # Examples
/// ```rust,ignore
/// #[derive(Injectable)]
/// #[inject(name = "Users")]
/// struct UserController {
///     user_service: Arc<UserService>,
///     #[inject(name = "clock")]
///     time: Arc<dyn Clock>,
///     #[inject(default)]
///     requests: AtomicU64,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::expand(&input)
        .unwrap_or_else(|err| err.write_errors())
        .into()
}
