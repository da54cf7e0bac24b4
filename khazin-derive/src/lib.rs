//! Derive macros for Khazin.

pub use khazin_macros::Injectable;
