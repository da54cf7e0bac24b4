//! # Khazin Support
//!
//! Shared utilities for the Khazin container crates.
//!
//! This crate provides:
//! - Text rendering for diagnostics (resolution chains, wiring trees)
//! - "Did you mean?" suggestions for unknown names

pub mod rendering;
