//! In-process adapters that live inside the domain crate for convenience.
//!
//! These are intended for unit tests, local demos, and the default dev
//! configuration. Real persistence adapters (SQLite, etc.) live in separate
//! crates.

pub mod memory_repo;
