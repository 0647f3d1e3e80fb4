//! Shared domain types for the Confab backend.
//!
//! This crate holds everything the db, events, and api crates agree on:
//! the error taxonomy, primitive type aliases, presence status semantics
//! (including the read-time staleness policy), channel naming, and
//! friendship status values.

pub mod channels;
pub mod error;
pub mod friendship;
pub mod presence;
pub mod types;
