//! Core types and trait definitions for the Gambit revision store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It holds the strategy data model, revision-token minting, the pure
//! structural diff, and the [`store::RevisionStore`] abstraction that storage
//! backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod consistency;
pub mod diff;
pub mod error;
pub mod revision;
pub mod store;
pub mod strategy;

pub use error::{Error, Result};
