//! Core types and trait definitions for the Rota schedule store.
//!
//! This crate is deliberately free of HTTP, spreadsheet, and database
//! dependencies. The reconciliation engine and duplicate detector live here as
//! pure logic over the [`engine::ScheduleTables`] abstraction; storage
//! backends and the API layer depend on this crate, never the reverse.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod detect;
pub mod engine;
pub mod error;
pub mod record;
pub mod store;

pub use error::{Error, Result};
