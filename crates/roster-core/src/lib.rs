//! Core types and trait definitions for the roster.
//!
//! This crate has no HTTP, database, or transport dependencies. The reminder
//! and summary rules live here as pure functions over client slices; storage
//! and delivery sit behind traits.

// Trait impls use native `async fn`; the traits themselves spell out `Send`.
#![allow(async_fn_in_trait)]

pub mod client;
pub mod error;
pub mod memory;
pub mod notify;
pub mod reminder;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
