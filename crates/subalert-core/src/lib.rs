//! Core types and trait definitions for subalert.
//!
//! This crate is deliberately free of HTTP, image, and filesystem
//! dependencies. Chain access, the outbound social channel, snapshot
//! persistence, and card rendering are expressed as traits here and
//! implemented by the other workspace crates (or by test fakes).

pub mod alert;
pub mod chain;
pub mod channel;
pub mod error;
pub mod identity;
pub mod snapshot;

pub use error::{CacheIoError, ChainQueryError, DispatchError};
