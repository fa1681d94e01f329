//! Shared types

pub mod error;

pub use error::{PrepareError, Result, StoreError};
