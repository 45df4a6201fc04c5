//! Errors surfaced by a [`Store`](crate::store::Store).
//!
//! None of these ever cross into Lua as a fault: the adapter renders them
//! with `Display` and hands the string back as an extra return value.

use redis::ErrorKind;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The address given to `new_client` was unusable.  Reported on every
    /// command, since construction itself never fails.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport, protocol or server-side failure.
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

impl StoreError {
    /// `true` when the connection that produced this error should not be
    /// reused.
    pub fn is_connection_fatal(&self) -> bool {
        match self {
            StoreError::Redis(e) => e.kind() == ErrorKind::IoError || e.is_connection_dropped(),
            StoreError::Config(_) => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
