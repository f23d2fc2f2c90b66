//! The module contains the errors the engine can throw.
//!
//! Request validation fails with:
//!
//! - [`InvalidRange`] when the resolved start date is after the end date.
//! - [`OutOfRange`] when a year lies outside `[1970, 9999]`.
//! - [`MalformedInput`] when a date, month or year token does not parse.
//!
//! Everything raised while talking to the ledger store ([`Timeout`],
//! [`Store`], [`Database`]) is a store failure and must be reported to callers
//! without its detail.
//!
//!  [`InvalidRange`]: EngineError::InvalidRange
//!  [`OutOfRange`]: EngineError::OutOfRange
//!  [`MalformedInput`]: EngineError::MalformedInput
//!  [`Timeout`]: EngineError::Timeout
//!  [`Store`]: EngineError::Store
//!  [`Database`]: EngineError::Database
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Out of range: {0}")]
    OutOfRange(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
    #[error("Store failure: {0}")]
    Store(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors raised by the request itself, before any
    /// store query ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange(_)
                | Self::OutOfRange(_)
                | Self::MalformedInput(_)
                | Self::InvalidAmount(_)
        )
    }

    /// Returns `true` for failures of the underlying ledger store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Store(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::OutOfRange(a), Self::OutOfRange(b)) => a == b,
            (Self::MalformedInput(a), Self::MalformedInput(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
