//! Ledger error types.

use crate::money::Cents;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Ledger errors
///
/// Every variant is a caller-input error. None are transient, and a failed
/// precondition never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Recording ID missing
    #[error("invalid input: recording ID must not be empty")]
    InvalidInput,

    /// Interval end is not after its start
    #[error("end must be after start (start {start}, end {end})")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// No usable participant identifiers
    #[error("no valid participants")]
    NoParticipants,

    /// Malformed or non-positive amount
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Withdrawal exceeds the balance
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Cents, required: Cents },
}

impl LedgerError {
    /// Short caller-facing reason, without echoing raw input back
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::InvalidInput => "invalid input".to_string(),
            LedgerError::InvalidRange { .. } => "end must be after start".to_string(),
            LedgerError::NoParticipants => "no valid participants".to_string(),
            LedgerError::InvalidAmount(_) => "invalid amount".to_string(),
            LedgerError::InsufficientBalance { .. } => "insufficient balance".to_string(),
        }
    }

    /// Unchanged balance carried by a rejected withdrawal
    pub fn available_balance(&self) -> Option<Cents> {
        match self {
            LedgerError::InsufficientBalance { available, .. } => Some(*available),
            _ => None,
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
