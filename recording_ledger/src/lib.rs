//! # Recording Ledger
//!
//! An in-memory accounting ledger that pays participants for timed
//! recordings, detects overlapping (fraudulent) claims per user, and supports
//! balance withdrawal.
//!
//! ## Core Modules
//!
//! - [`money`]: Integer-cents arithmetic, earnings rate, parsing and formatting
//! - [`ledger`]: User ledgers, the user store and the credit engine
//!
//! ## Example
//!
//! ```
//! use recording_ledger::{LedgerManager, money};
//!
//! let ledger = LedgerManager::new();
//! assert_eq!(ledger.balance("alice"), 0);
//! assert_eq!(money::parse_cents("3.25").unwrap(), 325);
//! ```

/// Money representation and conversions.
pub mod money;

/// Ledger engine, user store and models.
pub mod ledger;
pub use ledger::{
    CreditOutcome, LedgerError, LedgerManager, LedgerResult, Recording, UserLedger, UserStore,
};
pub use money::Cents;
