//! Ledger module providing per-user recording histories and the credit engine.
//!
//! This module implements:
//! - Per-user ledgers holding a balance and recordings sorted by start time
//! - Half-open interval overlap detection against a user's own history
//! - Fraud reversal of every good recording a new recording overlaps
//! - A concurrent user store with lazy, exactly-once ledger creation
//! - Deadlock-free locking of an arbitrary participant set (sorted order)
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use recording_ledger::ledger::{LedgerError, LedgerManager};
//!
//! let ledger = LedgerManager::new();
//! let start = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();
//! let participants = vec!["alice".to_string(), "bob".to_string()];
//!
//! let outcome = ledger
//!     .credit_recording("rec-1", start, start + Duration::minutes(90), &participants)
//!     .unwrap();
//! assert_eq!(outcome.credited["alice"], 150);
//!
//! // Overlapping claim by alice reverses her earlier payout
//! let overlap = ledger
//!     .credit_recording("rec-2", start + Duration::minutes(30), start + Duration::hours(2), &["alice".to_string()])
//!     .unwrap();
//! assert!(overlap.fraud_users.contains("alice"));
//! assert_eq!(ledger.balance("alice"), 0);
//! assert_eq!(ledger.balance("bob"), 150);
//!
//! assert!(matches!(
//!     ledger.withdraw("bob", 200),
//!     Err(LedgerError::InsufficientBalance { available: 150, .. })
//! ));
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod store;

pub use errors::{LedgerError, LedgerResult};
pub use manager::LedgerManager;
pub use models::{CreditOutcome, Recording, SharedUserLedger, UserCredit, UserId, UserLedger};
pub use store::UserStore;
