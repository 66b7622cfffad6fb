//! Ledger data models.

use super::errors::{LedgerError, LedgerResult};
use crate::money::Cents;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// User identifier (opaque, case-sensitive)
pub type UserId = String;

/// A user ledger behind its exclusive per-user lock
pub type SharedUserLedger = Arc<Mutex<UserLedger>>;

/// One participant's billed interval for one recording event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    is_fraud: bool,
    paid_amount: Cents,
}

impl Recording {
    /// Create a payable recording
    pub fn paid(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, amount: Cents) -> Self {
        Self {
            id: id.to_string(),
            start,
            end,
            is_fraud: false,
            paid_amount: amount,
        }
    }

    /// Create a recording that is fraudulent from the start
    pub fn fraudulent(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            start,
            end,
            is_fraud: true,
            paid_amount: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_fraud(&self) -> bool {
        self.is_fraud
    }

    pub fn paid_amount(&self) -> Cents {
        self.paid_amount
    }

    /// Whether the half-open intervals `[start, end)` intersect
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }

    /// Mark as fraud and return the payout being reversed.
    ///
    /// Returns 0 when the recording was already fraudulent.
    fn mark_fraud(&mut self) -> Cents {
        if self.is_fraud {
            return 0;
        }
        self.is_fraud = true;
        std::mem::take(&mut self.paid_amount)
    }
}

/// Result of crediting one recording to one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCredit {
    /// No overlap; the user was paid this amount
    Credited(Cents),
    /// Overlap found; nothing was paid and earlier payouts were taken back
    Fraud {
        /// Number of previously good recordings now marked fraud
        reversed_recordings: usize,
        /// Sum of the payouts subtracted from the balance
        reversed_amount: Cents,
    },
}

/// One user's balance and recording history.
///
/// Reached only through the user's lock; see [`SharedUserLedger`].
#[derive(Debug, Default)]
pub struct UserLedger {
    balance: Cents,
    /// Sorted by start, ascending
    recordings: Vec<Recording>,
}

impl UserLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_balance(&self) -> Cents {
        self.balance
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Index of the first recording starting at or after `start`
    fn lower_bound(&self, start: DateTime<Utc>) -> usize {
        self.recordings.partition_point(|r| r.start < start)
    }

    /// Insert keeping the history sorted by start
    pub fn insert_recording(&mut self, recording: Recording) {
        let idx = self.lower_bound(recording.start);
        self.recordings.insert(idx, recording);
    }

    /// Indices of every recording intersecting `[start, end)`, ascending
    fn overlapping_indices(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<usize> {
        let idx = self.lower_bound(start);
        let mut found = Vec::new();

        // A good recording overlaps nothing, so nothing before it can reach
        // past it. Fraud recordings may hide longer ones, so step over them.
        for i in (0..idx).rev() {
            let r = &self.recordings[i];
            if r.end > start {
                found.push(i);
            } else if !r.is_fraud {
                break;
            }
        }
        found.reverse();

        found.extend(
            self.recordings[idx..]
                .iter()
                .take_while(|r| r.start < end)
                .enumerate()
                .map(|(offset, _)| idx + offset),
        );
        found
    }

    /// Every recording whose interval intersects `[start, end)`.
    ///
    /// Touching endpoints are not an overlap.
    pub fn find_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Recording> {
        self.overlapping_indices(start, end)
            .into_iter()
            .map(|i| &self.recordings[i])
            .collect()
    }

    /// Credit one recording to this user, or flag it and reverse what it
    /// overlaps.
    ///
    /// The balance is clamped at zero after reversals. Money already
    /// withdrawn is not carried as a debt.
    pub fn apply_credit(
        &mut self,
        recording_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        base_earned: Cents,
    ) -> UserCredit {
        let overlapping = self.overlapping_indices(start, end);

        if overlapping.is_empty() {
            self.insert_recording(Recording::paid(recording_id, start, end, base_earned));
            self.balance += base_earned;
            return UserCredit::Credited(base_earned);
        }

        let mut reversed_recordings = 0;
        let mut reversed_amount = 0;
        for i in overlapping {
            let recording = &mut self.recordings[i];
            if recording.is_fraud {
                continue;
            }
            reversed_amount += recording.mark_fraud();
            reversed_recordings += 1;
        }
        self.balance = (self.balance - reversed_amount).max(0);

        self.insert_recording(Recording::fraudulent(recording_id, start, end));

        UserCredit::Fraud {
            reversed_recordings,
            reversed_amount,
        }
    }

    /// Take `amount` out of the balance.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - `amount` is not positive
    /// * `LedgerError::InsufficientBalance` - balance below `amount`; the
    ///   balance is left untouched
    pub fn withdraw(&mut self, amount: Cents) -> LedgerResult<Cents> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "withdrawal must be positive, got {amount}"
            )));
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: self.balance,
                required: amount,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }
}

/// Aggregate result of a credit call across all participants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditOutcome {
    /// Amount credited per participant (0 for fraud)
    pub credited: BTreeMap<UserId, Cents>,
    /// Participants whose recording overlapped their own history
    pub fraud_users: BTreeSet<UserId>,
}

impl CreditOutcome {
    pub fn is_fraud(&self, user_id: &str) -> bool {
        self.fraud_users.contains(user_id)
    }

    pub fn credited_to(&self, user_id: &str) -> Option<Cents> {
        self.credited.get(user_id).copied()
    }

    pub fn total_credited(&self) -> Cents {
        self.credited.values().sum()
    }
}
