//! Credit engine: multi-user locking, overlap detection and fraud reversal.

use super::{
    errors::{LedgerError, LedgerResult},
    models::{CreditOutcome, SharedUserLedger, UserCredit, UserLedger},
    store::UserStore,
};
use crate::money::{self, Cents};
use chrono::{DateTime, Utc};
use parking_lot::MutexGuard;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Ledger manager
#[derive(Debug, Clone, Default)]
pub struct LedgerManager {
    store: Arc<UserStore>,
}

/// Participant ledgers locked in sorted ID order.
///
/// Dropping releases the locks in reverse acquisition order, including
/// during unwinding.
struct LockedUsers<'a> {
    guards: Vec<(&'a str, MutexGuard<'a, UserLedger>)>,
}

impl<'a> LockedUsers<'a> {
    /// Lock every ledger in the order given. `users` must already be sorted.
    fn acquire(users: &'a [(&'a str, SharedUserLedger)]) -> Self {
        let mut guards = Vec::with_capacity(users.len());
        for (user_id, ledger) in users {
            guards.push((*user_id, ledger.lock()));
        }
        Self { guards }
    }
}

impl Drop for LockedUsers<'_> {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

impl LedgerManager {
    /// Create a manager over an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager over an existing store
    pub fn with_store(store: Arc<UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Credit a finished recording to every participant.
    ///
    /// Each participant is checked against their own history only. A
    /// participant whose history overlaps `[start, end)` gets nothing, and
    /// every good recording it overlaps is reversed. Others are paid
    /// [`money::earnings`] for the interval. Results are independent per
    /// user; there is no rollback across participants.
    ///
    /// # Arguments
    ///
    /// * `recording_id` - Recording ID
    /// * `start` - Recording start
    /// * `end` - Recording end
    /// * `participants` - User IDs; empty and duplicate entries are ignored
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidInput` - Empty recording ID
    /// * `LedgerError::InvalidRange` - `end` not after `start`
    /// * `LedgerError::NoParticipants` - No usable participant IDs
    pub fn credit_recording(
        &self,
        recording_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        participants: &[String],
    ) -> LedgerResult<CreditOutcome> {
        if recording_id.is_empty() {
            return Err(LedgerError::InvalidInput);
        }
        let base_earned = money::earnings(start, end)?;

        // Sorted, deduplicated IDs give every caller the same lock order
        let user_ids: BTreeSet<&str> = participants
            .iter()
            .map(String::as_str)
            .filter(|id| !id.is_empty())
            .collect();
        if user_ids.is_empty() {
            return Err(LedgerError::NoParticipants);
        }

        let users: Vec<(&str, SharedUserLedger)> = user_ids
            .into_iter()
            .map(|id| (id, self.store.get_or_create(id)))
            .collect();
        let mut locked = LockedUsers::acquire(&users);

        let mut outcome = CreditOutcome::default();
        for (user_id, ledger) in locked.guards.iter_mut() {
            match ledger.apply_credit(recording_id, start, end, base_earned) {
                UserCredit::Credited(amount) => {
                    log::debug!("Credited {amount} cents to {user_id} for recording {recording_id}");
                    outcome.credited.insert(user_id.to_string(), amount);
                }
                UserCredit::Fraud {
                    reversed_recordings,
                    reversed_amount,
                } => {
                    log::warn!(
                        "Fraud: recording {recording_id} overlaps history of {user_id}; \
                         reversed {reversed_recordings} recording(s), {reversed_amount} cents"
                    );
                    outcome.credited.insert(user_id.to_string(), 0);
                    outcome.fraud_users.insert(user_id.to_string());
                }
            }
        }
        drop(locked);

        Ok(outcome)
    }

    /// Current balance of a user (creating the user if unknown)
    pub fn balance(&self, user_id: &str) -> Cents {
        self.store.get_or_create(user_id).lock().current_balance()
    }

    /// Withdraw from a user's balance
    ///
    /// # Returns
    ///
    /// * `LedgerResult<Cents>` - New balance or error
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - `amount` is not positive
    /// * `LedgerError::InsufficientBalance` - Not enough balance; carries the
    ///   unchanged balance
    pub fn withdraw(&self, user_id: &str, amount: Cents) -> LedgerResult<Cents> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "withdrawal must be positive, got {amount}"
            )));
        }

        let ledger = self.store.get_or_create(user_id);
        let mut ledger = ledger.lock();
        let result = ledger.withdraw(amount);
        match &result {
            Ok(balance) => log::debug!("Withdrew {amount} cents from {user_id}, balance {balance}"),
            Err(e) => log::info!("Withdrawal of {amount} cents by {user_id} rejected: {e}"),
        }
        result
    }
}
