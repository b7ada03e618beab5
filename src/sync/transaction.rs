//! Minimal container-managed transaction driver.
//!
//! This is not a transaction manager: it only sequences the boundaries at
//! which synchronization callbacks fire around one business call.

use crate::error::{InvocationError, SyncError};
use crate::sync::SyncEvent;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Active,
    MarkedRollback,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub status: TransactionStatus,
}

impl Transaction {
    fn begin() -> Self {
        Self {
            id: NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed),
            status: TransactionStatus::Active,
        }
    }

    fn mark_rollback(&mut self) {
        if self.status == TransactionStatus::Active {
            self.status = TransactionStatus::MarkedRollback;
        }
    }

    fn complete(&mut self) -> bool {
        let committed = self.status == TransactionStatus::Active;
        self.status = if committed {
            TransactionStatus::Committed
        } else {
            TransactionStatus::RolledBack
        };
        committed
    }
}

/// Runs one business call inside a fresh transaction.
///
/// Sequence: begin, after-begin, business call, before-completion, commit,
/// after-completion. A failure in after-begin, the business call or
/// before-completion marks the transaction for rollback, skips the remaining
/// steps up to completion, and is returned after after-completion fired with
/// `committed = false`. After-completion failures are logged only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransactionScope;

impl TransactionScope {
    pub fn run<T, F, B>(
        &self,
        target: &mut T,
        mut fire: F,
        business: B,
    ) -> Result<Transaction, InvocationError>
    where
        T: ?Sized,
        F: FnMut(&SyncEvent, &mut T) -> Result<(), SyncError>,
        B: FnOnce(&mut T) -> Result<(), InvocationError>,
    {
        let mut tx = Transaction::begin();
        debug!(tx = tx.id, "transaction begun");

        let mut failure = fire(&SyncEvent::after_begin(), target)
            .err()
            .map(InvocationError::from);
        if failure.is_none() {
            failure = business(target).err();
        }
        if failure.is_none() {
            failure = fire(&SyncEvent::before_completion(), target)
                .err()
                .map(InvocationError::from);
        }
        if let Some(err) = &failure {
            debug!(tx = tx.id, error = %err, "transaction marked for rollback");
            tx.mark_rollback();
        }

        let committed = tx.complete();
        debug!(tx = tx.id, committed, "transaction completed");
        if let Err(err) = fire(&SyncEvent::after_completion(committed), target) {
            warn!(tx = tx.id, error = %err, "after-completion callback failed");
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(tx),
        }
    }
}
