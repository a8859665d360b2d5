//! Escrow custody
//!
//! Per event, `held_total` is the sum of everything escrow still owes: every
//! stake before settlement, every unclaimed payout (dust included) after it.
//! Claimable balances only exist after settlement. This is the only module
//! that writes escrow state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::{Account, EventId};
use crate::errors::{LedgerError, Target};

/// A rejected fund movement, reported by the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransferError(pub String);

impl From<TransferError> for LedgerError {
    fn from(err: TransferError) -> Self {
        LedgerError::TransferFailure { reason: err.0 }
    }
}

/// Host seam that actually moves money in and out of engine custody.
///
/// Implementations must be all-or-nothing: on `Err` no funds moved.
pub trait FundsGateway {
    /// Move `amount` from `from` into custody (stake).
    fn collect(&mut self, from: &str, amount: u64) -> Result<(), TransferError>;

    /// Move `amount` out of custody to `to` (claim).
    fn disburse(&mut self, to: &str, amount: u64) -> Result<(), TransferError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowBalance {
    pub held_total: u64,
    pub claimable: BTreeMap<Account, u64>,
}

impl EscrowBalance {
    pub fn claimable_total(&self) -> u64 {
        self.claimable.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowAccount {
    balances: BTreeMap<EventId, EscrowBalance>,
}

impl EscrowAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, event_id: EventId) -> Option<&EscrowBalance> {
        self.balances.get(&event_id)
    }

    pub fn held_total(&self, event_id: EventId) -> u64 {
        self.balances.get(&event_id).map_or(0, |b| b.held_total)
    }

    pub fn claimable(&self, event_id: EventId, account: &str) -> u64 {
        self.balances
            .get(&event_id)
            .and_then(|b| b.claimable.get(account))
            .copied()
            .unwrap_or(0)
    }

    /// Pull a stake into custody. The transfer and the escrow credit commit
    /// together; if the gateway rejects, escrow is untouched.
    pub(crate) fn deposit<G: FundsGateway + ?Sized>(
        &mut self,
        event_id: EventId,
        from: &str,
        amount: u64,
        funds: &mut G,
    ) -> Result<(), LedgerError> {
        let new_total = self
            .held_total(event_id)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        funds.collect(from, amount)?;

        self.balances.entry(event_id).or_default().held_total = new_total;
        Ok(())
    }

    /// Record settlement credits. No funds move here.
    ///
    /// Credits must come from a plan whose total equals `held_total`.
    pub(crate) fn credit_claimable(&mut self, event_id: EventId, credits: BTreeMap<Account, u64>) {
        let balance = self.balances.entry(event_id).or_default();
        for (account, amount) in credits {
            if amount > 0 {
                *balance.claimable.entry(account).or_insert(0) += amount;
            }
        }
    }

    /// Zero `account`'s claimable balance and release it from `held_total`.
    ///
    /// This is the effects half of a claim; `restore_claimable` undoes it if
    /// the outbound transfer fails.
    pub(crate) fn take_claimable(&mut self, event_id: EventId, account: &str) -> Result<u64, LedgerError> {
        let not_found = || {
            LedgerError::NotFound(Target::Claim {
                event_id,
                account: account.to_string(),
            })
        };

        let balance = self.balances.get_mut(&event_id).ok_or_else(not_found)?;
        let amount = match balance.claimable.get(account) {
            Some(&amount) if amount > 0 => amount,
            _ => return Err(not_found()),
        };

        balance.claimable.insert(account.to_string(), 0);
        balance.held_total = balance.held_total.saturating_sub(amount);
        Ok(amount)
    }

    pub(crate) fn restore_claimable(&mut self, event_id: EventId, account: &str, amount: u64) {
        let balance = self.balances.entry(event_id).or_default();
        balance.claimable.insert(account.to_string(), amount);
        balance.held_total += amount;
    }

    pub fn events(&self) -> impl Iterator<Item = (&EventId, &EscrowBalance)> {
        self.balances.iter()
    }
}
