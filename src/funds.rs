//! In-memory funds gateway
//!
//! Reference `FundsGateway` backed by a balance map. Stakes move from an
//! account into a single custody pot and payouts move back out. Accounts can
//! be marked as rejecting destinations to model recipients that refuse an
//! inbound transfer.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::ledger::{Account, FundsGateway, TransferError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryFunds {
    balances: BTreeMap<Account, u64>,
    /// Funds currently held on behalf of the ledger
    custody: u64,
    #[serde(default)]
    rejecting: BTreeSet<Account>,
}

impl InMemoryFunds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `account` from outside the ledger. Returns the new balance.
    pub fn deposit(&mut self, account: &str, amount: u64) -> Result<u64, TransferError> {
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError(format!("balance overflow for {}", account)))?;
        Ok(*balance)
    }

    pub fn balance(&self, account: &str) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn custody(&self) -> u64 {
        self.custody
    }

    /// Make every future payout to `account` fail.
    pub fn reject_destination(&mut self, account: &str) {
        self.rejecting.insert(account.to_string());
    }

    pub fn accept_destination(&mut self, account: &str) {
        self.rejecting.remove(account);
    }
}

impl FundsGateway for InMemoryFunds {
    fn collect(&mut self, from: &str, amount: u64) -> Result<(), TransferError> {
        let available = self.balance(from);
        if available < amount {
            return Err(TransferError(format!(
                "insufficient funds for {}: required {}, available {}",
                from, amount, available
            )));
        }
        let custody = self
            .custody
            .checked_add(amount)
            .ok_or_else(|| TransferError("custody overflow".to_string()))?;

        self.balances.insert(from.to_string(), available - amount);
        self.custody = custody;
        Ok(())
    }

    fn disburse(&mut self, to: &str, amount: u64) -> Result<(), TransferError> {
        if self.rejecting.contains(to) {
            return Err(TransferError(format!("destination {} rejected transfer", to)));
        }
        if self.custody < amount {
            return Err(TransferError(format!(
                "custody holds {}, cannot pay {}",
                self.custody, amount
            )));
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| TransferError(format!("balance overflow for {}", to)))?;

        self.custody -= amount;
        self.balances.insert(to.to_string(), credited);
        Ok(())
    }
}
