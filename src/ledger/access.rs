//! Single-owner access control
//!
//! One owner holds every privileged capability. The owner may additionally
//! delegate settlement authority to a resolver account; the resolver can
//! settle events but cannot change policy or ownership.

use serde::{Deserialize, Serialize};

use super::Account;
use crate::errors::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Account,
    resolver: Option<Account>,
}

impl AccessControl {
    pub fn new(owner: impl Into<Account>) -> Self {
        Self {
            owner: owner.into(),
            resolver: None,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn resolver(&self) -> Option<&str> {
        self.resolver.as_deref()
    }

    pub fn is_owner(&self, caller: &str) -> bool {
        self.owner == caller
    }

    /// Owner, or the delegated resolver when one is set.
    pub fn can_settle(&self, caller: &str) -> bool {
        self.is_owner(caller) || self.resolver.as_deref() == Some(caller)
    }

    pub fn require_owner(&self, caller: &str) -> Result<(), LedgerError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            tracing::warn!(caller, owner = %self.owner, "privileged call rejected");
            Err(LedgerError::unauthorized(caller))
        }
    }

    pub fn require_settler(&self, caller: &str) -> Result<(), LedgerError> {
        if self.can_settle(caller) {
            Ok(())
        } else {
            tracing::warn!(caller, owner = %self.owner, "settlement call rejected");
            Err(LedgerError::unauthorized(caller))
        }
    }

    /// Hand every privileged capability to `new_owner` at once.
    ///
    /// Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &str,
        new_owner: impl Into<Account>,
    ) -> Result<Account, LedgerError> {
        self.require_owner(caller)?;
        Ok(std::mem::replace(&mut self.owner, new_owner.into()))
    }

    pub fn set_resolver(
        &mut self,
        caller: &str,
        resolver: Option<Account>,
    ) -> Result<(), LedgerError> {
        self.require_owner(caller)?;
        self.resolver = resolver;
        Ok(())
    }
}
