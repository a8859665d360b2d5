//! Ledger error types
//!
//! Every engine operation reports failures through `LedgerError`. Each
//! variant is detected before any state is mutated, so an `Err` always means
//! the ledger looks exactly as it did before the call.

use thiserror::Error;

use crate::ledger::{Account, BetId, EventId};

/// What a `NotFound` error failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Event(EventId),
    Bet(BetId),
    Settlement(EventId),
    Claim { event_id: EventId, account: Account },
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Event(id) => write!(f, "event {}", id),
            Target::Bet(id) => write!(f, "bet {}", id),
            Target::Settlement(id) => write!(f, "settlement for event {}", id),
            Target::Claim { event_id, account } => {
                write!(f, "claimable balance for {} on event {}", account, event_id)
            }
        }
    }
}

/// Engine error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: {caller} may not perform this operation")]
    Unauthorized { caller: Account },

    #[error("Not found: {0}")]
    NotFound(Target),

    #[error("Invalid options: {reason}")]
    InvalidOptions { reason: String },

    #[error("Invalid outcome {index}: event has {options} options")]
    InvalidOutcome { index: usize, options: usize },

    #[error("Event {event_id} is closed for betting")]
    EventClosed { event_id: EventId },

    #[error("Stake amount must be positive")]
    InsufficientAmount,

    #[error("Event {event_id} is already settled")]
    AlreadySettled { event_id: EventId },

    #[error("Transfer failed: {reason}")]
    TransferFailure { reason: String },

    #[error("Arithmetic overflow in escrow accounting")]
    Overflow,
}

impl LedgerError {
    /// Stable machine-readable code, used by the HTTP layer and the feed.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized { .. } => "UNAUTHORIZED",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::InvalidOptions { .. } => "INVALID_OPTIONS",
            LedgerError::InvalidOutcome { .. } => "INVALID_OUTCOME",
            LedgerError::EventClosed { .. } => "EVENT_CLOSED",
            LedgerError::InsufficientAmount => "INSUFFICIENT_AMOUNT",
            LedgerError::AlreadySettled { .. } => "ALREADY_SETTLED",
            LedgerError::TransferFailure { .. } => "TRANSFER_FAILURE",
            LedgerError::Overflow => "OVERFLOW",
        }
    }

    pub(crate) fn unauthorized(caller: &str) -> Self {
        LedgerError::Unauthorized {
            caller: caller.to_string(),
        }
    }
}

/// Configuration errors raised while reading the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("Invalid seed event: {0}")]
    InvalidSeedEvent(String),
}

/// Failures while saving or loading persisted state.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("State file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
