//! Ledger notifications
//!
//! Immutable records emitted by committed operations. An external indexer
//! replays them (in `seq` order) to build queryable history; the engine keeps
//! no secondary indices of its own beyond per-event bet enumeration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{Account, BetId, EventId};

/// A new event was registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCreated {
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
}

/// A stake was accepted into escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetPlaced {
    pub event_id: EventId,
    pub bet_id: BetId,
    pub bettor: Account,
    pub amount: u64,
    pub outcome_index: usize,
}

/// An event was resolved and its payouts recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settled {
    pub event_id: EventId,
    pub winning_outcome: usize,
}

/// A claimable balance left escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutClaimed {
    pub event_id: EventId,
    pub bettor: Account,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Account,
    pub new_owner: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverChanged {
    pub resolver: Option<Account>,
}

/// Event creation switched between owner-only and open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationPolicyChanged {
    pub restricted: bool,
}

/// Enum wrapper for all ledger notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    EventCreated(EventCreated),
    BetPlaced(BetPlaced),
    Settled(Settled),
    PayoutClaimed(PayoutClaimed),
    OwnershipTransferred(OwnershipTransferred),
    ResolverChanged(ResolverChanged),
    CreationPolicyChanged(CreationPolicyChanged),
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::EventCreated(_) => "EventCreated",
            LedgerEvent::BetPlaced(_) => "BetPlaced",
            LedgerEvent::Settled(_) => "Settled",
            LedgerEvent::PayoutClaimed(_) => "PayoutClaimed",
            LedgerEvent::OwnershipTransferred(_) => "OwnershipTransferred",
            LedgerEvent::ResolverChanged(_) => "ResolverChanged",
            LedgerEvent::CreationPolicyChanged(_) => "CreationPolicyChanged",
        }
    }
}

/// Sequenced envelope stored in the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Strictly increasing, starting at 1
    pub seq: u64,
    /// Stable identifier for indexer de-duplication
    pub id: Uuid,
    pub emitted_at: DateTime<Utc>,
    pub event: LedgerEvent,
}
