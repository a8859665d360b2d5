// Request/response models for the StakeChain API

use serde::{Deserialize, Serialize};

use crate::events::Notification;
use crate::ledger::{Account, Bet, BetId, Event, EventId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub event_id: EventId,
}

/// Event plus its live escrow total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub held_total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetsResponse {
    pub event_id: EventId,
    pub bets: Vec<Bet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBetRequest {
    pub outcome_index: usize,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBetResponse {
    pub bet_id: BetId,
    pub event_id: EventId,
    pub held_total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleRequest {
    pub winning_outcome: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub event_id: EventId,
    pub account: Account,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimableResponse {
    pub event_id: EventId,
    pub account: Account,
    pub claimable: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverRequest {
    pub resolver: Option<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerResponse {
    pub owner: Account,
    pub resolver: Option<Account>,
    pub creation_restricted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationPolicyRequest {
    pub restricted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    pub account: Account,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account: Account,
    pub balance: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsQuery {
    /// Return notifications with `seq` strictly greater than this
    pub after: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub last_seq: u64,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneQuery {
    /// Drop notifications with `seq` up to and including this
    pub through: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneResponse {
    pub dropped: usize,
    pub last_seq: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResponse {
    pub healthy: bool,
    pub violation: Option<String>,
    pub state_digest: String,
}
