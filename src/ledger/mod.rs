// ============================================================================
// Ledger Module - Wagering Ledger & Settlement Core
// ============================================================================
//
// The host-agnostic engine behind StakeChain:
//   - access: single-owner capability guard (plus optional resolver)
//   - registry: immutable event metadata and outcome options
//   - book: append-only record of stakes per event
//   - escrow: per-event custody totals and pull-based claimable balances
//   - settlement: proportional payout planning with dust/refund policy
//   - engine: the single state object that sequences every operation
//
// Nothing in here performs I/O. Funds move only through the host-supplied
// `FundsGateway`, and only from `place_bet` (in) and `claim` (out).
//
// ============================================================================

pub mod access;
pub mod book;
pub mod engine;
pub mod escrow;
pub mod registry;
pub mod settlement;

pub use access::*;
pub use book::*;
pub use engine::*;
pub use escrow::*;
pub use registry::*;
pub use settlement::*;

use chrono::{DateTime, Utc};

/// Opaque account identifier (wallet address, user id, ...)
pub type Account = String;

/// Event identifier, assigned monotonically from 1
pub type EventId = u64;

/// Bet identifier, assigned monotonically from 1
pub type BetId = u64;

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}
