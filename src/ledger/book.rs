//! Bet book
//!
//! Append-only record of stakes. A bet is never removed; after it is
//! recorded only its settlement `payout` (written once, at settlement) and
//! its `claimed` flag (false -> true once, on a successful claim) change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{now, Account, BetId, Event, EventId};
use crate::errors::{LedgerError, Target};

/// A stake placed by an account against one outcome of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    /// Unique bet ID
    pub id: BetId,

    /// Event the stake is held against
    pub event_id: EventId,

    /// Account that placed the bet
    pub bettor: Account,

    /// Amount staked, in the smallest currency unit
    pub amount: u64,

    /// Outcome index chosen (0-based)
    pub outcome_index: usize,

    /// Timestamp of bet
    pub placed_at: DateTime<Utc>,

    /// Payout owed to this bet (None until settled, 0 for losing bets)
    pub payout: Option<u64>,

    /// Set once the payout has left escrow
    pub claimed: bool,
}

impl Bet {
    pub fn is_winner(&self) -> bool {
        self.payout.is_some_and(|p| p > 0)
    }
}

/// Check a stake against the event it targets, in precondition order.
pub fn validate_stake(event: &Event, outcome_index: usize, amount: u64) -> Result<(), LedgerError> {
    if !event.is_open() {
        return Err(LedgerError::EventClosed { event_id: event.id });
    }
    event.check_outcome(outcome_index)?;
    if amount == 0 {
        return Err(LedgerError::InsufficientAmount);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetBook {
    /// All bets; bet `id` lives at index `id - 1`
    bets: Vec<Bet>,

    /// Bet ids per event, in placement order
    by_event: BTreeMap<EventId, Vec<BetId>>,
}

impl BetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated stake and return its id.
    pub(crate) fn append(
        &mut self,
        event_id: EventId,
        bettor: &str,
        outcome_index: usize,
        amount: u64,
    ) -> BetId {
        let id = self.bets.len() as BetId + 1;
        self.bets.push(Bet {
            id,
            event_id,
            bettor: bettor.to_string(),
            amount,
            outcome_index,
            placed_at: now(),
            payout: None,
            claimed: false,
        });
        self.by_event.entry(event_id).or_default().push(id);
        id
    }

    pub fn get(&self, id: BetId) -> Result<&Bet, LedgerError> {
        slot(id)
            .and_then(|index| self.bets.get(index))
            .ok_or(LedgerError::NotFound(Target::Bet(id)))
    }

    /// All bets for an event, in placement order.
    pub fn bets_for_event(&self, event_id: EventId) -> impl Iterator<Item = &Bet> + '_ {
        self.by_event
            .get(&event_id)
            .into_iter()
            .flatten()
            .filter_map(move |id| slot(*id).and_then(|index| self.bets.get(index)))
    }

    /// Sum of all stakes recorded for an event.
    pub fn staked_total(&self, event_id: EventId) -> u64 {
        self.bets_for_event(event_id).map(|b| b.amount).sum()
    }

    pub fn all(&self) -> &[Bet] {
        &self.bets
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub(crate) fn record_payout(&mut self, id: BetId, payout: u64) {
        if let Some(bet) = slot(id).and_then(|index| self.bets.get_mut(index)) {
            bet.payout = Some(payout);
        }
    }

    /// Flag every unclaimed paying bet of `bettor` on `event_id` as claimed.
    ///
    /// Returns the ids flipped so a failed transfer can undo exactly these.
    pub(crate) fn mark_claimed(&mut self, event_id: EventId, bettor: &str) -> Vec<BetId> {
        let ids: Vec<BetId> = self
            .bets_for_event(event_id)
            .filter(|b| b.bettor == bettor && b.is_winner() && !b.claimed)
            .map(|b| b.id)
            .collect();

        for id in &ids {
            if let Some(bet) = slot(*id).and_then(|index| self.bets.get_mut(index)) {
                bet.claimed = true;
            }
        }
        ids
    }

    pub(crate) fn unmark_claimed(&mut self, ids: &[BetId]) {
        for id in ids {
            if let Some(bet) = slot(*id).and_then(|index| self.bets.get_mut(index)) {
                bet.claimed = false;
            }
        }
    }
}

/// Vec index of bet `id`; `None` for id 0, which is never assigned.
fn slot(id: BetId) -> Option<usize> {
    id.checked_sub(1).map(|index| index as usize)
}
