// ============================================================================
// Settlement - Proportional Payout Planning
// ============================================================================
//
// Given a snapshot of an event's bets and the resolved outcome:
//
//   total_pool   = sum of every stake
//   winning_pool = sum of stakes on the winning outcome
//
// Normal case (winning_pool > 0):
//   payout(bet) = floor(bet.amount * total_pool / winning_pool)
//   dust        = total_pool - sum(payouts)        -> treasury
//   Each truncation loses less than one unit, so dust < number of winners.
//
// Refund case (winning_pool == 0):
//   Nobody backed the resolved outcome; every stake is returned as-is.
//
// Planning is pure. The engine commits a plan in one step and nothing here
// ever moves funds.
//
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Account, Bet, BetId, EventId};
use crate::errors::{LedgerError, Target};

/// Payout computed for one bet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub bet_id: BetId,
    pub bettor: Account,
    pub stake: u64,
    pub amount: u64,
}

/// Settlement record, kept for audit once committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub event_id: EventId,
    pub winning_outcome: usize,
    pub total_pool: u64,
    pub winning_pool: u64,
    /// Number of bets on the winning outcome
    pub winning_bets: usize,
    /// True when no bet matched the outcome and stakes were returned
    pub refunded: bool,
    /// One entry per bet, in placement order (losers carry 0)
    pub payouts: Vec<Payout>,
    /// Integer-division remainder credited to `treasury`
    pub dust: u64,
    pub treasury: Account,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Sum of per-bet payouts (excludes dust).
    pub fn distributed(&self) -> u64 {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    /// Claimable credits per account, dust folded into the treasury's share.
    pub fn credits(&self) -> BTreeMap<Account, u64> {
        let mut credits: BTreeMap<Account, u64> = BTreeMap::new();
        for payout in self.payouts.iter().filter(|p| p.amount > 0) {
            *credits.entry(payout.bettor.clone()).or_insert(0) += payout.amount;
        }
        if self.dust > 0 {
            *credits.entry(self.treasury.clone()).or_insert(0) += self.dust;
        }
        credits
    }
}

/// Computes settlements and keeps the committed records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEngine {
    settlements: BTreeMap<EventId, Settlement>,
}

impl SettlementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the distribution for `bets` without touching any state.
    ///
    /// `bets` must be every bet of `event_id`, in placement order.
    pub fn plan<'a, I>(
        event_id: EventId,
        winning_outcome: usize,
        bets: I,
        treasury: &str,
        settled_at: DateTime<Utc>,
    ) -> Result<Settlement, LedgerError>
    where
        I: IntoIterator<Item = &'a Bet>,
    {
        let bets: Vec<&Bet> = bets.into_iter().collect();

        let mut total_pool: u64 = 0;
        let mut winning_pool: u64 = 0;
        let mut winning_bets = 0;
        for bet in &bets {
            total_pool = total_pool
                .checked_add(bet.amount)
                .ok_or(LedgerError::Overflow)?;
            if bet.outcome_index == winning_outcome {
                winning_pool += bet.amount;
                winning_bets += 1;
            }
        }

        let refunded = winning_pool == 0;
        let payouts: Vec<Payout> = bets
            .iter()
            .map(|bet| {
                let amount = if refunded {
                    bet.amount
                } else if bet.outcome_index == winning_outcome {
                    prorate(bet.amount, total_pool, winning_pool)
                } else {
                    0
                };
                Payout {
                    bet_id: bet.id,
                    bettor: bet.bettor.clone(),
                    stake: bet.amount,
                    amount,
                }
            })
            .collect();

        let distributed: u64 = payouts.iter().map(|p| p.amount).sum();
        let dust = total_pool - distributed;

        Ok(Settlement {
            event_id,
            winning_outcome,
            total_pool,
            winning_pool,
            winning_bets,
            refunded,
            payouts,
            dust,
            treasury: treasury.to_string(),
            settled_at,
        })
    }

    pub fn get(&self, event_id: EventId) -> Result<&Settlement, LedgerError> {
        self.settlements
            .get(&event_id)
            .ok_or(LedgerError::NotFound(Target::Settlement(event_id)))
    }

    pub fn is_settled(&self, event_id: EventId) -> bool {
        self.settlements.contains_key(&event_id)
    }

    pub(crate) fn record(&mut self, settlement: Settlement) -> &Settlement {
        let event_id = settlement.event_id;
        self.settlements.entry(event_id).or_insert(settlement)
    }

    pub fn all(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }
}

/// floor(amount * total / winning), computed in u128.
///
/// The result never exceeds `total`, so it always fits back into u64.
fn prorate(amount: u64, total: u64, winning: u64) -> u64 {
    (amount as u128 * total as u128 / winning as u128) as u64
}
