//! StakeChain engine
//!
//! One explicit state object holding events, bets, escrow and settlement
//! records. Every public operation either commits all of its effects (and
//! appends its notifications) or returns an error with the state untouched.
//! Exclusivity comes from the host applying operations one at a time; the
//! engine has no locks of its own.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use super::{
    now, validate_options, validate_stake, AccessControl, Account, Bet, BetBook, BetId,
    EscrowAccount, Event, EventId, EventRegistry, FundsGateway, Settlement, SettlementEngine,
};
use crate::config::EngineConfig;
use crate::errors::LedgerError;
use crate::events::{
    BetPlaced, CreationPolicyChanged, EventCreated, LedgerEvent, Notification,
    OwnershipTransferred, PayoutClaimed, ResolverChanged, Settled,
};

/// First invariant violation found by `StakeChain::audit`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditViolation {
    #[error("event {event_id} has an invalid option set")]
    InvalidOptions { event_id: EventId },

    #[error("bet {bet_id} targets outcome {outcome_index} outside its event's options")]
    OutcomeOutOfRange { bet_id: BetId, outcome_index: usize },

    #[error("bet {bet_id} references unknown event {event_id}")]
    OrphanBet { bet_id: BetId, event_id: EventId },

    #[error("event {event_id} escrow holds {held} but owes {owed}")]
    EscrowMismatch { event_id: EventId, held: u64, owed: u64 },

    #[error("event {event_id} settlement does not add up to its pool")]
    PayoutMismatch { event_id: EventId },

    #[error("event {event_id} settlement flags disagree with its record")]
    SettlementMismatch { event_id: EventId },

    #[error("bet {bet_id} is claimed without a payout")]
    ClaimWithoutPayout { bet_id: BetId },

    #[error("bet {bet_id} is stored at position {position}")]
    BetOutOfSequence { bet_id: BetId, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeChain {
    access: AccessControl,
    registry: EventRegistry,
    book: BetBook,
    escrow: EscrowAccount,
    settlements: SettlementEngine,
    /// Fixed dust recipient; `None` follows the current owner
    treasury: Option<Account>,
    outbox: Vec<Notification>,
    /// Notifications dropped from the front of `outbox`
    #[serde(default)]
    pruned: u64,
}

impl StakeChain {
    /// Bootstrap a ledger. Registers the seed event, if any, as the owner.
    pub fn new(config: EngineConfig) -> Result<Self, LedgerError> {
        let mut chain = Self {
            access: AccessControl::new(config.owner.clone()),
            registry: EventRegistry::new(config.creation_restricted),
            book: BetBook::new(),
            escrow: EscrowAccount::new(),
            settlements: SettlementEngine::new(),
            treasury: config.treasury.clone(),
            outbox: Vec::new(),
            pruned: 0,
        };

        if let Some(seed) = config.seed_event {
            let owner = config.owner;
            chain.create_event(&owner, seed.title, seed.description, seed.options)?;
        }

        tracing::info!(
            owner = %chain.access.owner(),
            treasury = %chain.treasury(),
            creation_restricted = chain.registry.creation_restricted(),
            "ledger initialized"
        );
        Ok(chain)
    }

    // ───────────────────────── Policy ─────────────────────────

    pub fn owner(&self) -> &str {
        self.access.owner()
    }

    pub fn resolver(&self) -> Option<&str> {
        self.access.resolver()
    }

    /// Account credited with rounding dust at settlement.
    pub fn treasury(&self) -> &str {
        self.treasury.as_deref().unwrap_or(self.access.owner())
    }

    /// Fails `Unauthorized` unless `caller` is the owner.
    pub fn require_owner(&self, caller: &str) -> Result<(), LedgerError> {
        self.access.require_owner(caller)
    }

    pub fn creation_restricted(&self) -> bool {
        self.registry.creation_restricted()
    }

    pub fn transfer_ownership(&mut self, caller: &str, new_owner: &str) -> Result<(), LedgerError> {
        let previous = self.access.transfer_ownership(caller, new_owner)?;
        tracing::info!(previous = %previous, new_owner, "ownership transferred");
        self.emit(LedgerEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: previous,
            new_owner: new_owner.to_string(),
        }));
        Ok(())
    }

    /// Delegate (or revoke) settlement authority. Owner-only.
    pub fn set_resolver(&mut self, caller: &str, resolver: Option<Account>) -> Result<(), LedgerError> {
        self.access.set_resolver(caller, resolver.clone())?;
        tracing::info!(resolver = ?resolver, "resolver changed");
        self.emit(LedgerEvent::ResolverChanged(ResolverChanged { resolver }));
        Ok(())
    }

    pub fn set_creation_restricted(&mut self, caller: &str, restricted: bool) -> Result<(), LedgerError> {
        self.access.require_owner(caller)?;
        self.registry.set_creation_restricted(restricted);
        tracing::info!(restricted, "creation policy changed");
        self.emit(LedgerEvent::CreationPolicyChanged(CreationPolicyChanged { restricted }));
        Ok(())
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn create_event(
        &mut self,
        caller: &str,
        title: String,
        description: String,
        options: Vec<String>,
    ) -> Result<EventId, LedgerError> {
        if self.registry.creation_restricted() {
            self.access.require_owner(caller)?;
        }
        if let Err(err) = validate_options(&options) {
            tracing::debug!(caller, error = %err, "event rejected");
            return Err(err);
        }

        let event = self.registry.create_event(caller, title, description, options)?;
        let created = EventCreated {
            event_id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            options: event.options.clone(),
        };

        tracing::info!(event_id = created.event_id, title = %created.title, caller, "event created");
        let event_id = created.event_id;
        self.emit(LedgerEvent::EventCreated(created));
        Ok(event_id)
    }

    pub fn get_event(&self, event_id: EventId) -> Result<&Event, LedgerError> {
        self.registry.get_event(event_id)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.registry.events()
    }

    // ───────────────────────── Bets ─────────────────────────

    /// Stake `amount` on `outcome_index`. Funds are collected from `caller`
    /// through `funds`; if that transfer fails no bet is recorded.
    pub fn place_bet<G: FundsGateway + ?Sized>(
        &mut self,
        caller: &str,
        event_id: EventId,
        outcome_index: usize,
        amount: u64,
        funds: &mut G,
    ) -> Result<BetId, LedgerError> {
        let event = self.registry.get_event(event_id)?;
        if let Err(err) = validate_stake(event, outcome_index, amount) {
            tracing::debug!(caller, event_id, outcome_index, amount, error = %err, "bet rejected");
            return Err(err);
        }

        if let Err(err) = self.escrow.deposit(event_id, caller, amount, funds) {
            tracing::warn!(caller, event_id, amount, error = %err, "stake collection failed");
            return Err(err);
        }
        let bet_id = self.book.append(event_id, caller, outcome_index, amount);

        tracing::info!(event_id, bet_id, bettor = caller, amount, outcome_index, "bet placed");
        self.emit(LedgerEvent::BetPlaced(BetPlaced {
            event_id,
            bet_id,
            bettor: caller.to_string(),
            amount,
            outcome_index,
        }));
        Ok(bet_id)
    }

    pub fn get_bet(&self, bet_id: BetId) -> Result<&Bet, LedgerError> {
        self.book.get(bet_id)
    }

    /// All bets of an event, in placement order.
    pub fn bets_for_event(&self, event_id: EventId) -> Result<Vec<&Bet>, LedgerError> {
        self.registry.get_event(event_id)?;
        Ok(self.book.bets_for_event(event_id).collect())
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Resolve `event_id` to `winning_outcome` and record claimable payouts.
    ///
    /// Never moves funds. A second call fails `AlreadySettled` and changes
    /// nothing.
    pub fn settle(
        &mut self,
        caller: &str,
        event_id: EventId,
        winning_outcome: usize,
    ) -> Result<&Settlement, LedgerError> {
        self.access.require_settler(caller)?;
        let event = self.registry.get_event(event_id)?;
        if event.settled {
            tracing::warn!(caller, event_id, "repeated settlement rejected");
            return Err(LedgerError::AlreadySettled { event_id });
        }
        event.check_outcome(winning_outcome)?;

        let settled_at = now();
        let plan = SettlementEngine::plan(
            event_id,
            winning_outcome,
            self.book.bets_for_event(event_id),
            self.treasury(),
            settled_at,
        )?;

        // Commit: nothing below can fail once the event is flagged
        self.registry.mark_settled(event_id, winning_outcome, settled_at)?;
        for payout in &plan.payouts {
            self.book.record_payout(payout.bet_id, payout.amount);
        }
        self.escrow.credit_claimable(event_id, plan.credits());

        tracing::info!(
            event_id,
            winning_outcome,
            total_pool = plan.total_pool,
            winning_pool = plan.winning_pool,
            dust = plan.dust,
            refunded = plan.refunded,
            "event settled"
        );
        self.emit(LedgerEvent::Settled(Settled {
            event_id,
            winning_outcome,
        }));
        Ok(self.settlements.record(plan))
    }

    pub fn get_settlement(&self, event_id: EventId) -> Result<&Settlement, LedgerError> {
        self.settlements.get(event_id)
    }

    // ───────────────────────── Claims ─────────────────────────

    /// Withdraw `caller`'s claimable balance for `event_id`.
    ///
    /// The balance is zeroed and bets flagged before the outbound transfer;
    /// if the transfer fails both are restored and `TransferFailure` is
    /// returned.
    pub fn claim<G: FundsGateway + ?Sized>(
        &mut self,
        caller: &str,
        event_id: EventId,
        funds: &mut G,
    ) -> Result<u64, LedgerError> {
        self.registry.get_event(event_id)?;

        let amount = self.escrow.take_claimable(event_id, caller)?;
        let flagged = self.book.mark_claimed(event_id, caller);

        if let Err(err) = funds.disburse(caller, amount) {
            self.book.unmark_claimed(&flagged);
            self.escrow.restore_claimable(event_id, caller, amount);
            tracing::warn!(caller, event_id, amount, error = %err, "payout transfer failed");
            return Err(err.into());
        }

        tracing::info!(event_id, bettor = caller, amount, "payout claimed");
        self.emit(LedgerEvent::PayoutClaimed(PayoutClaimed {
            event_id,
            bettor: caller.to_string(),
            amount,
        }));
        Ok(amount)
    }

    pub fn claimable(&self, event_id: EventId, account: &str) -> u64 {
        self.escrow.claimable(event_id, account)
    }

    pub fn held_total(&self, event_id: EventId) -> u64 {
        self.escrow.held_total(event_id)
    }

    // ───────────────────────── Feed & audit ─────────────────────────

    /// Retained notifications with `seq > after`, oldest first.
    pub fn notifications_since(&self, after: u64) -> &[Notification] {
        // seq n lives at index n - pruned - 1
        let start = after.saturating_sub(self.pruned).min(self.outbox.len() as u64);
        &self.outbox[start as usize..]
    }

    pub fn last_seq(&self) -> u64 {
        self.pruned + self.outbox.len() as u64
    }

    /// Drop notifications with `seq <= through` once an indexer has stored
    /// them. Owner-only. Sequence numbers are never reused.
    pub fn prune_notifications(&mut self, caller: &str, through: u64) -> Result<usize, LedgerError> {
        self.access.require_owner(caller)?;
        let count = through
            .saturating_sub(self.pruned)
            .min(self.outbox.len() as u64) as usize;
        self.outbox.drain(..count);
        self.pruned += count as u64;
        tracing::info!(through, dropped = count, "notifications pruned");
        Ok(count)
    }

    /// Check every ledger invariant over the whole state.
    pub fn audit(&self) -> Result<(), AuditViolation> {
        for event in self.registry.events() {
            if validate_options(&event.options).is_err() {
                return Err(AuditViolation::InvalidOptions { event_id: event.id });
            }

            let record = self.settlements.get(event.id).ok();
            if event.settled != record.is_some()
                || event.winning_outcome != record.map(|s| s.winning_outcome)
            {
                return Err(AuditViolation::SettlementMismatch { event_id: event.id });
            }

            let held = self.escrow.held_total(event.id);
            let owed = match record {
                None => self.book.staked_total(event.id),
                Some(settlement) => {
                    if settlement.distributed() + settlement.dust != settlement.total_pool
                        || settlement.total_pool != self.book.staked_total(event.id)
                    {
                        return Err(AuditViolation::PayoutMismatch { event_id: event.id });
                    }
                    self.escrow
                        .balance(event.id)
                        .map_or(0, |b| b.claimable_total())
                }
            };
            if held != owed {
                return Err(AuditViolation::EscrowMismatch {
                    event_id: event.id,
                    held,
                    owed,
                });
            }
        }

        for (position, bet) in self.book.all().iter().enumerate() {
            if bet.id != position as u64 + 1 {
                return Err(AuditViolation::BetOutOfSequence {
                    bet_id: bet.id,
                    position,
                });
            }
            let event = self
                .registry
                .get_event(bet.event_id)
                .map_err(|_| AuditViolation::OrphanBet {
                    bet_id: bet.id,
                    event_id: bet.event_id,
                })?;
            if bet.outcome_index >= event.options.len() {
                return Err(AuditViolation::OutcomeOutOfRange {
                    bet_id: bet.id,
                    outcome_index: bet.outcome_index,
                });
            }
            if bet.claimed && !bet.is_winner() {
                return Err(AuditViolation::ClaimWithoutPayout { bet_id: bet.id });
            }
        }

        Ok(())
    }

    /// Hex SHA-256 over the canonical JSON form of the full state.
    pub fn state_digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    fn emit(&mut self, event: LedgerEvent) {
        let notification = Notification {
            seq: self.last_seq() + 1,
            id: Uuid::new_v4(),
            emitted_at: now(),
            event,
        };
        tracing::info!(seq = notification.seq, kind = notification.event.name(), "notification emitted");
        self.outbox.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedEvent;
    use crate::errors::Target;
    use crate::funds::InMemoryFunds;

    fn yes_no() -> Vec<String> {
        vec!["Yes".to_string(), "No".to_string()]
    }

    fn setup() -> (StakeChain, InMemoryFunds) {
        let chain = StakeChain::new(EngineConfig::new("owner").with_treasury("treasury")).unwrap();
        let mut funds = InMemoryFunds::new();
        for account in ["alice", "bob", "carol"] {
            funds.deposit(account, 100).unwrap();
        }
        (chain, funds)
    }

    #[test]
    fn test_seed_event_registered_by_owner() {
        let config = EngineConfig::new("owner").with_seed_event(SeedEvent {
            title: "ETH<2000 by Sept30".to_string(),
            description: String::new(),
            options: yes_no(),
        });
        let chain = StakeChain::new(config).unwrap();
        let event = chain.get_event(1).unwrap();
        assert_eq!(event.creator, "owner");
        assert_eq!(chain.last_seq(), 1);
        assert_eq!(chain.treasury(), "owner");
    }

    #[test]
    fn test_invalid_seed_event_fails_bootstrap() {
        let config = EngineConfig::new("owner").with_seed_event(SeedEvent {
            title: "bad".to_string(),
            description: String::new(),
            options: vec!["Only".to_string()],
        });
        assert!(matches!(
            StakeChain::new(config),
            Err(LedgerError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_creation_policy() {
        let (mut chain, _) = setup();
        assert!(chain
            .create_event("alice", "open".into(), "".into(), yes_no())
            .is_ok());

        chain.set_creation_restricted("owner", true).unwrap();
        assert_eq!(
            chain.create_event("alice", "closed".into(), "".into(), yes_no()),
            Err(LedgerError::Unauthorized {
                caller: "alice".to_string()
            })
        );
        assert!(chain
            .create_event("owner", "closed".into(), "".into(), yes_no())
            .is_ok());
        assert!(chain.set_creation_restricted("alice", false).is_err());
    }

    #[test]
    fn test_place_bet_moves_funds_into_escrow() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();

        let bet_id = chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
        assert_eq!(bet_id, 1);
        assert_eq!(chain.held_total(event_id), 10);
        assert_eq!(funds.balance("alice"), 90);
        assert_eq!(funds.custody(), 10);
    }

    #[test]
    fn test_unfunded_bet_is_not_recorded() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        let before = chain.clone();

        let err = chain
            .place_bet("alice", event_id, 0, 1_000, &mut funds)
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransferFailure { .. }));
        assert_eq!(chain, before);
    }

    #[test]
    fn test_place_bet_unknown_event() {
        let (mut chain, mut funds) = setup();
        assert_eq!(
            chain.place_bet("alice", 42, 0, 10, &mut funds),
            Err(LedgerError::NotFound(Target::Event(42)))
        );
    }

    #[test]
    fn test_settle_precondition_order() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();

        // Unauthorized wins over every other failure
        assert!(matches!(
            chain.settle("alice", 99, 5),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            chain.settle("owner", 99, 5),
            Err(LedgerError::NotFound(Target::Event(99)))
        ));
        assert!(matches!(
            chain.settle("owner", event_id, 5),
            Err(LedgerError::InvalidOutcome { .. })
        ));

        chain.settle("owner", event_id, 0).unwrap();
        assert_eq!(
            chain.settle("owner", event_id, 5).unwrap_err(),
            LedgerError::AlreadySettled { event_id }
        );
    }

    #[test]
    fn test_resolver_may_settle() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.place_bet("alice", event_id, 1, 10, &mut funds).unwrap();

        assert!(chain.settle("oracle", event_id, 1).is_err());
        chain
            .set_resolver("owner", Some("oracle".to_string()))
            .unwrap();
        assert!(chain.settle("oracle", event_id, 1).is_ok());
    }

    #[test]
    fn test_claim_round_trip() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
        chain.place_bet("bob", event_id, 1, 30, &mut funds).unwrap();
        chain.settle("owner", event_id, 0).unwrap();

        assert_eq!(chain.claimable(event_id, "alice"), 40);
        assert_eq!(chain.claim("alice", event_id, &mut funds), Ok(40));
        assert_eq!(funds.balance("alice"), 130);
        assert_eq!(chain.held_total(event_id), 0);
        assert!(chain.get_bet(1).unwrap().claimed);
        assert!(!chain.get_bet(2).unwrap().claimed);

        assert!(matches!(
            chain.claim("alice", event_id, &mut funds),
            Err(LedgerError::NotFound(Target::Claim { .. }))
        ));
        assert!(matches!(
            chain.claim("bob", event_id, &mut funds),
            Err(LedgerError::NotFound(_))
        ));
        assert!(chain.audit().is_ok());
    }

    #[test]
    fn test_notifications_sequence() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
        let _ = chain.place_bet("alice", event_id, 7, 10, &mut funds);
        chain.settle("owner", event_id, 0).unwrap();
        chain.claim("alice", event_id, &mut funds).unwrap();

        let names: Vec<&str> = chain
            .notifications_since(0)
            .iter()
            .map(|n| n.event.name())
            .collect();
        assert_eq!(
            names,
            vec!["EventCreated", "BetPlaced", "Settled", "PayoutClaimed"]
        );

        let tail = chain.notifications_since(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].seq, 3);
        assert!(chain.notifications_since(100).is_empty());
    }

    #[test]
    fn test_transfer_ownership_moves_settlement_power() {
        let (mut chain, _) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.transfer_ownership("owner", "new_owner").unwrap();
        assert!(matches!(
            chain.settle("owner", event_id, 0),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(chain.settle("new_owner", event_id, 0).is_ok());
    }

    #[test]
    fn test_state_digest_tracks_changes() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        let before = chain.state_digest().unwrap();
        assert_eq!(before.len(), 64);

        let _ = chain.place_bet("alice", event_id, 3, 10, &mut funds);
        assert_eq!(chain.state_digest().unwrap(), before);

        chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
        assert_ne!(chain.state_digest().unwrap(), before);
    }

    #[test]
    fn test_audit_detects_escrow_drift() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
        assert!(chain.audit().is_ok());

        chain.escrow.restore_claimable(event_id, "mallory", 5);
        assert!(matches!(
            chain.audit(),
            Err(AuditViolation::EscrowMismatch { held: 15, owed: 10, .. })
        ));
    }

    #[test]
    fn test_creation_policy_is_announced() {
        let (mut chain, _) = setup();
        chain.set_creation_restricted("owner", true).unwrap();
        assert_eq!(chain.last_seq(), 1);
        assert_eq!(
            chain.notifications_since(0)[0].event,
            LedgerEvent::CreationPolicyChanged(CreationPolicyChanged { restricted: true })
        );
    }

    #[test]
    fn test_default_treasury_follows_owner() {
        let mut chain = StakeChain::new(EngineConfig::new("owner")).unwrap();
        assert_eq!(chain.treasury(), "owner");
        chain.transfer_ownership("owner", "new_owner").unwrap();
        assert_eq!(chain.treasury(), "new_owner");

        let (fixed, _) = setup();
        assert_eq!(fixed.treasury(), "treasury");
    }

    #[test]
    fn test_pruned_notifications_keep_sequence() {
        let (mut chain, _) = setup();
        for title in ["A", "B", "C"] {
            chain
                .create_event("owner", title.into(), "".into(), yes_no())
                .unwrap();
        }
        assert!(chain.prune_notifications("alice", 2).is_err());
        assert_eq!(chain.prune_notifications("owner", 2), Ok(2));
        assert_eq!(chain.last_seq(), 3);

        let tail = chain.notifications_since(0);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].seq, 3);
        assert!(chain.notifications_since(3).is_empty());

        chain
            .create_event("owner", "D".into(), "".into(), yes_no())
            .unwrap();
        assert_eq!(chain.notifications_since(3)[0].seq, 4);
        assert_eq!(chain.prune_notifications("owner", 100), Ok(2));
        assert_eq!(chain.last_seq(), 4);
    }

    #[test]
    fn test_audit_detects_bet_out_of_sequence() {
        let (mut chain, mut funds) = setup();
        let event_id = chain
            .create_event("owner", "E".into(), "".into(), yes_no())
            .unwrap();
        chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();

        let mut state = serde_json::to_value(&chain).unwrap();
        state["book"]["bets"][0]["id"] = serde_json::json!(0);
        let tampered: StakeChain = serde_json::from_value(state).unwrap();
        assert_eq!(
            tampered.audit(),
            Err(AuditViolation::BetOutOfSequence {
                bet_id: 0,
                position: 0
            })
        );
    }
}
