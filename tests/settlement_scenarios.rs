// End-to-end settlement scenarios against the engine
// Run with: cargo test --test settlement_scenarios

use stakechain_ledger::{
    EngineConfig, EventId, InMemoryFunds, LedgerError, LedgerEvent, StakeChain, Target,
};

const OWNER: &str = "owner";
const TREASURY: &str = "treasury";

fn setup() -> (StakeChain, InMemoryFunds, EventId) {
    let mut chain = StakeChain::new(EngineConfig::new(OWNER).with_treasury(TREASURY)).unwrap();
    let mut funds = InMemoryFunds::new();
    for account in ["alice", "bob", "carol"] {
        funds.deposit(account, 1_000).unwrap();
    }
    let event_id = chain
        .create_event(
            OWNER,
            "ETH<2000 by Sept30".to_string(),
            "Closes on the last day of September".to_string(),
            vec!["Yes".to_string(), "No".to_string()],
        )
        .unwrap();
    (chain, funds, event_id)
}

#[test]
fn test_proportional_payout_without_dust() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
    chain.place_bet("bob", event_id, 1, 30, &mut funds).unwrap();
    chain.place_bet("carol", event_id, 0, 10, &mut funds).unwrap();
    assert_eq!(chain.held_total(event_id), 50);

    let settlement = chain.settle(OWNER, event_id, 0).unwrap().clone();
    assert_eq!(settlement.total_pool, 50);
    assert_eq!(settlement.winning_pool, 20);
    assert_eq!(settlement.dust, 0);
    assert!(!settlement.refunded);

    assert_eq!(chain.claim("alice", event_id, &mut funds).unwrap(), 25);
    assert_eq!(chain.claim("carol", event_id, &mut funds).unwrap(), 25);
    assert_eq!(
        chain.claim("bob", event_id, &mut funds),
        Err(LedgerError::NotFound(Target::Claim {
            event_id,
            account: "bob".to_string(),
        }))
    );

    assert_eq!(funds.balance("alice"), 1_015);
    assert_eq!(funds.balance("bob"), 970);
    assert_eq!(funds.balance("carol"), 1_015);
    assert_eq!(funds.custody(), 0);
    assert_eq!(chain.held_total(event_id), 0);
    assert!(chain.audit().is_ok());
}

#[test]
fn test_rounding_dust_goes_to_treasury() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 1, &mut funds).unwrap();
    chain.place_bet("bob", event_id, 0, 1, &mut funds).unwrap();
    chain.place_bet("carol", event_id, 1, 1, &mut funds).unwrap();

    let settlement = chain.settle(OWNER, event_id, 0).unwrap().clone();
    assert_eq!(settlement.total_pool, 3);
    assert_eq!(settlement.winning_pool, 2);
    assert_eq!(settlement.dust, 1);
    assert_eq!(settlement.treasury, TREASURY);

    let alice = chain.claimable(event_id, "alice");
    let bob = chain.claimable(event_id, "bob");
    let treasury = chain.claimable(event_id, TREASURY);
    assert_eq!((alice, bob, treasury), (1, 1, 1));
    assert_eq!(alice + bob + treasury, settlement.total_pool);

    assert_eq!(chain.claim(TREASURY, event_id, &mut funds).unwrap(), 1);
    assert_eq!(funds.balance(TREASURY), 1);
    assert!(chain.audit().is_ok());
}

#[test]
fn test_refund_when_nobody_backed_the_outcome() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 5, &mut funds).unwrap();

    let settlement = chain.settle(OWNER, event_id, 1).unwrap().clone();
    assert!(settlement.refunded);
    assert_eq!(settlement.winning_pool, 0);
    assert_eq!(chain.claimable(event_id, "alice"), 5);

    assert_eq!(chain.claim("alice", event_id, &mut funds).unwrap(), 5);
    assert_eq!(funds.balance("alice"), 1_000);
}

#[test]
fn test_settling_an_empty_event() {
    let (mut chain, _funds, event_id) = setup();
    let settlement = chain.settle(OWNER, event_id, 0).unwrap().clone();
    assert!(settlement.refunded);
    assert_eq!(settlement.total_pool, 0);
    assert!(settlement.payouts.is_empty());
    assert!(chain.audit().is_ok());
}

#[test]
fn test_out_of_range_outcome_is_rejected() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();

    let result = chain.place_bet("bob", event_id, 2, 10, &mut funds);
    assert_eq!(
        result,
        Err(LedgerError::InvalidOutcome {
            index: 2,
            options: 2
        })
    );
    assert_eq!(chain.held_total(event_id), 10);
    assert_eq!(chain.bets_for_event(event_id).unwrap().len(), 1);
    assert_eq!(funds.balance("bob"), 1_000);
}

#[test]
fn test_non_owner_cannot_settle() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();

    assert_eq!(
        chain.settle("alice", event_id, 0).map(|_| ()),
        Err(LedgerError::Unauthorized {
            caller: "alice".to_string()
        })
    );
    assert!(!chain.get_event(event_id).unwrap().settled);

    chain.settle(OWNER, event_id, 0).unwrap();
    assert!(chain.get_event(event_id).unwrap().settled);
}

#[test]
fn test_delegated_resolver_can_settle() {
    let (mut chain, _funds, event_id) = setup();
    assert!(chain.set_resolver("mallory", Some("oracle".to_string())).is_err());
    chain.set_resolver(OWNER, Some("oracle".to_string())).unwrap();

    chain.settle("oracle", event_id, 1).unwrap();
    assert_eq!(chain.get_event(event_id).unwrap().winning_outcome, Some(1));
}

#[test]
fn test_second_settlement_changes_nothing() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
    chain.place_bet("bob", event_id, 1, 10, &mut funds).unwrap();
    chain.settle(OWNER, event_id, 0).unwrap();

    let snapshot = chain.clone();
    let digest = chain.state_digest().unwrap();

    assert_eq!(
        chain.settle(OWNER, event_id, 1).map(|_| ()),
        Err(LedgerError::AlreadySettled { event_id })
    );
    assert_eq!(chain, snapshot);
    assert_eq!(chain.state_digest().unwrap(), digest);
}

#[test]
fn test_book_is_closed_after_settlement() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
    chain.settle(OWNER, event_id, 0).unwrap();

    let snapshot = chain.clone();
    assert_eq!(
        chain.place_bet("bob", event_id, 0, 10, &mut funds),
        Err(LedgerError::EventClosed { event_id })
    );
    assert_eq!(chain, snapshot);
    assert_eq!(funds.balance("bob"), 1_000);
}

#[test]
fn test_claim_happens_exactly_once() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
    chain.place_bet("alice", event_id, 0, 5, &mut funds).unwrap();
    chain.place_bet("bob", event_id, 1, 15, &mut funds).unwrap();
    chain.settle(OWNER, event_id, 0).unwrap();

    assert_eq!(chain.claim("alice", event_id, &mut funds).unwrap(), 30);
    assert!(chain
        .bets_for_event(event_id)
        .unwrap()
        .iter()
        .filter(|b| b.bettor == "alice")
        .all(|b| b.claimed));

    let balance = funds.balance("alice");
    assert!(matches!(
        chain.claim("alice", event_id, &mut funds),
        Err(LedgerError::NotFound(_))
    ));
    assert_eq!(funds.balance("alice"), balance);
}

#[test]
fn test_failed_transfer_rolls_back_claim() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
    chain.place_bet("bob", event_id, 1, 10, &mut funds).unwrap();
    chain.settle(OWNER, event_id, 0).unwrap();

    funds.reject_destination("alice");
    let snapshot = chain.clone();
    assert!(matches!(
        chain.claim("alice", event_id, &mut funds),
        Err(LedgerError::TransferFailure { .. })
    ));
    assert_eq!(chain, snapshot);
    assert_eq!(chain.claimable(event_id, "alice"), 20);

    funds.accept_destination("alice");
    assert_eq!(chain.claim("alice", event_id, &mut funds).unwrap(), 20);
    assert!(chain.audit().is_ok());
}

#[test]
fn test_underfunded_bettor_leaves_no_bet() {
    let (mut chain, mut funds, event_id) = setup();
    let result = chain.place_bet("dave", event_id, 0, 10, &mut funds);
    assert!(matches!(result, Err(LedgerError::TransferFailure { .. })));
    assert_eq!(chain.held_total(event_id), 0);
    assert!(chain.bets_for_event(event_id).unwrap().is_empty());
}

#[test]
fn test_restricted_creation_and_ownership_transfer() {
    let mut chain = StakeChain::new(EngineConfig::new(OWNER).with_creation_restricted(true)).unwrap();
    let options = || vec!["A".to_string(), "B".to_string()];

    assert!(matches!(
        chain.create_event("alice", "T".into(), "".into(), options()),
        Err(LedgerError::Unauthorized { .. })
    ));

    chain.transfer_ownership(OWNER, "alice").unwrap();
    assert_eq!(chain.owner(), "alice");
    assert!(chain.create_event("alice", "T".into(), "".into(), options()).is_ok());
    assert!(chain.transfer_ownership(OWNER, "bob").is_err());
}

#[test]
fn test_notification_feed_follows_commits() {
    let (mut chain, mut funds, event_id) = setup();
    chain.place_bet("alice", event_id, 0, 10, &mut funds).unwrap();
    let _ = chain.place_bet("alice", event_id, 5, 10, &mut funds);
    chain.settle(OWNER, event_id, 0).unwrap();
    chain.claim("alice", event_id, &mut funds).unwrap();

    let kinds: Vec<_> = chain
        .notifications_since(0)
        .iter()
        .map(|n| n.event.name())
        .collect();
    assert_eq!(kinds, vec!["EventCreated", "BetPlaced", "Settled", "PayoutClaimed"]);

    let seqs: Vec<_> = chain.notifications_since(0).iter().map(|n| n.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);
    assert_eq!(chain.notifications_since(2).len(), 2);

    match &chain.notifications_since(3)[0].event {
        LedgerEvent::PayoutClaimed(claimed) => {
            assert_eq!(claimed.bettor, "alice");
            assert_eq!(claimed.amount, 10);
        }
        other => panic!("unexpected notification {:?}", other),
    }
}

#[test]
fn test_dust_follows_transferred_ownership() {
    let mut chain = StakeChain::new(EngineConfig::new(OWNER)).unwrap();
    let mut funds = InMemoryFunds::new();
    for account in ["alice", "bob", "carol"] {
        funds.deposit(account, 10).unwrap();
    }
    let event_id = chain
        .create_event(OWNER, "E".into(), "".into(), vec!["Yes".into(), "No".into()])
        .unwrap();
    chain.place_bet("alice", event_id, 0, 1, &mut funds).unwrap();
    chain.place_bet("bob", event_id, 0, 1, &mut funds).unwrap();
    chain.place_bet("carol", event_id, 1, 1, &mut funds).unwrap();

    chain.transfer_ownership(OWNER, "new_owner").unwrap();
    let settlement = chain.settle("new_owner", event_id, 0).unwrap().clone();

    assert_eq!(settlement.dust, 1);
    assert_eq!(settlement.treasury, "new_owner");
    assert_eq!(chain.claimable(event_id, "new_owner"), 1);
    assert_eq!(chain.claimable(event_id, OWNER), 0);
    assert!(chain.audit().is_ok());
}
