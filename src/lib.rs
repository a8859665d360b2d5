//! StakeChain wagering ledger
//! Exports the settlement engine and its HTTP host for use as a library crate

pub mod config;
pub mod errors;
pub mod events;
pub mod funds;
pub mod ledger;

pub mod app_state;
pub mod handlers;
pub mod models;
pub mod routes;

// Re-export the engine surface
pub use ledger::{
    AccessControl, Account, AuditViolation, Bet, BetBook, BetId, EscrowAccount, EscrowBalance,
    Event, EventId, EventRegistry, FundsGateway, Payout, Settlement, SettlementEngine,
    StakeChain, TransferError,
};

pub use config::{EngineConfig, SeedEvent, ServerConfig};
pub use errors::{ConfigError, LedgerError, PersistError, Target};
pub use events::{LedgerEvent, Notification};
pub use funds::InMemoryFunds;
pub use app_state::{AppState, SharedState};
