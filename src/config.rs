// Engine and server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::ledger::Account;

/// Event registered at bootstrap, before any caller can act
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
}

/// Initialization parameters for a fresh `StakeChain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub owner: Account,
    /// Receives rounding dust; defaults to whoever owns the ledger at settlement
    pub treasury: Option<Account>,
    /// Owner-only event creation when true
    pub creation_restricted: bool,
    pub seed_event: Option<SeedEvent>,
}

impl EngineConfig {
    pub fn new(owner: impl Into<Account>) -> Self {
        Self {
            owner: owner.into(),
            treasury: None,
            creation_restricted: false,
            seed_event: None,
        }
    }

    pub fn with_treasury(mut self, treasury: impl Into<Account>) -> Self {
        self.treasury = Some(treasury.into());
        self
    }

    pub fn with_creation_restricted(mut self, restricted: bool) -> Self {
        self.creation_restricted = restricted;
        self
    }

    pub fn with_seed_event(mut self, seed: SeedEvent) -> Self {
        self.seed_event = Some(seed);
        self
    }

    pub fn treasury(&self) -> &str {
        self.treasury.as_deref().unwrap_or(&self.owner)
    }
}

pub const DEFAULT_BIND: &str = "0.0.0.0:1234";
pub const DEFAULT_DEPLOYER: &str = "deployer";
pub const DEFAULT_STATE_FILE: &str = "data/state.json";
pub const DEFAULT_SNAPSHOT_SECS: u64 = 30;

/// HTTP host configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub state_file: PathBuf,
    pub log_level: tracing::Level,
    /// Period of background state snapshots; `None` saves only on shutdown
    pub snapshot_interval: Option<Duration>,
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Load `.env` (if present) and read `STAKECHAIN_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = var("STAKECHAIN_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                var: "STAKECHAIN_BIND",
                reason: e.to_string(),
            })?;

        // Deployments that pass no owner fall back to the deploying account
        let deployer = var("STAKECHAIN_DEPLOYER").unwrap_or_else(|| DEFAULT_DEPLOYER.to_string());
        let owner = var("STAKECHAIN_OWNER").unwrap_or(deployer);

        let creation_restricted = match var("STAKECHAIN_CREATION_RESTRICTED") {
            None => false,
            Some(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue {
                var: "STAKECHAIN_CREATION_RESTRICTED",
                reason: format!("expected true/false, got {:?}", v),
            })?,
        };

        let seed_event = match var("STAKECHAIN_SEED_EVENT") {
            None => None,
            Some(raw) => Some(
                serde_json::from_str::<SeedEvent>(&raw)
                    .map_err(|e| ConfigError::InvalidSeedEvent(e.to_string()))?,
            ),
        };

        let log_level = match var("STAKECHAIN_LOG_LEVEL") {
            None => tracing::Level::INFO,
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                var: "STAKECHAIN_LOG_LEVEL",
                reason: format!("unknown level {:?}", v),
            })?,
        };

        let snapshot_secs = match var("STAKECHAIN_SNAPSHOT_SECS") {
            None => DEFAULT_SNAPSHOT_SECS,
            Some(v) => v.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                var: "STAKECHAIN_SNAPSHOT_SECS",
                reason: e.to_string(),
            })?,
        };
        let snapshot_interval = (snapshot_secs > 0).then(|| Duration::from_secs(snapshot_secs));

        let state_file = PathBuf::from(
            var("STAKECHAIN_STATE_FILE").unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
        );

        Ok(Self {
            bind,
            state_file,
            log_level,
            snapshot_interval,
            engine: EngineConfig {
                owner,
                treasury: var("STAKECHAIN_TREASURY"),
                creation_restricted,
                seed_event,
            },
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
