// Application state management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::{EngineConfig, ServerConfig};
use crate::errors::{LedgerError, PersistError};
use crate::funds::InMemoryFunds;
use crate::ledger::StakeChain;

/// One lock around the whole ledger: handlers apply operations one at a time.
pub type SharedState = Arc<Mutex<AppState>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub ledger: StakeChain,
    pub funds: InMemoryFunds,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Result<Self, LedgerError> {
        Ok(Self {
            ledger: StakeChain::new(config)?,
            funds: InMemoryFunds::new(),
        })
    }

    /// Load persisted state if the file exists, otherwise start fresh from
    /// configuration. A corrupt or inconsistent file is reported and ignored.
    pub fn bootstrap(config: &ServerConfig) -> Result<Self, LedgerError> {
        match Self::load_from_disk(&config.state_file) {
            Ok(Some(state)) => match state.ledger.audit() {
                Ok(()) => {
                    tracing::info!(
                        path = %config.state_file.display(),
                        events = state.ledger.events().count(),
                        "loaded persisted state"
                    );
                    return Ok(state);
                }
                Err(violation) => {
                    tracing::warn!(
                        path = %config.state_file.display(),
                        %violation,
                        "ignoring state file that fails audit"
                    );
                }
            },
            Ok(None) => {
                tracing::info!(path = %config.state_file.display(), "no persisted state, starting fresh");
            }
            Err(e) => {
                tracing::warn!(path = %config.state_file.display(), error = %e, "ignoring unreadable state file");
            }
        }
        Self::new(config.engine.clone())
    }

    pub fn save_to_disk(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "state saved to disk");
        Ok(())
    }

    /// Snapshot the shared state under its lock.
    pub fn persist(state: &SharedState, path: &Path) -> Result<(), PersistError> {
        let snapshot = match state.lock() {
            Ok(app) => app.clone(),
            Err(poisoned) => {
                tracing::error!("ledger lock poisoned, saving last written state");
                poisoned.into_inner().clone()
            }
        };
        snapshot.save_to_disk(path)
    }

    /// `Ok(None)` when there is no state file yet.
    pub fn load_from_disk(path: &Path) -> Result<Option<Self>, PersistError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}
