use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{now, Account, EventId};
use crate::errors::{LedgerError, Target};

/// A resolvable question with a fixed, ordered set of outcome options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: EventId,

    /// Event question/title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Outcome options (e.g., ["Yes", "No"]); referenced by index
    pub options: Vec<String>,

    /// Account that created the event
    pub creator: Account,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Whether the event has been settled
    pub settled: bool,

    /// Winning outcome index (None until settled)
    pub winning_outcome: Option<usize>,

    /// Settlement timestamp (None until settled)
    pub settled_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn is_open(&self) -> bool {
        !self.settled
    }

    /// Check `index` against this event's option bounds.
    pub fn check_outcome(&self, index: usize) -> Result<(), LedgerError> {
        if index < self.options.len() {
            Ok(())
        } else {
            Err(LedgerError::InvalidOutcome {
                index,
                options: self.options.len(),
            })
        }
    }

    pub fn option_label(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

/// Validate an option set: at least two, none blank, no duplicates.
pub fn validate_options(options: &[String]) -> Result<(), LedgerError> {
    if options.len() < 2 {
        return Err(LedgerError::InvalidOptions {
            reason: format!("need at least 2 options, got {}", options.len()),
        });
    }

    let mut seen = HashSet::with_capacity(options.len());
    for (index, option) in options.iter().enumerate() {
        if option.trim().is_empty() {
            return Err(LedgerError::InvalidOptions {
                reason: format!("option {} is empty", index),
            });
        }
        if !seen.insert(option.as_str()) {
            return Err(LedgerError::InvalidOptions {
                reason: format!("duplicate option {:?}", option),
            });
        }
    }

    Ok(())
}

/// Event registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRegistry {
    events: BTreeMap<EventId, Event>,
    next_id: EventId,
    creation_restricted: bool,
}

impl EventRegistry {
    pub fn new(creation_restricted: bool) -> Self {
        Self {
            events: BTreeMap::new(),
            next_id: 1,
            creation_restricted,
        }
    }

    /// Whether only the owner may create events
    pub fn creation_restricted(&self) -> bool {
        self.creation_restricted
    }

    pub(crate) fn set_creation_restricted(&mut self, restricted: bool) {
        self.creation_restricted = restricted;
    }

    /// Register a new event. The caller is expected to have applied the
    /// creation policy already.
    pub(crate) fn create_event(
        &mut self,
        creator: &str,
        title: String,
        description: String,
        options: Vec<String>,
    ) -> Result<&Event, LedgerError> {
        validate_options(&options)?;

        let id = self.next_id;
        self.next_id += 1;

        let event = Event {
            id,
            title,
            description,
            options,
            creator: creator.to_string(),
            created_at: now(),
            settled: false,
            winning_outcome: None,
            settled_at: None,
        };

        Ok(&*self.events.entry(id).or_insert(event))
    }

    pub fn get_event(&self, id: EventId) -> Result<&Event, LedgerError> {
        self.events
            .get(&id)
            .ok_or(LedgerError::NotFound(Target::Event(id)))
    }

    /// Write the three settlement fields. Only ever succeeds once per event.
    pub(crate) fn mark_settled(
        &mut self,
        id: EventId,
        winning_outcome: usize,
        settled_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let event = self
            .events
            .get_mut(&id)
            .ok_or(LedgerError::NotFound(Target::Event(id)))?;

        if event.settled {
            return Err(LedgerError::AlreadySettled { event_id: id });
        }

        event.settled = true;
        event.winning_outcome = Some(winning_outcome);
        event.settled_at = Some(settled_at);
        Ok(())
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
