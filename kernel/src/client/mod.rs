// History Clients
//
// Domain-facing wrappers around a history store. A client owns the
// domain rule set. Rules run after authorization and the store's own
// ordering checks, and before the store is touched.

use crate::config::LedgerConfig;
use crate::guard::{AuthorizationGuard, Caller, Operation};
use crate::history::{HistoryError, HistoryEvent, HistoryStore, Record};
use crate::rules::{RuleEngine, RuleViolation};
use crate::search::DrawId;

pub mod draw;
pub mod tier;

pub use draw::{Draw, DrawHistory};
pub use tier::{PrizeTier, PrizeTierHistory};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("rule violation: {0}")]
    Rule(#[from] RuleViolation),
}

/// A history store bound to a domain rule set.
#[derive(Debug)]
pub struct HistoryClient<R, G> {
    label: &'static str,
    store: HistoryStore<R, G>,
    rules: RuleEngine,
}

impl<R: Record, G: AuthorizationGuard> HistoryClient<R, G> {
    pub fn new(label: &'static str, store: HistoryStore<R, G>, rules: RuleEngine) -> Self {
        Self {
            label,
            store,
            rules,
        }
    }

    /// Build a client from a configuration and an initial timeline.
    pub fn from_config(
        label: &'static str,
        guard: G,
        config: &LedgerConfig,
        timeline: Vec<R>,
    ) -> Result<Self, ClientError> {
        let store = HistoryStore::from_timeline(guard, timeline)?
            .with_policy(config.search)
            .with_overwrite_window(config.overwrite_window);
        let rules = config.rules();
        rules.evaluate_timeline(store.records().map(Record::id))?;

        tracing::debug!(ledger = label, count = store.count(), "ledger loaded");
        Ok(Self::new(label, store, rules))
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn store(&self) -> &HistoryStore<R, G> {
        &self.store
    }

    pub fn guard_mut(&mut self) -> &mut G {
        self.store.guard_mut()
    }

    /// Append a record after the newest one.
    pub fn push(&mut self, caller: &Caller, record: R) -> Result<usize, ClientError> {
        self.store.authorize(caller, Operation::Append)?;

        let id = record.id();
        self.store.check_append(id)?;
        if let Err(violation) = self.rules.evaluate(self.store.newest_id().ok(), id) {
            tracing::warn!(ledger = self.label, draw_id = id, %violation, "push rejected");
            return Err(violation.into());
        }

        let index = self.store.append(caller, record)?;
        tracing::debug!(ledger = self.label, index, draw_id = id, "record pushed");
        Ok(index)
    }

    /// Load an initial timeline into an empty ledger.
    pub fn inject_timeline(
        &mut self,
        caller: &Caller,
        timeline: Vec<R>,
    ) -> Result<(), ClientError> {
        self.store.authorize(caller, Operation::BulkInject)?;
        self.store.check_inject(&timeline)?;
        self.rules.evaluate_timeline(timeline.iter().map(Record::id))?;

        let count = timeline.len();
        self.store.bulk_inject(caller, timeline)?;
        tracing::debug!(ledger = self.label, count, "timeline injected");
        Ok(())
    }

    /// Replace the newest record.
    pub fn set_recent(&mut self, caller: &Caller, record: R) -> Result<usize, ClientError> {
        self.store.authorize(caller, Operation::OverwriteRecent)?;

        let id = record.id();
        self.store.check_overwrite_recent(id)?;
        self.rules.evaluate(self.store.previous_id(), id)?;

        let index = self.store.overwrite_recent(caller, record)?;
        tracing::debug!(ledger = self.label, index, draw_id = id, "newest record replaced");
        Ok(index)
    }

    /// Replace the existing record with the same draw id.
    pub fn replace(&mut self, caller: &Caller, record: R) -> Result<usize, ClientError> {
        let id = record.id();
        let index = self.store.overwrite_by_id(caller, record)?;
        tracing::debug!(ledger = self.label, index, draw_id = id, "record replaced");
        Ok(index)
    }

    /// The record in effect at `draw_id`.
    pub fn get(&self, draw_id: DrawId) -> Result<&R, ClientError> {
        Ok(self.store.get_by_floor(draw_id)?)
    }

    /// The records in effect at each of `draw_ids`.
    pub fn get_list(&self, draw_ids: &[DrawId]) -> Result<Vec<&R>, ClientError> {
        Ok(self.store.get_by_floor_batch(draw_ids)?)
    }

    pub fn get_at_index(&self, index: usize) -> Result<&R, ClientError> {
        Ok(self.store.get_at_index(index)?)
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn oldest_id(&self) -> Result<DrawId, ClientError> {
        Ok(self.store.oldest_id()?)
    }

    pub fn newest_id(&self) -> Result<DrawId, ClientError> {
        Ok(self.store.newest_id()?)
    }

    pub fn take_events(&mut self) -> Vec<HistoryEvent> {
        self.store.take_events()
    }
}
