// Draw-Indexed History
//
// An append-biased sequence of records with strictly increasing,
// non-zero draw ids. Records may be appended at the tail, loaded once
// as an initial timeline, or replaced in place. Nothing is ever removed
// or inserted out of order.

use serde::{Deserialize, Serialize};

use crate::guard::{AuthorizationGuard, Caller, Operation};
use crate::search::{DrawId, SearchError, SearchPolicy};

mod events;

pub use events::HistoryEvent;

/// A value stored in a history, keyed by its draw id.
pub trait Record {
    fn id(&self) -> DrawId;
}

impl Record for DrawId {
    fn id(&self) -> DrawId {
        *self
    }
}

/// Which ids `overwrite_recent` accepts for the tail record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteWindow {
    /// The replacement must carry the newest id.
    #[default]
    NewestOnly,

    /// The replacement may carry any id above the second-newest one.
    AfterPrevious,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("caller {caller} is not permitted to {operation}")]
    Unauthorized { caller: Caller, operation: Operation },

    #[error("history has no records")]
    HistoryEmpty,

    #[error("draw id must not be zero")]
    ZeroIdentifier,

    #[error("draw id {id} must be greater than {previous}")]
    NonMonotonicIdentifier { id: DrawId, previous: DrawId },

    #[error("draw id {requested} does not match existing draw id {found}")]
    IdentifierMismatch { requested: DrawId, found: DrawId },

    #[error("draw id {id} cannot replace the newest record under {window:?}")]
    InvalidIdentifierForOverwrite { id: DrawId, window: OverwriteWindow },

    #[error("index {index} is out of bounds for {count} records")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("history is not empty")]
    HistoryNotEmpty,

    #[error("timeline is empty")]
    EmptyTimeline,

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Ordered, draw-id indexed record storage.
#[derive(Debug)]
pub struct HistoryStore<R, G> {
    records: Vec<R>,
    guard: G,
    policy: SearchPolicy,
    window: OverwriteWindow,
    events: Vec<HistoryEvent>,
}

impl<R: Record, G: AuthorizationGuard> HistoryStore<R, G> {
    /// Create an empty history.
    pub fn new(guard: G) -> Self {
        Self {
            records: Vec::new(),
            guard,
            policy: SearchPolicy::default(),
            window: OverwriteWindow::default(),
            events: Vec::new(),
        }
    }

    /// Create a history pre-populated with an initial timeline.
    ///
    /// Construction is not a mutation by any caller, so the guard is not
    /// consulted. An empty timeline yields an empty history.
    pub fn from_timeline(guard: G, timeline: Vec<R>) -> Result<Self, HistoryError> {
        let mut store = Self::new(guard);
        if !timeline.is_empty() {
            validate_timeline(&timeline)?;
            store.install(timeline);
        }
        Ok(store)
    }

    pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_overwrite_window(mut self, window: OverwriteWindow) -> Self {
        self.window = window;
        self
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    pub fn overwrite_window(&self) -> OverwriteWindow {
        self.window
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut G {
        &mut self.guard
    }

    /// Fail with `Unauthorized` unless the guard admits `caller`.
    pub fn authorize(&self, caller: &Caller, operation: Operation) -> Result<(), HistoryError> {
        if self.guard.is_authorized(caller, operation) {
            Ok(())
        } else {
            Err(HistoryError::Unauthorized {
                caller: *caller,
                operation,
            })
        }
    }

    /// Check that a record with `id` could be appended at the tail.
    pub fn check_append(&self, id: DrawId) -> Result<(), HistoryError> {
        if id == 0 {
            return Err(HistoryError::ZeroIdentifier);
        }
        match self.records.last().map(Record::id) {
            Some(previous) if id <= previous => {
                Err(HistoryError::NonMonotonicIdentifier { id, previous })
            }
            _ => Ok(()),
        }
    }

    /// Check that `timeline` could be installed by `bulk_inject`.
    pub fn check_inject(&self, timeline: &[R]) -> Result<(), HistoryError> {
        if timeline.is_empty() {
            return Err(HistoryError::EmptyTimeline);
        }
        if !self.records.is_empty() {
            return Err(HistoryError::HistoryNotEmpty);
        }
        validate_timeline(timeline)
    }

    /// Check that a record with `id` could replace the tail record.
    pub fn check_overwrite_recent(&self, id: DrawId) -> Result<(), HistoryError> {
        let newest = self.newest_id()?;
        let accepted = match self.window {
            OverwriteWindow::NewestOnly => id == newest,
            OverwriteWindow::AfterPrevious => id > self.previous_id().unwrap_or(0),
        };
        if accepted {
            Ok(())
        } else {
            Err(HistoryError::InvalidIdentifierForOverwrite {
                id,
                window: self.window,
            })
        }
    }

    /// Add a record at the tail and return its index.
    pub fn append(&mut self, caller: &Caller, record: R) -> Result<usize, HistoryError> {
        self.authorize(caller, Operation::Append)?;

        let id = record.id();
        self.check_append(id)?;

        let index = self.records.len();
        self.records.push(record);
        self.events.push(HistoryEvent::RecordAppended { index, id });
        Ok(index)
    }

    /// Install an initial timeline into an empty history.
    pub fn bulk_inject(&mut self, caller: &Caller, timeline: Vec<R>) -> Result<(), HistoryError> {
        self.authorize(caller, Operation::BulkInject)?;
        self.check_inject(&timeline)?;

        self.install(timeline);
        Ok(())
    }

    /// Replace the tail record, subject to the overwrite window.
    pub fn overwrite_recent(&mut self, caller: &Caller, record: R) -> Result<usize, HistoryError> {
        self.authorize(caller, Operation::OverwriteRecent)?;

        let id = record.id();
        self.check_overwrite_recent(id)?;

        let index = self.records.len() - 1;
        self.records[index] = record;
        self.events.push(HistoryEvent::RecordReplaced { index, id });
        Ok(index)
    }

    /// Replace the existing record carrying exactly `record.id()`.
    pub fn overwrite_by_id(&mut self, caller: &Caller, record: R) -> Result<usize, HistoryError> {
        self.authorize(caller, Operation::OverwriteById)?;

        let (oldest, newest) = (self.oldest_id()?, self.newest_id()?);
        let id = record.id();
        if id == 0 {
            return Err(HistoryError::ZeroIdentifier);
        }
        if id < oldest || id > newest {
            return Err(SearchError::OutOfRange {
                target: id,
                oldest,
                newest,
            }
            .into());
        }

        let index = self.policy.locate(&self.records, id, Record::id)?;
        let found = self.records[index].id();
        if found != id {
            return Err(HistoryError::IdentifierMismatch {
                requested: id,
                found,
            });
        }

        self.records[index] = record;
        self.events.push(HistoryEvent::RecordReplaced { index, id });
        Ok(index)
    }

    pub fn get_at_index(&self, index: usize) -> Result<&R, HistoryError> {
        self.records
            .get(index)
            .ok_or(HistoryError::IndexOutOfBounds {
                index,
                count: self.records.len(),
            })
    }

    /// The record in effect at `id`.
    pub fn get_by_floor(&self, id: DrawId) -> Result<&R, HistoryError> {
        let index = self.policy.locate(&self.records, id, Record::id)?;
        Ok(&self.records[index])
    }

    /// The records in effect at each of `ids`, in the same order.
    pub fn get_by_floor_batch(&self, ids: &[DrawId]) -> Result<Vec<&R>, HistoryError> {
        let indexes = self.policy.locate_batch(&self.records, ids, Record::id)?;
        Ok(indexes.into_iter().map(|i| &self.records[i]).collect())
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn oldest_id(&self) -> Result<DrawId, HistoryError> {
        self.records
            .first()
            .map(Record::id)
            .ok_or(HistoryError::HistoryEmpty)
    }

    pub fn newest_id(&self) -> Result<DrawId, HistoryError> {
        self.records
            .last()
            .map(Record::id)
            .ok_or(HistoryError::HistoryEmpty)
    }

    /// Id of the record just before the newest one, if any.
    pub fn previous_id(&self) -> Option<DrawId> {
        self.records
            .len()
            .checked_sub(2)
            .map(|i| self.records[i].id())
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.events)
    }

    fn install(&mut self, timeline: Vec<R>) {
        self.events.extend(
            timeline
                .iter()
                .enumerate()
                .map(|(index, record)| HistoryEvent::RecordAppended {
                    index,
                    id: record.id(),
                }),
        );
        self.records = timeline;
    }
}

fn validate_timeline<R: Record>(timeline: &[R]) -> Result<(), HistoryError> {
    if timeline.first().map(Record::id) == Some(0) {
        return Err(HistoryError::ZeroIdentifier);
    }
    for pair in timeline.windows(2) {
        let (previous, id) = (pair[0].id(), pair[1].id());
        if id <= previous {
            return Err(HistoryError::NonMonotonicIdentifier { id, previous });
        }
    }
    Ok(())
}
