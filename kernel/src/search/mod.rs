// Floor Search Engine
//
// Locates the record in effect at-or-before a draw id within an
// ordered history. Pure, stateless, and allocation-free per lookup.

use serde::{Deserialize, Serialize};

/// Round identifier. Zero is reserved and never stored.
pub type DrawId = u32;

/// How a zero target is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroTarget {
    /// Fail with [`SearchError::ZeroIdentifier`].
    #[default]
    Distinct,

    /// Treat zero like any other id below the oldest record.
    OutOfRange,
}

/// What happens to targets newer than the newest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AboveRange {
    /// The newest record stays in effect for any later draw.
    #[default]
    Clamp,

    /// Fail with [`SearchError::OutOfRange`].
    Reject,
}

/// Edge-case policy for floor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchPolicy {
    #[serde(default)]
    pub zero_target: ZeroTarget,

    #[serde(default)]
    pub above_range: AboveRange,
}

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("history is empty")]
    EmptyHistory,

    #[error("draw id must not be zero")]
    ZeroIdentifier,

    #[error("draw id {target} is out of range [{oldest}, {newest}]")]
    OutOfRange {
        target: DrawId,
        oldest: DrawId,
        newest: DrawId,
    },
}

impl SearchPolicy {
    /// Find the index of the last item whose key is `<= target`.
    ///
    /// `items` must be strictly increasing by `key`.
    pub fn locate<T, F>(&self, items: &[T], target: DrawId, key: F) -> Result<usize, SearchError>
    where
        F: Fn(&T) -> DrawId,
    {
        let (first, last) = match (items.first(), items.last()) {
            (Some(first), Some(last)) => (key(first), key(last)),
            _ => return Err(SearchError::EmptyHistory),
        };

        let out_of_range = SearchError::OutOfRange {
            target,
            oldest: first,
            newest: last,
        };

        if target == 0 {
            return Err(match self.zero_target {
                ZeroTarget::Distinct => SearchError::ZeroIdentifier,
                ZeroTarget::OutOfRange => out_of_range,
            });
        }

        if target < first {
            return Err(out_of_range);
        }

        if target >= last {
            if target > last && self.above_range == AboveRange::Reject {
                return Err(out_of_range);
            }
            return Ok(items.len() - 1);
        }

        // key(items[low]) <= target < key(items[high])
        let mut low = 0;
        let mut high = items.len() - 1;
        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if key(&items[mid]) <= target {
                low = mid;
            } else {
                high = mid;
            }
        }

        Ok(low)
    }

    /// Locate every target, in order. Fails on the first target that fails.
    pub fn locate_batch<T, F>(
        &self,
        items: &[T],
        targets: &[DrawId],
        key: F,
    ) -> Result<Vec<usize>, SearchError>
    where
        F: Fn(&T) -> DrawId,
    {
        targets
            .iter()
            .map(|target| self.locate(items, *target, &key))
            .collect()
    }
}

/// Floor search over bare ids with the default policy.
pub fn locate_floor(ids: &[DrawId], target: DrawId) -> Result<usize, SearchError> {
    SearchPolicy::default().locate(ids, target, |id| *id)
}

/// Batch floor search over bare ids with the default policy.
pub fn locate_floor_batch(ids: &[DrawId], targets: &[DrawId]) -> Result<Vec<usize>, SearchError> {
    SearchPolicy::default().locate_batch(ids, targets, |id| *id)
}
