// History Events
//
// Observable signals emitted by successful mutations, for off-process
// indexers. A failed mutation emits nothing.

use serde::{Deserialize, Serialize};

use crate::search::DrawId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HistoryEvent {
    RecordAppended { index: usize, id: DrawId },
    RecordReplaced { index: usize, id: DrawId },
}

impl HistoryEvent {
    pub fn index(&self) -> usize {
        match self {
            HistoryEvent::RecordAppended { index, .. } => *index,
            HistoryEvent::RecordReplaced { index, .. } => *index,
        }
    }

    pub fn id(&self) -> DrawId {
        match self {
            HistoryEvent::RecordAppended { id, .. } => *id,
            HistoryEvent::RecordReplaced { id, .. } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_tag() {
        let event = HistoryEvent::RecordReplaced { index: 2, id: 9 };
        assert_eq!((event.index(), event.id()), (2, 9));

        let json = serde_json::to_value(event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "event": "record_replaced", "index": 2, "id": 9 })
        );
    }
}
