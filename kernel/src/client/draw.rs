// Draw History
//
// Draw results keyed by draw id. Draws are recorded one round at a
// time, so the built-in policy requires ids to advance by exactly one.

use serde::{Deserialize, Serialize};

use super::{ClientError, HistoryClient};
use crate::config::LedgerConfig;
use crate::guard::AuthorizationGuard;
use crate::history::Record;
use crate::search::DrawId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    /// 256-bit randomness, kept in its decimal text form.
    pub winning_random_number: String,
    pub draw_id: DrawId,
    pub timestamp: u64,
    pub beacon_period_started_at: u64,
    pub beacon_period_seconds: u32,
}

impl Record for Draw {
    fn id(&self) -> DrawId {
        self.draw_id
    }
}

pub type DrawHistory<G> = HistoryClient<Draw, G>;

impl<G: AuthorizationGuard> HistoryClient<Draw, G> {
    /// Draw ledger with the built-in policy.
    pub fn draws(guard: G, timeline: Vec<Draw>) -> Result<Self, ClientError> {
        Self::from_config("draws", guard, &LedgerConfig::draws(), timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Caller;
    use crate::history::{HistoryError, HistoryEvent};
    use uuid::Uuid;

    const BEACON_PERIOD: u32 = 86_400;

    fn anyone(_: &Caller, _: crate::guard::Operation) -> bool {
        true
    }

    fn draw(draw_id: DrawId) -> Draw {
        let (round, period) = (u64::from(draw_id), u64::from(BEACON_PERIOD));
        Draw {
            winning_random_number: (4_091_545_342_484_127_606 + round).to_string(),
            draw_id,
            timestamp: 1_669_748_591 + round * period,
            beacon_period_started_at: 1_669_662_000 + round * period,
            beacon_period_seconds: BEACON_PERIOD,
        }
    }

    fn caller() -> Caller {
        Caller(Uuid::new_v4())
    }

    #[test]
    fn draws_are_sequential() {
        let mut history = DrawHistory::draws(anyone, vec![draw(1), draw(2)]).unwrap();
        assert!(matches!(
            history.push(&caller(), draw(4)),
            Err(ClientError::Rule(_))
        ));
        assert_eq!(history.push(&caller(), draw(3)), Ok(2));
        assert_eq!(history.get(100).unwrap().draw_id, 3);
    }

    #[test]
    fn out_of_order_draws_report_ordering_errors() {
        let mut history = DrawHistory::draws(anyone, vec![draw(1), draw(2)]).unwrap();
        assert_eq!(
            history.push(&caller(), draw(0)),
            Err(ClientError::History(HistoryError::ZeroIdentifier))
        );
        assert_eq!(
            history.push(&caller(), draw(2)),
            Err(ClientError::History(HistoryError::NonMonotonicIdentifier {
                id: 2,
                previous: 2
            }))
        );
        assert_eq!(history.count(), 2);
    }

    #[test]
    fn newest_draw_can_be_corrected_in_place() {
        let mut history = DrawHistory::draws(anyone, vec![draw(1), draw(2), draw(3)]).unwrap();
        history.take_events();

        let corrected = Draw {
            winning_random_number: "42".into(),
            ..draw(3)
        };
        assert_eq!(history.set_recent(&caller(), corrected), Ok(2));
        assert_eq!(history.get(3).unwrap().winning_random_number, "42");
        assert_eq!(
            history.take_events(),
            vec![HistoryEvent::RecordReplaced { index: 2, id: 3 }]
        );

        assert!(matches!(
            history.set_recent(&caller(), draw(2)),
            Err(ClientError::History(
                HistoryError::InvalidIdentifierForOverwrite { id: 2, .. }
            ))
        ));
    }

    #[test]
    fn tail_window_rejects_other_ids() {
        let config = LedgerConfig {
            step: None,
            ..LedgerConfig::draws()
        };
        let mut history =
            DrawHistory::from_config("draws", anyone, &config, vec![draw(1), draw(5)]).unwrap();
        assert!(matches!(
            history.set_recent(&caller(), draw(4)),
            Err(ClientError::History(
                HistoryError::InvalidIdentifierForOverwrite { id: 4, .. }
            ))
        ));
    }

    #[test]
    fn sparse_draws_without_step_rule() {
        let config = LedgerConfig {
            step: None,
            ..LedgerConfig::draws()
        };
        let timeline = [1, 6, 9, 12].into_iter().map(draw).collect();
        let history = DrawHistory::from_config("draws", anyone, &config, timeline).unwrap();

        let found: Vec<_> = history
            .get_list(&[3, 7, 15])
            .unwrap()
            .into_iter()
            .map(|d| d.draw_id)
            .collect();
        assert_eq!(found, vec![1, 6, 12]);
    }

    #[test]
    fn parse_draw_json() {
        let json = r#"
        {
          "winningRandomNumber":
            "80553736152766854578213568172612508909811630975130684656101794566871918526593",
          "drawId": 1,
          "timestamp": 1669748591,
          "beaconPeriodStartedAt": 1669662000,
          "beaconPeriodSeconds": 86400
        }
        "#;

        let draw: Draw = serde_json::from_str(json).unwrap();
        assert_eq!(draw.id(), 1);
        assert_eq!(draw.beacon_period_seconds, BEACON_PERIOD);
    }
}
