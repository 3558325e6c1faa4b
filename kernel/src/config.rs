// Ledger Configuration
//
// Per-domain edge-case policy: how lookups treat zero and future draw
// ids, which tail replacements are accepted, and whether ids must
// advance by a fixed step.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::OverwriteWindow;
use crate::rules::{FixedStep, RuleEngine};
use crate::search::{DrawId, SearchPolicy};

/// Ledger configuration loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub search: SearchPolicy,

    #[serde(default)]
    pub overwrite_window: OverwriteWindow,

    /// Required distance between successive draw ids.
    #[serde(default)]
    pub step: Option<DrawId>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("step must be greater than zero")]
    ZeroStep,
}

impl LedgerConfig {
    /// Built-in prize tier policy.
    pub fn prize_tiers() -> Self {
        Self {
            search: SearchPolicy::default(),
            overwrite_window: OverwriteWindow::AfterPrevious,
            step: None,
        }
    }

    /// Built-in draw policy: draws are recorded one round at a time.
    pub fn draws() -> Self {
        Self {
            search: SearchPolicy::default(),
            overwrite_window: OverwriteWindow::NewestOnly,
            step: Some(1),
        }
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Self::default().merge_json(data)
    }

    /// Overlay a JSON document on this configuration. Fields the document
    /// leaves out keep their current values, nested objects included.
    pub fn merge_json(self, data: &str) -> Result<Self, ConfigError> {
        let mut merged = serde_json::to_value(&self)?;
        merge_value(&mut merged, serde_json::from_str(data)?);

        let config: Self = serde_json::from_value(merged)?;
        if config.step == Some(0) {
            return Err(ConfigError::ZeroStep);
        }
        Ok(config)
    }

    /// Build the rule set this configuration asks for.
    pub fn rules(&self) -> RuleEngine {
        let mut rules = RuleEngine::new();
        if let Some(period) = self.step {
            rules.register(FixedStep { period });
        }
        rules
    }
}

fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
