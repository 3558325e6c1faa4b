// Domain Ordering Rules
//
// Rules layered on top of the store's strict-increase check. They
// judge a candidate id against the id it would follow and run before
// the store is touched.

use crate::search::DrawId;

/// Result of rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleResult {
    Pass,
    Fail(String),
}

/// Trait implemented by all ordering rules.
///
/// Rules must be pure and deterministic.
pub trait HistoryRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// `previous` is the id the candidate would follow, `None` when the
    /// candidate would become the first record.
    fn validate(&self, previous: Option<DrawId>, candidate: DrawId) -> RuleResult;
}

/// Successive ids must differ by exactly `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    pub period: DrawId,
}

impl HistoryRule for FixedStep {
    fn name(&self) -> &'static str {
        "fixed-step"
    }

    fn validate(&self, previous: Option<DrawId>, candidate: DrawId) -> RuleResult {
        let Some(previous) = previous else {
            return RuleResult::Pass;
        };
        match previous.checked_add(self.period) {
            Some(expected) if expected == candidate => RuleResult::Pass,
            Some(expected) => RuleResult::Fail(format!(
                "expected draw id {expected} after {previous}, got {candidate}"
            )),
            None => RuleResult::Fail(format!("no draw id can follow {previous}")),
        }
    }
}

/// Evaluates a set of rules in registration order.
#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<Box<dyn HistoryRule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register<R: HistoryRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate all rules. Stops at the first failure.
    pub fn evaluate(
        &self,
        previous: Option<DrawId>,
        candidate: DrawId,
    ) -> Result<(), RuleViolation> {
        for rule in &self.rules {
            if let RuleResult::Fail(reason) = rule.validate(previous, candidate) {
                return Err(RuleViolation {
                    rule: rule.name(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Evaluate every element of a timeline against its predecessor.
    pub fn evaluate_timeline<I>(&self, ids: I) -> Result<(), RuleViolation>
    where
        I: IntoIterator<Item = DrawId>,
    {
        let mut previous = None;
        for id in ids {
            self.evaluate(previous, id)?;
            previous = Some(id);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}

/// Returned when a rule rejects a candidate id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rule `{rule}` violated: {reason}")]
pub struct RuleViolation {
    pub rule: &'static str,
    pub reason: String,
}
