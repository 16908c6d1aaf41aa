pub mod rules;
pub mod score;

use crate::config::RuleConfig;
use crate::core::aggregate::WalletStats;
use crate::core::{RiskLevel, RuleName, ScoredTx, Transaction};
use rules::Rule;

/// The signal engine applies all rules in order and computes the risk score.
pub struct SignalEngine {
    rules: Vec<WeightedRule>,
}

struct WeightedRule {
    rule: Box<dyn Rule + Send + Sync>,
    points: u32,
}

impl SignalEngine {
    pub fn new() -> Self {
        Self::from_rules(rules::default_rules())
    }

    /// Build the engine from rule config, applying any point overrides.
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut engine = Self::from_rules(rules::rules_from_config(config));
        for (key, points) in &config.weights {
            match RuleName::from_key(key) {
                Some(name) => engine.set_points(name, *points),
                None => tracing::warn!("Ignoring weight for unknown rule '{key}'"),
            }
        }
        engine
    }

    pub fn from_rules(rules: Vec<Box<dyn Rule + Send + Sync>>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| WeightedRule {
                    points: rule.default_points(),
                    rule,
                })
                .collect(),
        }
    }

    pub fn set_points(&mut self, name: RuleName, points: u32) {
        for weighted in self.rules.iter_mut().filter(|w| w.rule.name() == name) {
            weighted.points = points;
        }
    }

    /// Points the named rule contributes when it fires, if present.
    pub fn points(&self, name: RuleName) -> Option<u32> {
        self.rules
            .iter()
            .find(|w| w.rule.name() == name)
            .map(|w| w.points)
    }

    /// Score one transaction against frozen batch aggregates.
    pub fn score(&self, tx: &Transaction, stats: &WalletStats) -> ScoredTx {
        let fired: Vec<&WeightedRule> = self
            .rules
            .iter()
            .filter(|w| w.rule.evaluate(tx, stats))
            .collect();

        let risk_score = score::compute_score(fired.iter().map(|w| w.points));

        ScoredTx {
            tx_id: tx.tx_id.clone(),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            triggered_rules: fired.iter().map(|w| w.rule.name()).collect(),
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new()
    }
}
