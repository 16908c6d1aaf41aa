use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::core::{RiskLevel, RuleName, ScoredTx};

/// Tallies over a scored batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Rules that fired at least once, most frequent first, ties in rule order.
    pub rule_counts: Vec<(RuleName, usize)>,
}

impl BatchReport {
    pub fn from_results(results: &[ScoredTx]) -> Self {
        let mut report = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut counts: HashMap<RuleName, usize> = HashMap::new();
        for scored in results {
            match scored.risk_level {
                RiskLevel::High => report.high += 1,
                RiskLevel::Medium => report.medium += 1,
                RiskLevel::Low => report.low += 1,
            }
            for rule in &scored.triggered_rules {
                *counts.entry(*rule).or_insert(0) += 1;
            }
        }
        let mut rule_counts: Vec<(RuleName, usize)> = counts.into_iter().collect();
        rule_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        report.rule_counts = rule_counts;
        report
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk overview ({} transactions)", self.total)?;
        for level in RiskLevel::ALL {
            writeln!(f, "  {:<8}{}", level.as_str(), self.count(level))?;
        }
        if self.rule_counts.is_empty() {
            return writeln!(f, "No detection rules were triggered.");
        }
        writeln!(f, "Rules triggered")?;
        for (rule, count) in &self.rule_counts {
            writeln!(f, "  {:<26}{count}", rule.label())?;
        }
        Ok(())
    }
}

/// Join triggered rules for display. Nothing triggered renders as an empty string.
pub fn join_rules(rules: &[RuleName]) -> String {
    rules
        .iter()
        .map(RuleName::label)
        .collect::<Vec<_>>()
        .join(", ")
}
