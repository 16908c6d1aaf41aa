use chrono::Timelike;

use crate::config::RuleConfig;
use crate::core::aggregate::WalletStats;
use crate::core::{RuleName, Transaction};

/// A detection rule that checks one aspect of a transaction against the batch
/// aggregates. Rules fire or they don't; points are added by the engine.
pub trait Rule {
    fn name(&self) -> RuleName;
    fn default_points(&self) -> u32;
    fn evaluate(&self, tx: &Transaction, stats: &WalletStats) -> bool;
}

/// Return all rules, in evaluation order, with the default thresholds.
pub fn default_rules() -> Vec<Box<dyn Rule + Send + Sync>> {
    rules_from_config(&RuleConfig::default())
}

/// Return all rules, in evaluation order, with thresholds taken from config.
pub fn rules_from_config(config: &RuleConfig) -> Vec<Box<dyn Rule + Send + Sync>> {
    vec![
        Box::new(HighAmountRule {
            threshold: config.high_amount_threshold,
        }),
        Box::new(BurstRule {
            min_count: config.burst_min_count,
        }),
        Box::new(NewWalletRule {
            max_age_days: config.new_wallet_days,
            amount_threshold: config.medium_amount_threshold,
        }),
        Box::new(UnusualTimeRule {
            start_hour: config.unusual_hour_start,
            end_hour: config.unusual_hour_end,
        }),
        Box::new(OneWayFlowRule),
        Box::new(BehaviorChangeRule {
            multiplier: config.behavior_change_multiplier,
        }),
    ]
}

// --- Individual Rules ---

struct HighAmountRule {
    threshold: f64,
}
impl Rule for HighAmountRule {
    fn name(&self) -> RuleName { RuleName::HighTransactionAmount }
    fn default_points(&self) -> u32 { 30 }
    fn evaluate(&self, tx: &Transaction, _stats: &WalletStats) -> bool {
        tx.amount > self.threshold
    }
}

/// Many outgoing transactions from the same wallet within the batch.
struct BurstRule {
    min_count: usize,
}
impl Rule for BurstRule {
    fn name(&self) -> RuleName { RuleName::BurstTransactions }
    fn default_points(&self) -> u32 { 20 }
    fn evaluate(&self, tx: &Transaction, stats: &WalletStats) -> bool {
        stats.outgoing_count(&tx.sender) >= self.min_count
    }
}

struct NewWalletRule {
    max_age_days: u32,
    amount_threshold: f64,
}
impl Rule for NewWalletRule {
    fn name(&self) -> RuleName { RuleName::NewWalletHighActivity }
    fn default_points(&self) -> u32 { 20 }
    fn evaluate(&self, tx: &Transaction, _stats: &WalletStats) -> bool {
        tx.wallet_age_days < self.max_age_days && tx.amount > self.amount_threshold
    }
}

/// Hour window is inclusive on both ends and may wrap past midnight.
struct UnusualTimeRule {
    start_hour: u32,
    end_hour: u32,
}
impl Rule for UnusualTimeRule {
    fn name(&self) -> RuleName { RuleName::UnusualTransactionTime }
    fn default_points(&self) -> u32 { 10 }
    fn evaluate(&self, tx: &Transaction, _stats: &WalletStats) -> bool {
        let hour = tx.timestamp.hour();
        if self.start_hour <= self.end_hour {
            (self.start_hour..=self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour <= self.end_hour
        }
    }
}

/// The sender never shows up as a receiver anywhere in the batch.
/// Incoming counts are keyed by receiver but looked up with the sender.
struct OneWayFlowRule;
impl Rule for OneWayFlowRule {
    fn name(&self) -> RuleName { RuleName::OneWayMoneyFlow }
    fn default_points(&self) -> u32 { 10 }
    fn evaluate(&self, tx: &Transaction, stats: &WalletStats) -> bool {
        stats.incoming_count(&tx.sender) == 0
    }
}

struct BehaviorChangeRule {
    multiplier: f64,
}
impl Rule for BehaviorChangeRule {
    fn name(&self) -> RuleName { RuleName::SuddenBehaviorChange }
    fn default_points(&self) -> u32 { 10 }
    fn evaluate(&self, tx: &Transaction, stats: &WalletStats) -> bool {
        let avg = stats.average_amount(&tx.sender);
        avg > 0.0 && tx.amount > self.multiplier * avg
    }
}
