pub mod aggregate;
pub mod pipeline;
pub mod tx;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single transfer record from an ingested batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: String,
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
    /// Wall-clock time as written in the source, no timezone conversion.
    pub timestamp: NaiveDateTime,
    /// Age of the sender wallet at transaction time.
    pub wallet_age_days: u32,
}

/// A scored transaction ready for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredTx {
    pub tx_id: String,
    pub risk_score: u8, // 0-100
    pub risk_level: RiskLevel,
    pub triggered_rules: Vec<RuleName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,   // >70
    Medium, // 31-70
    Low,    // ≤30
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn from_score(score: u8) -> Self {
        if score <= 30 {
            RiskLevel::Low
        } else if score <= 70 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a detection rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleName {
    HighTransactionAmount,
    BurstTransactions,
    NewWalletHighActivity,
    UnusualTransactionTime,
    OneWayMoneyFlow,
    SuddenBehaviorChange,
}

impl RuleName {
    pub const ALL: [RuleName; 6] = [
        RuleName::HighTransactionAmount,
        RuleName::BurstTransactions,
        RuleName::NewWalletHighActivity,
        RuleName::UnusualTransactionTime,
        RuleName::OneWayMoneyFlow,
        RuleName::SuddenBehaviorChange,
    ];

    /// Human-readable label shown to analysts.
    pub fn label(&self) -> &'static str {
        match self {
            RuleName::HighTransactionAmount => "High Transaction Amount",
            RuleName::BurstTransactions => "Burst Transactions",
            RuleName::NewWalletHighActivity => "New Wallet High Activity",
            RuleName::UnusualTransactionTime => "Unusual Transaction Time",
            RuleName::OneWayMoneyFlow => "One-Way Money Flow",
            RuleName::SuddenBehaviorChange => "Sudden Behavior Change",
        }
    }

    /// Configuration key used for weight overrides.
    pub fn key(&self) -> &'static str {
        match self {
            RuleName::HighTransactionAmount => "high_amount",
            RuleName::BurstTransactions => "burst",
            RuleName::NewWalletHighActivity => "new_wallet",
            RuleName::UnusualTransactionTime => "unusual_time",
            RuleName::OneWayMoneyFlow => "one_way_flow",
            RuleName::SuddenBehaviorChange => "behavior_change",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.key() == key)
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
