//! ChainGuard: explainable risk scoring for batches of blockchain transfers.
//!
//! A batch is ingested and validated ([`ingest`]), aggregated per wallet
//! ([`core::aggregate`]), then each transfer is scored by the rule engine
//! ([`signals`]). Results come back in input order with the rules that fired.
//!
//! ```no_run
//! use chainguard::{SignalEngine, ingest, score_batch};
//!
//! let txs = ingest::load_transactions("transactions.csv")?;
//! let results = score_batch(&SignalEngine::new(), &txs, 1);
//! for r in &results {
//!     println!("{} {} {}", r.tx_id, r.risk_score, r.risk_level);
//! }
//! # Ok::<(), chainguard::ingest::IngestError>(())
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod ingest;
pub mod output;
pub mod report;
pub mod signals;

pub use crate::config::{Config, RuleConfig};
pub use crate::core::aggregate::WalletStats;
pub use crate::core::pipeline::score_batch;
pub use crate::core::{RiskLevel, RuleName, ScoredTx, Transaction};
pub use crate::report::BatchReport;
pub use crate::signals::SignalEngine;
