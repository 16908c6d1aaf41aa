//! Alert table rendering for analysts.

use std::io::Write;

use serde::Serialize;

use crate::core::{RiskLevel, ScoredTx, Transaction};
use crate::report::join_rules;

/// One line of the alert table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow<'a> {
    pub tx_id: &'a str,
    pub sender: &'a str,
    pub receiver: &'a str,
    pub amount: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub triggered_rules: String,
}

/// Pair each transaction with its result, keeping input order. `level` keeps
/// only rows at that risk level.
pub fn alert_rows<'a>(
    txs: &'a [Transaction],
    results: &'a [ScoredTx],
    level: Option<RiskLevel>,
) -> Vec<AlertRow<'a>> {
    txs.iter()
        .zip(results)
        .filter(|(_, s)| level.is_none_or(|l| s.risk_level == l))
        .map(|(tx, s)| AlertRow {
            tx_id: &s.tx_id,
            sender: &tx.sender,
            receiver: &tx.receiver,
            amount: tx.amount,
            risk_score: s.risk_score,
            risk_level: s.risk_level,
            triggered_rules: join_rules(&s.triggered_rules),
        })
        .collect()
}

pub fn write_csv<W: Write>(writer: W, rows: &[AlertRow<'_>]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        out.write_record([
            "tx_id",
            "sender",
            "receiver",
            "amount",
            "risk_score",
            "risk_level",
            "triggered_rules",
        ])?;
    }
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Pretty JSON array followed by a newline. The writer is flushed so a failed
/// write to a buffered file surfaces here.
pub fn write_json<W: Write>(mut writer: W, rows: &[AlertRow<'_>]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)
}
