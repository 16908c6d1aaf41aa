pub mod schema;

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::Type;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{RiskLevel, RuleName, ScoredTx, Transaction};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Batch has {txs} transactions but {results} results")]
    LengthMismatch { txs: usize, results: usize },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// A stored batch header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: i64,
    pub source: String,
    pub row_count: usize,
    pub created_at: String,
}

/// A stored scored transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedResult {
    pub batch_id: i64,
    pub tx_id: String,
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub triggered_rules: Vec<RuleName>,
}

/// Write-side archive of scored batches. Scoring never reads from it.
pub struct Database {
    conn: Connection,
}

const RESULT_COLUMNS: &str =
    "batch_id, tx_id, sender, receiver, amount, risk_score, risk_level, triggered_rules";

impl Database {
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> ArchiveResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Store a scored batch in a single transaction. Returns the new batch id.
    pub fn store_batch(
        &self,
        source: &str,
        txs: &[Transaction],
        results: &[ScoredTx],
    ) -> ArchiveResult<i64> {
        if txs.len() != results.len() {
            return Err(ArchiveError::LengthMismatch {
                txs: txs.len(),
                results: results.len(),
            });
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO batches (source, row_count, created_at) VALUES (?1, ?2, datetime('now'))",
            rusqlite::params![source, txs.len() as i64],
        )?;
        let batch_id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO scored_transactions (batch_id, position, tx_id, sender, receiver, amount, risk_score, risk_level, triggered_rules)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, (t, s)) in txs.iter().zip(results).enumerate() {
                let rules_json = serde_json::to_string(&s.triggered_rules)?;
                stmt.execute(rusqlite::params![
                    batch_id,
                    position as i64,
                    s.tx_id,
                    t.sender,
                    t.receiver,
                    t.amount,
                    s.risk_score,
                    s.risk_level.as_str(),
                    rules_json
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!("Archived batch {batch_id} ({} rows) from {source}", txs.len());
        Ok(batch_id)
    }

    fn row_to_result(row: &rusqlite::Row) -> rusqlite::Result<ArchivedResult> {
        let level: String = row.get(6)?;
        let risk_level = RiskLevel::parse(&level).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                Type::Text,
                format!("unknown risk level '{level}'").into(),
            )
        })?;
        let rules_json: String = row.get(7)?;
        let triggered_rules = serde_json::from_str(&rules_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
        Ok(ArchivedResult {
            batch_id: row.get(0)?,
            tx_id: row.get(1)?,
            sender: row.get(2)?,
            receiver: row.get(3)?,
            amount: row.get(4)?,
            risk_score: row.get(5)?,
            risk_level,
            triggered_rules,
        })
    }

    /// All results of a batch, in input order.
    pub fn batch_results(&self, batch_id: i64) -> ArchiveResult<Vec<ArchivedResult>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RESULT_COLUMNS} FROM scored_transactions WHERE batch_id = ?1 ORDER BY position"
        ))?;
        let rows = stmt.query_map(rusqlite::params![batch_id], Self::row_to_result)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Results of a batch scoring at least `min_score`, highest first.
    pub fn results_above_score(
        &self,
        batch_id: i64,
        min_score: u8,
    ) -> ArchiveResult<Vec<ArchivedResult>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RESULT_COLUMNS} FROM scored_transactions
             WHERE batch_id = ?1 AND risk_score >= ?2 ORDER BY risk_score DESC, position"
        ))?;
        let rows = stmt.query_map(rusqlite::params![batch_id, min_score], Self::row_to_result)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Number of results per risk level in a batch.
    pub fn level_counts(&self, batch_id: i64) -> ArchiveResult<HashMap<RiskLevel, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT risk_level, COUNT(*) FROM scored_transactions WHERE batch_id = ?1 GROUP BY risk_level",
        )?;
        let rows = stmt.query_map(rusqlite::params![batch_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut counts = HashMap::new();
        for row in rows {
            let (level, count) = row?;
            if let Some(level) = RiskLevel::parse(&level) {
                counts.insert(level, count as usize);
            }
        }
        Ok(counts)
    }

    /// Most recent batches, newest first.
    pub fn recent_batches(&self, limit: usize) -> ArchiveResult<Vec<BatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source, row_count, created_at FROM batches ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(rusqlite::params![limit as i64], |row| {
            Ok(BatchRecord {
                id: row.get(0)?,
                source: row.get(1)?,
                row_count: row.get::<_, i64>(2)? as usize,
                created_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn batch_count(&self) -> ArchiveResult<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM batches", [], |row| row.get::<_, i64>(0))?;
        Ok(count as usize)
    }
}
