use std::thread;

use tracing::{debug, info};

use crate::core::aggregate::WalletStats;
use crate::core::{RiskLevel, ScoredTx, Transaction};
use crate::signals::SignalEngine;

/// Run the batch pipeline: aggregate the whole batch, then score every row.
///
/// Results come back in input order. With `workers > 1` rows are split into
/// contiguous chunks and evaluated on scoped threads against the same frozen
/// aggregates.
pub fn score_batch(engine: &SignalEngine, txs: &[Transaction], workers: usize) -> Vec<ScoredTx> {
    let stats = WalletStats::from_batch(txs);
    info!(
        "Scoring {} txs ({} senders, {} receivers)",
        txs.len(),
        stats.sender_count(),
        stats.receiver_count()
    );

    let workers = workers.max(1).min(txs.len().max(1));
    let scored: Vec<ScoredTx> = if workers == 1 {
        txs.iter().map(|tx| engine.score(tx, &stats)).collect()
    } else {
        score_parallel(engine, txs, &stats, workers)
    };

    let high = scored
        .iter()
        .filter(|s| s.risk_level == RiskLevel::High)
        .count();
    info!("Scored {} txs, {high} high risk", scored.len());
    scored
}

fn score_parallel(
    engine: &SignalEngine,
    txs: &[Transaction],
    stats: &WalletStats,
    workers: usize,
) -> Vec<ScoredTx> {
    let chunk_size = txs.len().div_ceil(workers);
    debug!("Evaluating on {workers} workers, {chunk_size} rows per chunk");

    thread::scope(|scope| {
        let handles: Vec<_> = txs
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|tx| engine.score(tx, stats))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        // Joining in spawn order keeps the input order.
        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(chunk) => chunk,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
