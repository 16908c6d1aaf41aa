use std::collections::HashMap;

use super::Transaction;

#[derive(Debug, Default, Clone, Copy)]
struct Outgoing {
    count: usize,
    total: f64,
}

/// Per-wallet statistics over one batch.
///
/// Built once before any row is scored and read-only afterwards. Lookups for
/// wallets absent from a role resolve to zero.
#[derive(Debug, Default, Clone)]
pub struct WalletStats {
    outgoing: HashMap<String, Outgoing>,
    incoming: HashMap<String, usize>,
}

impl WalletStats {
    pub fn from_batch(txs: &[Transaction]) -> Self {
        let mut stats = Self::default();
        for tx in txs {
            let out = stats.outgoing.entry(tx.sender.clone()).or_default();
            out.count += 1;
            out.total += tx.amount;
            *stats.incoming.entry(tx.receiver.clone()).or_insert(0) += 1;
        }
        tracing::debug!(
            "Aggregated {} txs: {} senders, {} receivers",
            txs.len(),
            stats.outgoing.len(),
            stats.incoming.len()
        );
        stats
    }

    /// Number of transactions the wallet originated.
    pub fn outgoing_count(&self, wallet: &str) -> usize {
        self.outgoing.get(wallet).map_or(0, |o| o.count)
    }

    /// Mean amount of the wallet's outgoing transactions, 0 if it never sent.
    pub fn average_amount(&self, wallet: &str) -> f64 {
        match self.outgoing.get(wallet) {
            Some(o) if o.count > 0 => o.total / o.count as f64,
            _ => 0.0,
        }
    }

    /// Number of transactions the wallet received.
    pub fn incoming_count(&self, wallet: &str) -> usize {
        self.incoming.get(wallet).copied().unwrap_or(0)
    }

    pub fn sender_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn receiver_count(&self) -> usize {
        self.incoming.len()
    }
}
