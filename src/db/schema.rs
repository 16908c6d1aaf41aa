use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS batches (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            source      TEXT NOT NULL,
            row_count   INTEGER NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS scored_transactions (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id        INTEGER NOT NULL REFERENCES batches(id),
            position        INTEGER NOT NULL,
            tx_id           TEXT NOT NULL,
            sender          TEXT NOT NULL,
            receiver        TEXT NOT NULL,
            amount          REAL NOT NULL,
            risk_score      INTEGER NOT NULL,
            risk_level      TEXT NOT NULL,
            triggered_rules TEXT NOT NULL -- JSON
        );

        CREATE INDEX IF NOT EXISTS idx_scored_batch ON scored_transactions(batch_id, position);
        CREATE INDEX IF NOT EXISTS idx_scored_score ON scored_transactions(risk_score DESC);
        ",
    )?;
    Ok(())
}
