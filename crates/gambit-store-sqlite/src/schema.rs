//! SQL schema for the Gambit SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Revision log. Rows are inserted once and never updated; they are deleted
-- only when the whole strategy is purged.
CREATE TABLE IF NOT EXISTS revisions (
    seq                INTEGER PRIMARY KEY AUTOINCREMENT,
    strategy_id        TEXT    NOT NULL,
    revision_id        TEXT    NOT NULL,
    timestamp_ms       INTEGER NOT NULL,   -- ms since the Unix epoch
    data_json          TEXT    NOT NULL,   -- serialised StrategySnapshot
    change_description TEXT,
    user_id            TEXT,
    UNIQUE (strategy_id, revision_id)
);

CREATE TRIGGER IF NOT EXISTS revisions_immutable
BEFORE UPDATE ON revisions
BEGIN
    SELECT RAISE(ABORT, 'revisions are immutable');
END;

-- One row per strategy. current_revision_id is a soft reference into
-- revisions; there is no FOREIGN KEY so purges stay a plain two-table delete.
CREATE TABLE IF NOT EXISTS strategy_pointers (
    strategy_id         TEXT    PRIMARY KEY,
    current_revision_id TEXT    NOT NULL,
    created_at_ms       INTEGER NOT NULL,
    updated_at_ms       INTEGER NOT NULL,
    total_revisions     INTEGER NOT NULL CHECK (total_revisions >= 0)
);

CREATE INDEX IF NOT EXISTS revisions_strategy_idx ON revisions(strategy_id);
CREATE INDEX IF NOT EXISTS revisions_history_idx
    ON revisions(strategy_id, timestamp_ms, seq);
CREATE INDEX IF NOT EXISTS pointers_updated_idx
    ON strategy_pointers(updated_at_ms);

PRAGMA user_version = 1;
";
