//! SQL schema for the Verset SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS verses (
    verse_id    TEXT PRIMARY KEY,
    text        TEXT NOT NULL,
    reference   TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One row per normalized email, forever. No UPDATE or DELETE is ever issued
-- against this table. The UNIQUE constraint on email is the serialization
-- point for concurrent first draws.
CREATE TABLE IF NOT EXISTS draws (
    draw_id         TEXT PRIMARY KEY,
    email           TEXT NOT NULL UNIQUE,
    first_name      TEXT,
    last_name       TEXT,
    verse_id        TEXT NOT NULL,
    verse_text      TEXT NOT NULL,   -- snapshot; survives verse deletion
    verse_reference TEXT NOT NULL,   -- snapshot
    drawn_at        TEXT NOT NULL    -- ISO 8601 UTC; store-assigned
);

CREATE INDEX IF NOT EXISTS draws_drawn_at_idx ON draws(drawn_at);

PRAGMA user_version = 1;
";
