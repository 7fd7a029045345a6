//! SQL schema for the cardsync SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS clients (
    oib         TEXT PRIMARY KEY,   -- 11 digits, checksum-validated
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    status      TEXT NOT NULL       -- upper-case Status name
);

-- No foreign key to clients: a card may exist before its holder does.
CREATE TABLE IF NOT EXISTS cards (
    card_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    card_number TEXT NOT NULL UNIQUE,
    oib         TEXT NOT NULL UNIQUE,  -- one card per OIB
    status      TEXT NOT NULL
);

PRAGMA user_version = 1;
";
