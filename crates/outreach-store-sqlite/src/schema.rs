//! SQL schema for the outreach SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id              INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name            TEXT NOT NULL,
    email                TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash        TEXT NOT NULL,
    resume_path          TEXT,
    resume_original_name TEXT,
    created_at           TEXT NOT NULL     -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id      INTEGER NOT NULL REFERENCES users(user_id),
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    phone         TEXT,
    company       TEXT NOT NULL,
    job_role      TEXT,
    notes         TEXT,
    email_status  TEXT NOT NULL DEFAULT 'PENDING',  -- 'PENDING' | 'SENT' | 'FAILED'
    email_sent_at TEXT,
    created_at    TEXT NOT NULL,
    CHECK (email_status IN ('PENDING', 'SENT', 'FAILED'))
);

-- Send logs are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table, and rows outlive
-- the contact they refer to, so contact_id carries no foreign key.
CREATE TABLE IF NOT EXISTS send_logs (
    log_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id    INTEGER NOT NULL,
    user_id       INTEGER NOT NULL REFERENCES users(user_id),
    status        TEXT NOT NULL,
    error_message TEXT,
    sent_at       TEXT NOT NULL,
    CHECK (status IN ('SENT', 'FAILED')),
    CHECK ((status = 'FAILED') = (error_message IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS contacts_owner_idx   ON contacts(owner_id);
CREATE INDEX IF NOT EXISTS contacts_status_idx  ON contacts(email_status);
CREATE INDEX IF NOT EXISTS contacts_company_idx ON contacts(company);
CREATE INDEX IF NOT EXISTS contacts_created_idx ON contacts(created_at);
CREATE INDEX IF NOT EXISTS send_logs_user_idx    ON send_logs(user_id);
CREATE INDEX IF NOT EXISTS send_logs_contact_idx ON send_logs(contact_id);

PRAGMA user_version = 1;
";
