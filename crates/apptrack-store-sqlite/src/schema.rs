//! SQL schema for the apptrack SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS students (
    student_id     TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    email          TEXT NOT NULL,
    phone          TEXT NOT NULL,
    -- Derived from applications; written only by the recompute step.
    highest_status TEXT,
    highest_intake TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    deleted_at     TEXT,             -- soft delete marker
    CHECK ((highest_status IS NULL) = (highest_intake IS NULL))
);

-- Emails are unique among live students, ignoring case.
CREATE UNIQUE INDEX IF NOT EXISTS students_email_idx
    ON students(lower(email)) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS students_status_idx  ON students(highest_status);
CREATE INDEX IF NOT EXISTS students_created_idx ON students(created_at);

CREATE TABLE IF NOT EXISTS applications (
    application_id  TEXT PRIMARY KEY,
    student_id      TEXT NOT NULL REFERENCES students(student_id),
    university_name TEXT NOT NULL,
    program_name    TEXT NOT NULL,
    intake          TEXT NOT NULL,   -- canonical '<Mon> <YYYY>'
    status          TEXT NOT NULL,   -- ApplicationStatus label
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS applications_student_idx ON applications(student_id);
CREATE INDEX IF NOT EXISTS applications_status_idx  ON applications(status);

PRAGMA user_version = 1;
";
