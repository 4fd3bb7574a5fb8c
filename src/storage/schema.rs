//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the job store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per job posting; first insert wins
CREATE TABLE IF NOT EXISTS jobs (
    job_id TEXT PRIMARY KEY,
    company TEXT NOT NULL,
    description TEXT NOT NULL,
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name TEXT NOT NULL UNIQUE
);

-- Category membership
CREATE TABLE IF NOT EXISTS jobs_categories (
    job_id TEXT NOT NULL REFERENCES jobs(job_id),
    category_id INTEGER NOT NULL REFERENCES categories(category_id),
    PRIMARY KEY (job_id, category_id)
);

CREATE TABLE IF NOT EXISTS searches (
    search_id INTEGER PRIMARY KEY AUTOINCREMENT,
    search_term TEXT NOT NULL UNIQUE
);

-- Which search found which job, and when
CREATE TABLE IF NOT EXISTS searches_jobs (
    search_id INTEGER NOT NULL REFERENCES searches(search_id),
    job_id TEXT NOT NULL REFERENCES jobs(job_id),
    first_seen TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    PRIMARY KEY (search_id, job_id)
);

CREATE INDEX IF NOT EXISTS idx_searches_jobs_job ON searches_jobs(job_id);
CREATE INDEX IF NOT EXISTS idx_jobs_categories_category ON jobs_categories(category_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
