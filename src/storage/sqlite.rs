//! SQLite storage implementation
//!
//! This module provides the relational result sink plus the read queries
//! used by the statistics and export modes.

use crate::model::{CategoryGroup, JobPosting};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{format_timestamp, PersistSummary, ResultSink, StorageResult};
use crate::storage::{AssociationRecord, DescriptionRecord, NamedCount, StoreCounts};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

const UPSERT_CATEGORY: &str = "INSERT INTO categories (category_name) VALUES (?1)
     ON CONFLICT(category_name) DO UPDATE SET category_name = excluded.category_name
     RETURNING category_id";

const UPSERT_SEARCH: &str = "INSERT INTO searches (search_term) VALUES (?1)
     ON CONFLICT(search_term) DO UPDATE SET search_term = excluded.search_term
     RETURNING search_id";

const INSERT_JOB: &str = "INSERT OR IGNORE INTO jobs (job_id, company, description, title)
     VALUES (?1, ?2, ?3, ?4)";

const INSERT_JOB_CATEGORY: &str =
    "INSERT OR IGNORE INTO jobs_categories (job_id, category_id) VALUES (?1, ?2)";

// first_seen is only ever written by the INSERT branch
const UPSERT_SEARCH_JOB: &str =
    "INSERT INTO searches_jobs (search_id, job_id, first_seen, last_seen)
     VALUES (?1, ?2, ?3, ?3)
     ON CONFLICT(search_id, job_id) DO UPDATE SET last_seen = excluded.last_seen";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    label: String,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// Missing parent directories are created. The schema is applied on
    /// every open and is a no-op for an existing store.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            label: format!("sqlite:{}", path.display()),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            label: "sqlite::memory:".to_string(),
        })
    }

    /// Row counts of every table
    pub fn counts(&self) -> StorageResult<StoreCounts> {
        let count = |table: &str| -> StorageResult<usize> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })?;
            Ok(n as usize)
        };

        Ok(StoreCounts {
            jobs: count("jobs")?,
            categories: count("categories")?,
            searches: count("searches")?,
            job_categories: count("jobs_categories")?,
            search_jobs: count("searches_jobs")?,
        })
    }

    /// Looks up a stored posting
    pub fn get_job(&self, job_id: &str) -> StorageResult<Option<JobPosting>> {
        let job = self
            .conn
            .query_row(
                "SELECT job_id, company, description, title FROM jobs WHERE job_id = ?1",
                params![job_id],
                |row| {
                    Ok(JobPosting {
                        job_id: row.get(0)?,
                        company: row.get(1)?,
                        description: row.get(2)?,
                        title: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(job)
    }

    /// Looks up the association between a search term and a job
    pub fn get_association(
        &self,
        search_term: &str,
        job_id: &str,
    ) -> StorageResult<Option<AssociationRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT s.search_term, sj.job_id, sj.first_seen, sj.last_seen
                 FROM searches_jobs sj
                 JOIN searches s ON s.search_id = sj.search_id
                 WHERE s.search_term = ?1 AND sj.job_id = ?2",
                params![search_term, job_id],
                |row| {
                    Ok(AssociationRecord {
                        search_term: row.get(0)?,
                        job_id: row.get(1)?,
                        first_seen: row.get(2)?,
                        last_seen: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// Number of distinct jobs each search has ever found
    pub fn search_counts(&self) -> StorageResult<Vec<NamedCount>> {
        self.named_counts(
            "SELECT s.search_term, COUNT(sj.job_id)
             FROM searches s
             LEFT JOIN searches_jobs sj ON sj.search_id = s.search_id
             GROUP BY s.search_id
             ORDER BY s.search_term",
        )
    }

    /// Number of distinct jobs in each category
    pub fn category_counts(&self) -> StorageResult<Vec<NamedCount>> {
        self.named_counts(
            "SELECT c.category_name, COUNT(jc.job_id)
             FROM categories c
             LEFT JOIN jobs_categories jc ON jc.category_id = c.category_id
             GROUP BY c.category_id
             ORDER BY c.category_name",
        )
    }

    /// Every stored job's description, ordered by job id
    pub fn load_descriptions(&self) -> StorageResult<Vec<DescriptionRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT job_id, description FROM jobs ORDER BY job_id")?;

        let records = stmt
            .query_map([], |row| {
                Ok(DescriptionRecord {
                    job_id: row.get(0)?,
                    description: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn named_counts(&self, sql: &str) -> StorageResult<Vec<NamedCount>> {
        let mut stmt = self.conn.prepare(sql)?;
        let counts = stmt
            .query_map([], |row| {
                Ok(NamedCount {
                    name: row.get(0)?,
                    count: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

fn count_search_jobs(tx: &Transaction<'_>) -> Result<i64, rusqlite::Error> {
    tx.query_row("SELECT COUNT(*) FROM searches_jobs", [], |row| row.get(0))
}

/// Writes the tree inside `tx`; the caller commits
fn write_tree(
    tx: &Transaction<'_>,
    categories: &[CategoryGroup],
    seen_at: &str,
) -> Result<PersistSummary, rusqlite::Error> {
    let associations_before = count_search_jobs(tx)?;
    let mut summary = PersistSummary::default();

    let mut upsert_category = tx.prepare_cached(UPSERT_CATEGORY)?;
    let mut upsert_search = tx.prepare_cached(UPSERT_SEARCH)?;
    let mut insert_job = tx.prepare_cached(INSERT_JOB)?;
    let mut insert_job_category = tx.prepare_cached(INSERT_JOB_CATEGORY)?;
    let mut upsert_search_job = tx.prepare_cached(UPSERT_SEARCH_JOB)?;

    for category in categories {
        let category_id: i64 =
            upsert_category.query_row(params![category.category], |row| row.get(0))?;
        summary.categories += 1;

        for search in &category.searches {
            let search_id: i64 =
                upsert_search.query_row(params![search.search_term], |row| row.get(0))?;
            summary.searches += 1;

            for job in &search.jobs {
                summary.new_jobs += insert_job.execute(params![
                    job.job_id,
                    job.company,
                    job.description,
                    job.title
                ])?;
                insert_job_category.execute(params![job.job_id, category_id])?;
                upsert_search_job.execute(params![search_id, job.job_id, seen_at])?;
                summary.postings += 1;
            }
        }
    }

    let associations_after = count_search_jobs(tx)?;
    summary.new_associations = (associations_after - associations_before).max(0) as usize;

    Ok(summary)
}

impl ResultSink for SqliteStorage {
    fn persist(
        &mut self,
        categories: &[CategoryGroup],
        seen_at: DateTime<Utc>,
    ) -> StorageResult<PersistSummary> {
        let seen_at = format_timestamp(seen_at);

        // Dropping an uncommitted transaction rolls it back
        let tx = self.conn.transaction()?;
        let summary = write_tree(&tx, categories, &seen_at)?;
        tx.commit()?;

        tracing::debug!(
            "Persisted {} postings ({} new jobs, {} new associations)",
            summary.postings,
            summary.new_jobs,
            summary.new_associations
        );

        Ok(summary)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
