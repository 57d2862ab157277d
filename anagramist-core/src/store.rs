//! A durable, single-process key-value store over candidate nodes, backed
//! by SQLite.
//!
//! The schema matches the original Python implementation's
//! `PersistentSearchTree` table exactly (down to the composite primary key
//! on `(placed, remaining)`), since that is the persisted state layout the
//! specification fixes in stone. New code addresses rows by `placed` alone
//! through a unique index, per the Open Question resolved in DESIGN.md.

use std::collections::HashMap;

use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// The stable, user-visible status tags of a candidate row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CandidateStatus {
    Ok = 0,
    Invalid = 1,
    FullyExplored = 5,
    Unexplored = 6,
    ManuallyInvalid = 7,
}

impl CandidateStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CandidateStatus::Invalid
                | CandidateStatus::FullyExplored
                | CandidateStatus::ManuallyInvalid
        )
    }
}

impl TryFrom<i32> for CandidateStatus {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, i32> {
        match value {
            0 => Ok(CandidateStatus::Ok),
            1 => Ok(CandidateStatus::Invalid),
            5 => Ok(CandidateStatus::FullyExplored),
            6 => Ok(CandidateStatus::Unexplored),
            7 => Ok(CandidateStatus::ManuallyInvalid),
            other => Err(other),
        }
    }
}

/// A row of the search tree, keyed by `placed`.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateRow {
    pub placed: String,
    pub remaining: String,
    pub parent: String,
    pub score: f64,
    pub cumulative_score: f64,
    pub mean_score: f64,
    pub status: CandidateStatus,
}

/// The outcome of a `status` update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusEffect {
    NoSuchRow,
    AlreadySet,
    Updated,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS candidates (
        placed TEXT NOT NULL,
        remaining TEXT NOT NULL,
        parent TEXT NOT NULL,
        score REAL,
        cumulative_score REAL,
        mean_score REAL,
        status INTEGER,
        PRIMARY KEY(placed, remaining)
    );
    CREATE UNIQUE INDEX IF NOT EXISTS candidates_placed_idx ON candidates(placed);
";

/// The search tree store. Absolutely not thread-safe -- every method takes
/// `&mut self` and callers must serialize all access themselves, per §5's
/// "thread-hostile" contract.
pub struct Store {
    conn: Connection,
}

fn row_from_query(row: &rusqlite::Row) -> rusqlite::Result<CandidateRow> {
    let status_code: i32 = row.get("status")?;
    let status = CandidateStatus::try_from(status_code).unwrap_or(CandidateStatus::Unexplored);
    Ok(CandidateRow {
        placed: row.get("placed")?,
        remaining: row.get("remaining")?,
        parent: row.get("parent")?,
        score: row.get("score")?,
        cumulative_score: row.get("cumulative_score")?,
        mean_score: row.get("mean_score")?,
        status,
    })
}

impl Store {
    /// Open (creating if necessary) a store backed by the sqlite database
    /// at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// An in-memory store, useful for tests and one-off scoring.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM candidates", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, placed: &str) -> Result<Option<CandidateRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT * FROM candidates WHERE placed = ?1 LIMIT 1",
                params![placed],
                row_from_query,
            )
            .optional()?;
        Ok(row)
    }

    pub fn get_children(&self, parent: &str) -> Result<Vec<CandidateRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM candidates WHERE parent = ?1")?;
        let rows = stmt
            .query_map(params![parent], row_from_query)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Every row whose `placed` is strictly prefixed by `placed + " "`. The
    /// empty root has no leading-space marker of its own (its children's
    /// `placed` starts directly with their first word), so every non-root
    /// row counts as its descendant.
    pub fn get_descendants(&self, placed: &str) -> Result<Vec<CandidateRow>> {
        if placed.is_empty() {
            let mut stmt = self
                .conn
                .prepare("SELECT * FROM candidates WHERE placed != ''")?;
            let rows = stmt
                .query_map([], row_from_query)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            return Ok(rows);
        }
        let prefix = format!("{placed} ");
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM candidates WHERE substr(placed, 1, length(?1)) = ?1")?;
        let rows = stmt
            .query_map(params![prefix], row_from_query)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Upsert keyed by `placed`. `remaining` and `parent` are immutable
    /// after first insertion: an existing row's write is skipped for those
    /// two columns, even if the caller supplies different values.
    pub fn push(&mut self, row: &CandidateRow) -> Result<()> {
        if self.get(&row.placed)?.is_some() {
            self.conn.execute(
                "UPDATE candidates SET score = ?1, cumulative_score = ?2, mean_score = ?3, status = ?4
                 WHERE placed = ?5",
                params![
                    row.score,
                    row.cumulative_score,
                    row.mean_score,
                    row.status as i32,
                    row.placed,
                ],
            )?;
        } else {
            self.conn.execute(
                "INSERT INTO candidates (placed, remaining, parent, score, cumulative_score, mean_score, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.placed,
                    row.remaining,
                    row.parent,
                    row.score,
                    row.cumulative_score,
                    row.mean_score,
                    row.status as i32,
                ],
            )?;
        }
        Ok(())
    }

    /// Weighted random selection among `OK` rows rooted at `prefix` (equal
    /// to `prefix`, or a strict descendant of it). Uses the reservoir
    /// exponential-tilt scheme from §9: pick the row maximizing
    /// `-ln(U)/exp(mean_score)`, so the full weight vector never needs to
    /// be materialized.
    pub fn sample(&self, prefix: &str) -> Result<Option<CandidateRow>> {
        let rows = if prefix.is_empty() {
            let mut stmt = self
                .conn
                .prepare("SELECT * FROM candidates WHERE status = ?1")?;
            stmt.query_map(params![CandidateStatus::Ok as i32], row_from_query)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            let descendant_prefix = format!("{prefix} ");
            let mut stmt = self.conn.prepare(
                "SELECT * FROM candidates WHERE status = ?1
                 AND (placed = ?2 OR substr(placed, 1, length(?3)) = ?3)",
            )?;
            stmt.query_map(
                params![CandidateStatus::Ok as i32, prefix, descendant_prefix],
                row_from_query,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut rng = rand::thread_rng();
        let mut best: Option<(f64, CandidateRow)> = None;
        for row in rows {
            let u: f64 = rng.gen_range(f64::EPSILON..1.0);
            let key = -u.ln() / row.mean_score.exp();
            match &best {
                Some((best_key, _)) if *best_key >= key => {}
                _ => best = Some((key, row)),
            }
        }
        Ok(best.map(|(_, row)| row))
    }

    /// Set a row's status, reporting the effect of the write.
    pub fn set_status(&mut self, placed: &str, new_status: CandidateStatus) -> Result<StatusEffect> {
        match self.get(placed)? {
            None => Ok(StatusEffect::NoSuchRow),
            Some(row) if row.status == new_status => Ok(StatusEffect::AlreadySet),
            Some(_) => {
                self.conn.execute(
                    "UPDATE candidates SET status = ?1 WHERE placed = ?2",
                    params![new_status as i32, placed],
                )?;
                Ok(StatusEffect::Updated)
            }
        }
    }

    /// Delete every strict descendant of `placed`. The row for `placed`
    /// itself is never deleted.
    pub fn trim(&mut self, placed: &str) -> Result<usize> {
        if placed.is_empty() {
            let count = self
                .conn
                .execute("DELETE FROM candidates WHERE placed != ''", [])?;
            return Ok(count);
        }
        let prefix = format!("{placed} ");
        let count = self.conn.execute(
            "DELETE FROM candidates WHERE substr(placed, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(count)
    }

    /// Read every row; bucket by the multiset sum of `letters(placed)` and
    /// `letters(remaining)`. OK iff there is at most one distinct bucket.
    pub fn verify(&self) -> Result<(bool, HashMap<String, usize>)> {
        let mut stmt = self.conn.prepare("SELECT * FROM candidates")?;
        let rows = stmt
            .query_map([], row_from_query)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut histogram: HashMap<String, usize> = HashMap::new();
        for row in &rows {
            use crate::multiset::LetterMultiset;
            let total = LetterMultiset::of(&row.placed).add(&LetterMultiset::of(&row.remaining));
            let bucket = total.to_compact_string();
            *histogram.entry(bucket).or_insert(0) += 1;
        }
        let ok = histogram.len() <= 1;
        Ok((ok, histogram))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(placed: &str, remaining: &str, parent: &str, status: CandidateStatus) -> CandidateRow {
        CandidateRow {
            placed: placed.to_owned(),
            remaining: remaining.to_owned(),
            parent: parent.to_owned(),
            score: -1.0,
            cumulative_score: -1.0,
            mean_score: -1.0,
            status,
        }
    }

    #[test]
    fn push_then_get_round_trips() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .push(&row("hi", "there", "", CandidateStatus::Ok))
            .unwrap();
        let got = store.get("hi").unwrap().unwrap();
        assert_eq!(got.remaining, "there");
        assert_eq!(got.status, CandidateStatus::Ok);
    }

    #[test]
    fn idempotent_push() {
        let mut store = Store::open_in_memory().unwrap();
        let r = row("hi", "there", "", CandidateStatus::Ok);
        store.push(&r).unwrap();
        store.push(&r).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn children_and_descendants() {
        let mut store = Store::open_in_memory().unwrap();
        store.push(&row("a", "bc", "", CandidateStatus::Ok)).unwrap();
        store
            .push(&row("a b", "c", "a", CandidateStatus::Ok))
            .unwrap();
        store
            .push(&row("a b c", "", "a b", CandidateStatus::Ok))
            .unwrap();

        let children = store.get_children("a").unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].placed, "a b");

        let descendants = store.get_descendants("a").unwrap();
        assert_eq!(descendants.len(), 2);
    }

    #[test]
    fn trim_deletes_descendants_not_self() {
        let mut store = Store::open_in_memory().unwrap();
        store.push(&row("a", "bc", "", CandidateStatus::Ok)).unwrap();
        store
            .push(&row("a b", "c", "a", CandidateStatus::Ok))
            .unwrap();
        let deleted = store.trim("a").unwrap();
        assert_eq!(deleted, 1);
        assert!(store.get_descendants("a").unwrap().is_empty());
        assert!(store.get("a").unwrap().is_some());
    }

    #[test]
    fn sample_only_returns_ok_rows_rooted_at_prefix() {
        let mut store = Store::open_in_memory().unwrap();
        store.push(&row("a", "bc", "", CandidateStatus::Ok)).unwrap();
        store
            .push(&row("a b", "c", "a", CandidateStatus::Invalid))
            .unwrap();
        let sampled = store.sample("a").unwrap();
        assert_eq!(sampled.unwrap().placed, "a");

        let none = store.sample("zzz").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn set_status_reports_effect() {
        let mut store = Store::open_in_memory().unwrap();
        store.push(&row("a", "bc", "", CandidateStatus::Ok)).unwrap();
        assert_eq!(
            store.set_status("a", CandidateStatus::Invalid).unwrap(),
            StatusEffect::Updated
        );
        assert_eq!(
            store.set_status("a", CandidateStatus::Invalid).unwrap(),
            StatusEffect::AlreadySet
        );
        assert_eq!(
            store.set_status("missing", CandidateStatus::Invalid).unwrap(),
            StatusEffect::NoSuchRow
        );
    }

    #[test]
    fn verify_flags_inconsistent_letter_banks() {
        let mut store = Store::open_in_memory().unwrap();
        store.push(&row("a", "bc", "", CandidateStatus::Ok)).unwrap();
        let (ok, _) = store.verify().unwrap();
        assert!(ok);

        store
            .push(&row("x", "totally different", "", CandidateStatus::Ok))
            .unwrap();
        let (ok, histogram) = store.verify().unwrap();
        assert!(!ok);
        assert!(histogram.len() >= 2);
    }
}
