//! The record store.
//!
//! Holds the ordered student collection in memory and mirrors it to a
//! [`KeyValueStore`] after every change. The whole collection is serialized
//! as one JSON array under a single key; there is no incremental diffing.
//!
//! Ids come from a monotonic sequence whose high-water mark is kept under a
//! second key (`<key>.next_id`), so the id of a deleted record is never handed
//! out again. `i64::MAX` is never assigned; reaching it means the sequence is
//! exhausted and further adds fail.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{Grade, StudentRecord, ValidStudent};
use crate::storage::KeyValueStore;

/// Default key for the serialized collection.
pub const DEFAULT_COLLECTION_KEY: &str = "students";

/// In-memory student collection backed by durable storage.
#[derive(Debug)]
pub struct RecordStore<S> {
    kv: S,
    key: String,
    records: Vec<StudentRecord>,
    next_id: i64,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Load the collection stored under `key`.
    ///
    /// A missing key, an unreadable backend or malformed data all yield an
    /// empty collection; the problem is logged and otherwise ignored.
    pub fn load(kv: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = read_collection(&kv, &key);
        let stored_seq = read_sequence(&kv, &sequence_key(&key));
        let after_max = records
            .iter()
            .map(|r| r.id)
            .max()
            .map_or(1, |max| max.checked_add(1).unwrap_or(i64::MAX));
        let next_id = stored_seq.unwrap_or(1).max(after_max).max(1);

        info!(
            "Loaded {} student records from key '{}'",
            records.len(),
            key
        );
        Self {
            kv,
            key,
            records,
            next_id,
        }
    }

    /// All records in insertion order.
    #[must_use]
    pub fn list(&self) -> &[StudentRecord] {
        &self.records
    }

    /// The record with `id`, if present.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The key the collection is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing key-value store.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.kv
    }

    /// Append a new record with a fresh id and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the id sequence is exhausted or the collection
    /// cannot be written; the in-memory collection is unchanged in that case.
    pub fn add(&mut self, student: ValidStudent) -> Result<StudentRecord> {
        let id = self.next_id;
        let next = id.checked_add(1).ok_or(Error::IdsExhausted)?;
        // Bump the sequence first so a failed collection write only skips an id
        self.kv.set(&sequence_key(&self.key), &next.to_string())?;
        self.next_id = next;

        let record = StudentRecord::from_valid(id, student);
        let mut records = self.records.clone();
        records.push(record.clone());
        self.commit(records)?;

        info!("Added student {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Replace every field except the id of the record with `id`.
    ///
    /// Returns `false` without touching anything if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn update(&mut self, id: i64, student: ValidStudent) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!("Update of unknown student {} ignored", id);
            return Ok(false);
        };

        let mut records = self.records.clone();
        records[index].apply(student);
        self.commit(records)?;

        info!("Updated student {}", id);
        Ok(true)
    }

    /// Remove the record with `id`.
    ///
    /// Returns `false` without touching anything if no such record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!("Delete of unknown student {} ignored", id);
            return Ok(false);
        };

        let mut records = self.records.clone();
        records.remove(index);
        self.commit(records)?;

        info!("Deleted student {}", id);
        Ok(true)
    }

    /// Counts by enrollment and grade, plus the last write time.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot report the write time.
    pub fn stats(&self) -> Result<RecordStats> {
        let active = self.records.iter().filter(|r| r.enrollment_status).count();
        let by_grade = Grade::ALL
            .iter()
            .map(|&grade| GradeCount {
                grade,
                count: self.records.iter().filter(|r| r.grade == grade).count(),
            })
            .collect();

        Ok(RecordStats {
            total: self.records.len(),
            active,
            inactive: self.records.len() - active,
            by_grade,
            last_saved: self.kv.updated_at(&self.key)?,
        })
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Write `records` under the collection key, then adopt them.
    fn commit(&mut self, records: Vec<StudentRecord>) -> Result<()> {
        let json = serde_json::to_string(&records)?;
        self.kv.set(&self.key, &json)?;
        self.records = records;
        Ok(())
    }
}

/// Summary counts for the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    /// Total records.
    pub total: usize,
    /// Enrolled records.
    pub active: usize,
    /// Records not enrolled.
    pub inactive: usize,
    /// Record count per grade, in grade order.
    pub by_grade: Vec<GradeCount>,
    /// When the collection was last written.
    pub last_saved: Option<DateTime<Utc>>,
}

/// Number of records holding one grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    /// The grade.
    pub grade: Grade,
    /// How many records hold it.
    pub count: usize,
}

fn sequence_key(key: &str) -> String {
    format!("{key}.next_id")
}

fn read_collection<S: KeyValueStore>(kv: &S, key: &str) -> Vec<StudentRecord> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Could not read stored students, starting empty: {}", e);
            return Vec::new();
        }
    };

    let records: Vec<StudentRecord> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Stored students are malformed, starting empty: {}", e);
            return Vec::new();
        }
    };

    if !collection_is_sound(&records) {
        warn!("Stored students violate record invariants, starting empty");
        return Vec::new();
    }
    records
}

/// Duplicate ids, blank names or zero ages mean the data was not written by us.
fn collection_is_sound(records: &[StudentRecord]) -> bool {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .all(|r| seen.insert(r.id) && !r.name.trim().is_empty() && r.age > 0)
}

fn read_sequence<S: KeyValueStore>(kv: &S, key: &str) -> Option<i64> {
    match kv.get(key) {
        Ok(Some(raw)) => raw.trim().parse().ok().or_else(|| {
            warn!("Ignoring malformed id sequence '{}'", raw);
            None
        }),
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read id sequence: {}", e);
            None
        }
    }
}
