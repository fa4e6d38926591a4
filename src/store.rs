//! Object-store capabilities and the in-memory reference store.
//!
//! Ownership model:
//! - `SchemaSource` yields the per-class field schemas, once per run.
//! - `ObjectStore` executes one paginated read per call; both are stateless
//!   multiplexed services safe for concurrent use across classes.
//! - `InMemoryStore` implements both for tests and demos.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::Record;
use crate::errors::SweepError;
use crate::schema::ClassSchema;
use crate::types::{ClassName, FieldName, ObjectId};

/// Pagination watermark within one class.
///
/// Ordering is the compound `(created_at, object_id)` key; the strict
/// greater-than comparison keeps records with tied creation timestamps from
/// being skipped or revisited across a page boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Creation timestamp of the last committed record.
    pub created_at: DateTime<Utc>,
    /// Identifier of the last committed record; the tie-breaker.
    pub object_id: ObjectId,
}

impl PageCursor {
    /// Cursor position of `record`.
    pub fn of(record: &Record) -> Self {
        Self {
            created_at: record.created_at,
            object_id: record.id.clone(),
        }
    }

    /// `true` when `record` sorts strictly after this cursor.
    pub fn admits(&self, record: &Record) -> bool {
        (record.created_at, record.id.as_str()) > (self.created_at, self.object_id.as_str())
    }
}

/// One paginated read against the object store.
///
/// Results are sorted ascending by `(createdAt, objectId)` and truncated to
/// `limit`. `keys` is the field projection (the candidate fields plus the
/// creation timestamp); `exists_any` is the OR-of-existence predicate: a
/// record qualifies only when at least one listed field carries a value.
#[derive(Clone, Debug)]
pub struct PageQuery {
    /// Class to read from.
    pub class_name: ClassName,
    /// Field projection.
    pub keys: Vec<FieldName>,
    /// OR-of-existence predicate fields.
    pub exists_any: Vec<FieldName>,
    /// Fetch only records sorting strictly after this cursor.
    pub after: Option<PageCursor>,
    /// Maximum records returned.
    pub limit: usize,
}

/// Schema service capability, consumed once per run.
pub trait SchemaSource: Send + Sync {
    /// Fetch every class schema. Failure here is fatal to the whole run.
    fn class_schemas(&self) -> Result<Vec<ClassSchema>, SweepError>;
}

/// Query service capability.
///
/// Implementations run with elevated read permission; this crate only
/// issues the reads.
pub trait ObjectStore: Send + Sync {
    /// Execute one paginated read.
    fn find(&self, query: &PageQuery) -> Result<Vec<Record>, SweepError>;
}

/// In-memory store for tests and demos.
///
/// Honors projection, the existence predicate, compound ordering, cursor
/// filtering, and the page limit. Records may be seeded between reads to
/// exercise pagination under a mutating dataset.
pub struct InMemoryStore {
    schemas: Vec<ClassSchema>,
    classes: RwLock<HashMap<ClassName, Vec<Record>>>,
}

impl InMemoryStore {
    /// Create an empty store serving `schemas`.
    pub fn new(schemas: Vec<ClassSchema>) -> Self {
        Self {
            schemas,
            classes: RwLock::new(HashMap::new()),
        }
    }

    /// Append `records` to `class`. Insertion order is irrelevant; reads
    /// sort on the compound key.
    pub fn seed(&self, class: &str, records: Vec<Record>) {
        let mut classes = self.classes.write().expect("store lock poisoned");
        classes.entry(class.to_string()).or_default().extend(records);
    }

    /// Number of records currently held for `class`.
    pub fn len_of(&self, class: &str) -> usize {
        let classes = self.classes.read().expect("store lock poisoned");
        classes.get(class).map(Vec::len).unwrap_or(0)
    }
}

impl SchemaSource for InMemoryStore {
    fn class_schemas(&self) -> Result<Vec<ClassSchema>, SweepError> {
        Ok(self.schemas.clone())
    }
}

impl ObjectStore for InMemoryStore {
    fn find(&self, query: &PageQuery) -> Result<Vec<Record>, SweepError> {
        let classes = self.classes.read().expect("store lock poisoned");
        let Some(records) = classes.get(&query.class_name) else {
            return Ok(Vec::new());
        };
        let mut page: Vec<Record> = records
            .iter()
            .filter(|record| {
                query.exists_any.is_empty()
                    || query.exists_any.iter().any(|field| record.get(field).is_some())
            })
            .filter(|record| {
                query
                    .after
                    .as_ref()
                    .map_or(true, |cursor| cursor.admits(record))
            })
            .cloned()
            .collect();
        page.sort_by(|a, b| {
            (a.created_at, a.id.as_str()).cmp(&(b.created_at, b.id.as_str()))
        });
        page.truncate(query.limit);
        for record in &mut page {
            record
                .fields
                .retain(|name, _| query.keys.iter().any(|key| key == name));
        }
        Ok(page)
    }
}
