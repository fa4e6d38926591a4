//! Field-shape classification and the cursor-driven page iterator.

use tracing::debug;

use crate::constants::pagination::CREATED_AT_KEY;
use crate::data::{ArrayElement, FieldValue, FileDescriptor, Record};
use crate::errors::SweepError;
use crate::filter::InclusionPolicy;
use crate::schema::FileTarget;
use crate::store::{ObjectStore, PageCursor, PageQuery};
use crate::types::FieldName;

/// Field-shape classification outcome for one record.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordShape {
    /// No array field fired: one descriptor per candidate field via the
    /// direct accessor, absent values included.
    File(Vec<FileDescriptor>),
    /// An array field was present but held no file elements; nothing is
    /// emitted for the record.
    ArrayNoFiles,
    /// At least one array field held file elements. Only the array-derived
    /// descriptors are emitted; direct file fields on the same record are
    /// suppressed.
    ArrayWithFiles(Vec<FileDescriptor>),
}

/// Classify one record's candidate fields.
///
/// Array elements bypass the direct file accessor, since their files are
/// nested inside the sequence rather than being the field's own value.
pub fn classify_record(record: &Record, target: &FileTarget) -> RecordShape {
    let mut array_descriptors = Vec::new();
    let mut array_present = false;
    for field in &target.fields {
        if !target.array_fields.contains(field) {
            continue;
        }
        let Some(FieldValue::Array(elements)) = record.get(field) else {
            continue;
        };
        array_present = true;
        for element in elements {
            if let ArrayElement::File(file) = element {
                array_descriptors.push(FileDescriptor {
                    class_name: target.class_name.clone(),
                    object_id: record.id.clone(),
                    field_name: field.clone(),
                    file: Some(file.clone()),
                });
            }
        }
    }
    if !array_descriptors.is_empty() {
        return RecordShape::ArrayWithFiles(array_descriptors);
    }
    if array_present {
        return RecordShape::ArrayNoFiles;
    }
    let descriptors = target
        .fields
        .iter()
        .map(|field| FileDescriptor {
            class_name: target.class_name.clone(),
            object_id: record.id.clone(),
            field_name: field.clone(),
            file: record.file(field).cloned(),
        })
        .collect();
    RecordShape::File(descriptors)
}

/// Filtered descriptors for one page, plus drop accounting.
#[derive(Clone, Debug, Default)]
pub struct PageBatch {
    /// Descriptors that survived the inclusion policy, in record order.
    pub descriptors: Vec<FileDescriptor>,
    /// Descriptors dropped by the policy (absent markers included).
    pub dropped: usize,
}

/// Classify every record on a page, flatten, and apply `policy`.
pub fn extract_page(records: &[Record], target: &FileTarget, policy: InclusionPolicy) -> PageBatch {
    let mut batch = PageBatch::default();
    for record in records {
        match classify_record(record, target) {
            RecordShape::File(descriptors) => {
                for descriptor in descriptors {
                    if policy.admits(&descriptor) {
                        batch.descriptors.push(descriptor);
                    } else {
                        batch.dropped += 1;
                    }
                }
            }
            RecordShape::ArrayNoFiles => {}
            RecordShape::ArrayWithFiles(descriptors) => {
                // Group semantics: the whole record's set stands or falls
                // together.
                if policy.admits_any(&descriptors) {
                    batch.descriptors.extend(descriptors);
                } else {
                    batch.dropped += descriptors.len();
                }
            }
        }
    }
    batch
}

/// Restartable page iterator over one class.
///
/// Produces a lazy, ordered sequence of pages; the compound cursor is
/// observable between pages so callers can checkpoint and later `resume`.
/// An empty fetch terminates pagination for good.
pub struct ClassPager<'a> {
    store: &'a dyn ObjectStore,
    target: &'a FileTarget,
    page_size: usize,
    cursor: Option<PageCursor>,
    exhausted: bool,
    pages: usize,
}

impl<'a> ClassPager<'a> {
    /// Start pagination from the beginning of the class.
    pub fn new(store: &'a dyn ObjectStore, target: &'a FileTarget, page_size: usize) -> Self {
        Self {
            store,
            target,
            page_size,
            cursor: None,
            exhausted: false,
            pages: 0,
        }
    }

    /// Resume pagination strictly after `cursor`, typically restored from a
    /// checkpoint persisted by the caller.
    pub fn resume(
        store: &'a dyn ObjectStore,
        target: &'a FileTarget,
        page_size: usize,
        cursor: PageCursor,
    ) -> Self {
        Self {
            cursor: Some(cursor),
            ..Self::new(store, target, page_size)
        }
    }

    /// Last committed cursor, if any page has been fetched.
    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    /// `true` once an empty page has terminated pagination.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Number of non-empty pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Fetch the next page, committing the cursor past its last record.
    ///
    /// Returns `Ok(None)` once a fetch comes back empty. A query failure is
    /// propagated with the cursor left at the last committed position, so
    /// the caller can retry or resume without losing progress.
    pub fn next_page(&mut self) -> Result<Option<Vec<Record>>, SweepError> {
        if self.exhausted {
            return Ok(None);
        }
        let mut keys: Vec<FieldName> = self.target.fields.clone();
        keys.push(CREATED_AT_KEY.to_string());
        let query = PageQuery {
            class_name: self.target.class_name.clone(),
            keys,
            exists_any: self.target.fields.clone(),
            after: self.cursor.clone(),
            limit: self.page_size,
        };
        let records = self.store.find(&query)?;
        if records.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }
        let last = records.last().expect("page is non-empty");
        self.cursor = Some(PageCursor::of(last));
        self.pages += 1;
        debug!(
            class_name = %self.target.class_name,
            page = self.pages,
            record_count = records.len(),
            "page fetched"
        );
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FileRef;
    use crate::schema::{classify, ClassSchema, FieldDetection, FieldType};
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn post_target() -> FileTarget {
        let schema = ClassSchema {
            class_name: "Post".into(),
            fields: [
                ("avatar".to_string(), FieldType::File),
                ("tags".to_string(), FieldType::Array),
            ]
            .into_iter()
            .collect(),
        };
        classify(&[schema], FieldDetection::DirectAndArray)
            .pop()
            .expect("Post classifies")
    }

    fn at(second: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, second).unwrap()
    }

    #[test]
    fn array_files_suppress_direct_fields() {
        let record = Record::new("obj_1", at(0))
            .with_field("avatar", FieldValue::File(FileRef::new("tfss-a.png", "https://x/a")))
            .with_field(
                "tags",
                FieldValue::Array(vec![
                    ArrayElement::File(FileRef::new("x.png", "https://x/x")),
                    ArrayElement::Other(Value::String("plain".into())),
                    ArrayElement::File(FileRef::new("y.png", "https://x/y")),
                ]),
            );
        let shape = classify_record(&record, &post_target());
        let RecordShape::ArrayWithFiles(descriptors) = shape else {
            panic!("expected array-with-files, got {shape:?}");
        };
        assert_eq!(descriptors.len(), 2);
        assert!(descriptors.iter().all(|d| d.field_name == "tags"));
        let names: Vec<_> = descriptors.iter().filter_map(|d| d.file_name()).collect();
        assert_eq!(names, vec!["x.png", "y.png"]);
    }

    #[test]
    fn file_less_array_emits_nothing() {
        let record = Record::new("obj_2", at(1)).with_field(
            "tags",
            FieldValue::Array(vec![ArrayElement::Other(Value::String("plain".into()))]),
        );
        assert_eq!(
            classify_record(&record, &post_target()),
            RecordShape::ArrayNoFiles
        );
    }

    #[test]
    fn plain_file_path_marks_absent_fields() {
        let record = Record::new("obj_3", at(2)).with_field(
            "avatar",
            FieldValue::File(FileRef::new("tfss-a.png", "https://x/a")),
        );
        let RecordShape::File(descriptors) = classify_record(&record, &post_target()) else {
            panic!("expected plain file shape");
        };
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].field_name, "avatar");
        assert!(!descriptors[0].is_absent());
        assert_eq!(descriptors[1].field_name, "tags");
        assert!(descriptors[1].is_absent());
    }

    #[test]
    fn extract_page_applies_group_semantics() {
        let with_unmanaged_array = Record::new("obj_1", at(0)).with_field(
            "tags",
            FieldValue::Array(vec![
                ArrayElement::File(FileRef::new("random.png", "https://x/r")),
                ArrayElement::File(FileRef::new("tfss-keep.png", "https://x/k")),
            ]),
        );
        let all_unmanaged = Record::new("obj_2", at(1)).with_field(
            "tags",
            FieldValue::Array(vec![ArrayElement::File(FileRef::new(
                "other.jpg",
                "https://x/o",
            ))]),
        );
        let target = post_target();

        let batch = extract_page(
            &[with_unmanaged_array, all_unmanaged],
            &target,
            InclusionPolicy::LegacyNames,
        );
        // obj_1's group survives whole (one member passes); obj_2's is
        // dropped whole.
        assert_eq!(batch.descriptors.len(), 2);
        assert!(batch.descriptors.iter().all(|d| d.object_id == "obj_1"));
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn tied_created_at_spans_page_boundary_without_loss() {
        let target = post_target();
        let store = InMemoryStore::new(Vec::new());
        // Five records sharing one creation timestamp, page size two.
        store.seed(
            "Post",
            (0..5)
                .map(|idx| {
                    Record::new(format!("obj_{idx}"), at(7)).with_field(
                        "avatar",
                        FieldValue::File(FileRef::new(format!("tfss-{idx}.png"), "https://x")),
                    )
                })
                .collect(),
        );

        let mut pager = ClassPager::new(&store, &target, 2);
        let mut seen = Vec::new();
        while let Some(page) = pager.next_page().expect("pages fetch") {
            seen.extend(page.into_iter().map(|record| record.id));
        }
        assert_eq!(
            seen,
            vec!["obj_0", "obj_1", "obj_2", "obj_3", "obj_4"]
        );
        assert!(pager.is_exhausted());
        assert_eq!(pager.pages_fetched(), 3);
    }

    #[test]
    fn resume_continues_strictly_after_the_checkpoint() {
        let target = post_target();
        let store = InMemoryStore::new(Vec::new());
        store.seed(
            "Post",
            (0..6)
                .map(|idx| {
                    Record::new(format!("obj_{idx}"), at(idx)).with_field(
                        "avatar",
                        FieldValue::File(FileRef::new(format!("tfss-{idx}.png"), "https://x")),
                    )
                })
                .collect(),
        );

        let mut first = ClassPager::new(&store, &target, 3);
        first.next_page().expect("first page").expect("non-empty");
        let checkpoint = first.cursor().cloned().expect("cursor committed");

        let mut resumed = ClassPager::resume(&store, &target, 3, checkpoint);
        let page = resumed
            .next_page()
            .expect("resumed page")
            .expect("non-empty");
        let ids: Vec<&str> = page.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["obj_3", "obj_4", "obj_5"]);
    }
}
