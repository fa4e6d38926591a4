use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ClassName, FieldName, FileName, FileUrl, ObjectId};

/// Opaque handle identifying a stored file's name and retrieval URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Stored file name, including any format prefix.
    pub name: FileName,
    /// Retrieval URL for the stored bytes.
    pub url: FileUrl,
}

impl FileRef {
    /// Create a file handle from its name and retrieval URL.
    pub fn new(name: impl Into<FileName>, url: impl Into<FileUrl>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One element of an array-typed field value.
///
/// Arrays may hold file references next to plain payloads; the variant is
/// the capability check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArrayElement {
    /// A nested file reference.
    File(FileRef),
    /// Any non-file payload.
    Other(Value),
}

/// Value of one record field, as returned by the object store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Direct file reference (the field's own value).
    File(FileRef),
    /// Array value; elements are inspected individually.
    Array(Vec<ArrayElement>),
    /// Any other payload; never file-bearing.
    Scalar(Value),
}

/// One stored record, borrowed read-only for the duration of a page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    /// Stable record identifier.
    pub id: ObjectId,
    /// Creation timestamp; the pagination key.
    pub created_at: DateTime<Utc>,
    /// Field values present on this record. Absent fields have no entry.
    pub fields: IndexMap<FieldName, FieldValue>,
}

impl Record {
    /// Create an empty record with identity and creation time only.
    pub fn new(id: impl Into<ObjectId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion, used when seeding stores.
    pub fn with_field(mut self, name: impl Into<FieldName>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Value of `field`, or `None` when the record carries no value for it.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Direct file accessor: the field's file handle when the field holds
    /// one as its own value. Files nested inside arrays are not visible
    /// through this accessor.
    pub fn file(&self, field: &str) -> Option<&FileRef> {
        match self.fields.get(field) {
            Some(FieldValue::File(file)) => Some(file),
            _ => None,
        }
    }
}

/// The unit handed to the transfer sink: one file slot on one record.
///
/// `file` is `None` when the field is schema-eligible but carries no value
/// on this record. Such descriptors preserve field identity for downstream
/// reconciliation and must never survive filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub class_name: ClassName,
    pub object_id: ObjectId,
    pub field_name: FieldName,
    pub file: Option<FileRef>,
}

impl FileDescriptor {
    /// `true` when this descriptor marks an absent value rather than a file.
    pub fn is_absent(&self) -> bool {
        self.file.is_none()
    }

    /// File name, when a file is present.
    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn direct_accessor_sees_only_direct_files() {
        let record = Record::new("obj_1", Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
            .with_field("avatar", FieldValue::File(FileRef::new("tfss-a.png", "https://x/a")))
            .with_field(
                "tags",
                FieldValue::Array(vec![
                    ArrayElement::File(FileRef::new("tfss-b.png", "https://x/b")),
                    ArrayElement::Other(Value::String("plain".into())),
                ]),
            )
            .with_field("title", FieldValue::Scalar(Value::String("hello".into())));

        assert_eq!(record.file("avatar").map(|f| f.name.as_str()), Some("tfss-a.png"));
        assert!(record.file("tags").is_none());
        assert!(record.file("title").is_none());
        assert!(record.file("missing").is_none());
    }

    #[test]
    fn absent_descriptor_is_flagged() {
        let absent = FileDescriptor {
            class_name: "Post".into(),
            object_id: "obj_1".into(),
            field_name: "cover".into(),
            file: None,
        };
        assert!(absent.is_absent());
        assert_eq!(absent.file_name(), None);

        let present = FileDescriptor {
            file: Some(FileRef::new("tfss-c.png", "https://x/c")),
            ..absent
        };
        assert!(!present.is_absent());
        assert_eq!(present.file_name(), Some("tfss-c.png"));
    }
}
