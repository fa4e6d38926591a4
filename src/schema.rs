//! Schema classification: which classes can hold file references.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{ClassName, FieldName};

/// Type tag for one schema field.
///
/// The schema service reports many more tags (strings, numbers, pointers);
/// everything that cannot carry a file collapses to `Scalar`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// Direct file reference.
    File,
    /// Array value; arrays may transparently hold file references.
    Array,
    /// Any other tag; never file-bearing.
    Scalar,
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "File" => FieldType::File,
            "Array" => FieldType::Array,
            _ => FieldType::Scalar,
        })
    }
}

/// Field layout for one object class.
///
/// Fetched once at the start of a run and immutable for its duration;
/// schema drift mid-run is not handled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Unique class name.
    pub class_name: ClassName,
    /// Field name to type tag, in schema order.
    pub fields: IndexMap<FieldName, FieldType>,
}

/// Which schema field shapes count as file-bearing during classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDetection {
    /// Only direct `File` fields.
    DirectOnly,
    /// `File` fields plus `Array` fields, so array-borne files are
    /// discovered too.
    DirectAndArray,
}

impl FieldDetection {
    fn matches(self, field_type: FieldType) -> bool {
        match self {
            FieldDetection::DirectOnly => field_type == FieldType::File,
            FieldDetection::DirectAndArray => {
                matches!(field_type, FieldType::File | FieldType::Array)
            }
        }
    }
}

/// One class worth sweeping.
#[derive(Clone, Debug)]
pub struct FileTarget {
    /// Class to query.
    pub class_name: ClassName,
    /// Candidate field names, in schema order.
    pub fields: Vec<FieldName>,
    /// Subset of `fields` that are array-typed.
    pub array_fields: HashSet<FieldName>,
}

/// Reduce schemas to the classes that can hold file references.
///
/// Pure transformation: a schema with no candidate fields yields no target,
/// everything else contributes exactly one. Target order follows the input.
pub fn classify(schemas: &[ClassSchema], detection: FieldDetection) -> Vec<FileTarget> {
    schemas
        .iter()
        .filter_map(|schema| {
            let mut fields = Vec::new();
            let mut array_fields = HashSet::new();
            for (name, field_type) in &schema.fields {
                if !detection.matches(*field_type) {
                    continue;
                }
                fields.push(name.clone());
                if *field_type == FieldType::Array {
                    array_fields.insert(name.clone());
                }
            }
            if fields.is_empty() {
                return None;
            }
            Some(FileTarget {
                class_name: schema.class_name.clone(),
                fields,
                array_fields,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(class_name: &str, fields: &[(&str, FieldType)]) -> ClassSchema {
        ClassSchema {
            class_name: class_name.to_string(),
            fields: fields
                .iter()
                .map(|(name, field_type)| (name.to_string(), *field_type))
                .collect(),
        }
    }

    #[test]
    fn direct_file_fields_are_detected_and_scalars_ignored() {
        let schemas = vec![schema(
            "Profile",
            &[("avatar", FieldType::File), ("bio", FieldType::Scalar)],
        )];
        let targets = classify(&schemas, FieldDetection::DirectOnly);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].class_name, "Profile");
        assert_eq!(targets[0].fields, vec!["avatar".to_string()]);
        assert!(targets[0].array_fields.is_empty());
    }

    #[test]
    fn array_fields_are_candidates_only_in_array_mode() {
        let schemas = vec![schema("Post", &[("gallery", FieldType::Array)])];

        let direct = classify(&schemas, FieldDetection::DirectOnly);
        assert!(direct.is_empty());

        let both = classify(&schemas, FieldDetection::DirectAndArray);
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].fields, vec!["gallery".to_string()]);
        assert!(both[0].array_fields.contains("gallery"));
    }

    #[test]
    fn classes_without_candidates_yield_no_target() {
        let schemas = vec![
            schema("Log", &[("message", FieldType::Scalar)]),
            schema("Doc", &[("scan", FieldType::File)]),
        ];
        let targets = classify(&schemas, FieldDetection::DirectAndArray);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].class_name, "Doc");
    }

    #[test]
    fn classification_is_idempotent() {
        let schemas = vec![
            schema(
                "Post",
                &[
                    ("cover", FieldType::File),
                    ("gallery", FieldType::Array),
                    ("title", FieldType::Scalar),
                ],
            ),
            schema("Note", &[("body", FieldType::Scalar)]),
        ];
        let first = classify(&schemas, FieldDetection::DirectAndArray);
        let second = classify(&schemas, FieldDetection::DirectAndArray);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.class_name, b.class_name);
            assert_eq!(a.fields, b.fields);
            assert_eq!(a.array_fields, b.array_fields);
        }
    }

    #[test]
    fn candidate_order_follows_the_schema() {
        let schemas = vec![schema(
            "Mixed",
            &[
                ("zeta", FieldType::File),
                ("alpha", FieldType::Array),
                ("mid", FieldType::File),
            ],
        )];
        let targets = classify(&schemas, FieldDetection::DirectAndArray);
        assert_eq!(
            targets[0].fields,
            vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()]
        );
    }

    #[test]
    fn unknown_type_tags_deserialize_as_scalar() {
        let parsed: FieldType = serde_json::from_str("\"Pointer\"").expect("tag parses");
        assert_eq!(parsed, FieldType::Scalar);
        let file: FieldType = serde_json::from_str("\"File\"").expect("tag parses");
        assert_eq!(file, FieldType::File);
    }
}
