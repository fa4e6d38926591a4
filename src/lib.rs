#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Sweep configuration types and config-file loading.
pub mod config;
/// Centralized constants used by pagination and filtering.
pub mod constants;
/// Record, file-reference, and descriptor types.
pub mod data;
mod errors;
/// Reusable demo runners shared by the demos/ entry points.
pub mod example_apps;
/// Field-shape classification and the cursor-driven page iterator.
pub mod extract;
/// Descriptor inclusion policies.
pub mod filter;
/// Aggregate emission metrics over a finished sweep.
pub mod metrics;
/// Run orchestration across classified classes.
pub mod runner;
/// Schema classification: which classes can hold file references.
pub mod schema;
/// Object-store capabilities and the in-memory reference store.
pub mod store;
/// Transfer sink capability and in-memory sinks.
pub mod transfer;
/// Shared type aliases.
pub mod types;

pub use config::SweepConfig;
pub use data::{ArrayElement, FieldValue, FileDescriptor, FileRef, Record};
pub use errors::SweepError;
pub use extract::{classify_record, extract_page, ClassPager, PageBatch, RecordShape};
pub use filter::{is_managed_name, InclusionPolicy};
pub use metrics::{emission_skew, ClassShare, EmissionSkew};
pub use runner::{ClassSweepStats, Runner, SweepReport};
pub use schema::{classify, ClassSchema, FieldDetection, FieldType, FileTarget};
pub use store::{InMemoryStore, ObjectStore, PageCursor, PageQuery, SchemaSource};
pub use transfer::{CollectingSink, TransferSink};
pub use types::{ClassName, FieldName, FileName, FileUrl, ObjectId};
