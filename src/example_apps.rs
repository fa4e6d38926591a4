//! Reusable demo runners shared by the `demos/` entry points.

use std::error::Error;
use std::path::PathBuf;

use clap::{error::ErrorKind, Parser};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::SweepConfig;
use crate::data::{ArrayElement, FieldValue, FileRef, Record};
use crate::filter::InclusionPolicy;
use crate::metrics::emission_skew;
use crate::runner::Runner;
use crate::schema::{ClassSchema, FieldDetection, FieldType};
use crate::store::InMemoryStore;
use crate::transfer::CollectingSink;

#[derive(Debug, Parser)]
#[command(
    name = "sweep_demo",
    disable_help_subcommand = true,
    about = "Sweep a seeded in-memory store for file attachments",
    long_about = "Seed an in-memory object store with a small synthetic dataset, sweep every file-bearing class, and print the per-class report."
)]
struct SweepDemoCli {
    #[arg(long, value_name = "PATH", help = "Optional JSON config file")]
    config: Option<PathBuf>,
    #[arg(long, help = "Page size override")]
    page_size: Option<usize>,
    #[arg(long, help = "Require current-format or legacy-format file names")]
    legacy_names: bool,
    #[arg(long, help = "Detect direct file fields only (skip array-borne files)")]
    direct_only: bool,
    #[arg(long, default_value_t = 10, help = "Synthetic records per class")]
    records: usize,
}

/// Entry point for `demos/sweep_demo.rs`.
pub fn run_sweep_demo(args: impl IntoIterator<Item = String>) -> Result<(), Box<dyn Error>> {
    let argv = std::iter::once("sweep_demo".to_string()).chain(args);
    let cli = match SweepDemoCli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let mut config = match &cli.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if cli.legacy_names {
        config.policy = InclusionPolicy::LegacyNames;
    }
    if cli.direct_only {
        config.detection = FieldDetection::DirectOnly;
    }
    config.validate()?;

    let store = seed_demo_store(cli.records);
    let sink = CollectingSink::new();
    let runner = Runner::new(&store, &store, &sink, config)?;
    let report = runner.run()?;

    for stats in &report.classes {
        println!(
            "class '{}': pages={} records={} emitted={} dropped={}{}",
            stats.class_name,
            stats.pages,
            stats.records,
            stats.emitted,
            stats.dropped,
            stats
                .last_error
                .as_ref()
                .map(|err| format!(" error={err}"))
                .unwrap_or_default()
        );
    }
    if let Some(skew) = emission_skew(&report) {
        println!(
            "total emitted={} across {} classes (max share {:.0}%)",
            skew.total,
            skew.classes,
            skew.max_share * 100.0
        );
    }
    for descriptor in sink.descriptors().iter().take(5) {
        println!(
            "  e.g. {}/{}.{} -> {}",
            descriptor.class_name,
            descriptor.object_id,
            descriptor.field_name,
            descriptor.file_name().unwrap_or("<absent>")
        );
    }
    Ok(())
}

/// Seed three demo classes: one mixing direct and array file fields, one
/// with a single direct field, and one with no file fields at all.
fn seed_demo_store(records_per_class: usize) -> InMemoryStore {
    let schemas = vec![
        ClassSchema {
            class_name: "Post".into(),
            fields: [
                ("cover".to_string(), FieldType::File),
                ("gallery".to_string(), FieldType::Array),
                ("title".to_string(), FieldType::Scalar),
            ]
            .into_iter()
            .collect(),
        },
        ClassSchema {
            class_name: "Profile".into(),
            fields: [
                ("avatar".to_string(), FieldType::File),
                ("bio".to_string(), FieldType::Scalar),
            ]
            .into_iter()
            .collect(),
        },
        ClassSchema {
            class_name: "Note".into(),
            fields: [("body".to_string(), FieldType::Scalar)].into_iter().collect(),
        },
    ];
    let store = InMemoryStore::new(schemas);
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

    store.seed(
        "Post",
        (0..records_per_class)
            .map(|idx| {
                let created_at = base + Duration::seconds(idx as i64);
                let record = Record::new(format!("post_{idx:04}"), created_at).with_field(
                    "title",
                    FieldValue::Scalar(Value::String(format!("post {idx}"))),
                );
                if idx % 3 == 0 {
                    // Array-borne files; one legacy-named member per record.
                    record.with_field(
                        "gallery",
                        FieldValue::Array(vec![
                            ArrayElement::File(FileRef::new(
                                format!("tfss-gallery-{idx}.jpg"),
                                format!("https://files.example.com/tfss-gallery-{idx}.jpg"),
                            )),
                            ArrayElement::Other(Value::String("caption".into())),
                        ]),
                    )
                } else {
                    record.with_field(
                        "cover",
                        FieldValue::File(FileRef::new(
                            format!("cover-{idx}.jpg"),
                            format!("https://files.example.com/cover-{idx}.jpg"),
                        )),
                    )
                }
            })
            .collect(),
    );
    store.seed(
        "Profile",
        (0..records_per_class)
            .map(|idx| {
                let created_at = base + Duration::seconds(idx as i64);
                Record::new(format!("profile_{idx:04}"), created_at).with_field(
                    "avatar",
                    FieldValue::File(FileRef::new(
                        format!("a1b2c3d4-e5f6-7890-abcd-ef1234567890-avatar-{idx}.png"),
                        format!("https://files.example.com/avatar-{idx}.png"),
                    )),
                )
            })
            .collect(),
    );

    store
}
