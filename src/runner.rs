//! Run orchestration: schema fetch, classification, per-class sweeps.

use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::SweepConfig;
use crate::constants::pagination::REPORT_INTERVAL_MS;
use crate::errors::SweepError;
use crate::extract::{extract_page, ClassPager};
use crate::schema::{classify, FileTarget};
use crate::store::{ObjectStore, PageCursor, SchemaSource};
use crate::transfer::TransferSink;
use crate::types::ClassName;

/// Outcome of sweeping one class.
#[derive(Clone, Debug)]
pub struct ClassSweepStats {
    /// Class this outcome belongs to.
    pub class_name: ClassName,
    /// Non-empty pages fully processed (fetched and forwarded).
    pub pages: usize,
    /// Records scanned across processed pages.
    pub records: usize,
    /// Descriptors forwarded to the sink.
    pub emitted: usize,
    /// Descriptors dropped by the inclusion policy, absent markers included.
    pub dropped: usize,
    /// Cursor after the last successfully forwarded page; the resume point.
    pub last_cursor: Option<PageCursor>,
    /// Failure that halted this class, if any.
    pub last_error: Option<String>,
    /// Wall-clock duration of the sweep in milliseconds.
    pub duration_ms: u128,
}

impl ClassSweepStats {
    fn new(class_name: ClassName) -> Self {
        Self {
            class_name,
            pages: 0,
            records: 0,
            emitted: 0,
            dropped: 0,
            last_cursor: None,
            last_error: None,
            duration_ms: 0,
        }
    }
}

/// Per-class outcomes for one full sweep, in classification order.
#[derive(Clone, Debug)]
pub struct SweepReport {
    /// One entry per classified class.
    pub classes: Vec<ClassSweepStats>,
}

impl SweepReport {
    /// `true` when every class completed without error.
    pub fn is_complete(&self) -> bool {
        self.classes.iter().all(|stats| stats.last_error.is_none())
    }

    /// Classes halted by an error.
    pub fn failed(&self) -> impl Iterator<Item = &ClassSweepStats> {
        self.classes
            .iter()
            .filter(|stats| stats.last_error.is_some())
    }

    /// Total descriptors forwarded across all classes.
    pub fn total_emitted(&self) -> usize {
        self.classes.iter().map(|stats| stats.emitted).sum()
    }

    /// Total records scanned across all classes.
    pub fn total_records(&self) -> usize {
        self.classes.iter().map(|stats| stats.records).sum()
    }
}

/// Drives one full sweep: schemas, classification, parallel class sweeps.
///
/// Within a class, pagination is strictly sequential: fetch page, classify,
/// filter, forward, commit the cursor, repeat. Classes are independent and
/// sweep on scoped threads; the store and sink are the only shared state and
/// both are required to tolerate concurrent use.
pub struct Runner<'a> {
    schemas: &'a dyn SchemaSource,
    store: &'a dyn ObjectStore,
    sink: &'a dyn TransferSink,
    config: SweepConfig,
}

impl<'a> Runner<'a> {
    /// Build a runner over the given capabilities, validating `config`.
    pub fn new(
        schemas: &'a dyn SchemaSource,
        store: &'a dyn ObjectStore,
        sink: &'a dyn TransferSink,
        config: SweepConfig,
    ) -> Result<Self, SweepError> {
        config.validate()?;
        Ok(Self {
            schemas,
            store,
            sink,
            config,
        })
    }

    /// Run the sweep to completion.
    ///
    /// Schema fetch failure is fatal to the run. Query and transfer failures
    /// halt only their class; the report carries the error text and the last
    /// committed cursor so the caller can choose between aborting, skipping,
    /// and resuming.
    pub fn run(&self) -> Result<SweepReport, SweepError> {
        let schemas = self.schemas.class_schemas()?;
        let targets = classify(&schemas, self.config.detection);
        debug!(classes = targets.len(), "classified file-bearing classes");

        let mut outcomes: Vec<Option<ClassSweepStats>> = Vec::with_capacity(targets.len());
        outcomes.resize_with(targets.len(), || None);
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(targets.len());
            for (idx, target) in targets.iter().enumerate() {
                handles.push((idx, scope.spawn(move || self.sweep_class(target))));
            }
            for (idx, handle) in handles {
                let stats = match handle.join() {
                    Ok(stats) => stats,
                    Err(_) => {
                        let mut stats = ClassSweepStats::new(targets[idx].class_name.clone());
                        stats.last_error = Some("sweep thread panicked".into());
                        stats
                    }
                };
                outcomes[idx] = Some(stats);
            }
        });

        Ok(SweepReport {
            classes: outcomes.into_iter().flatten().collect(),
        })
    }

    fn sweep_class(&self, target: &FileTarget) -> ClassSweepStats {
        let started = Instant::now();
        let report_every = Duration::from_millis(REPORT_INTERVAL_MS);
        let mut last_report = started;
        let mut stats = ClassSweepStats::new(target.class_name.clone());
        let mut pager = ClassPager::new(self.store, target, self.config.page_size);

        loop {
            let page = match pager.next_page() {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(err) => {
                    eprintln!(
                        "[filesweep] class '{}' page fetch failed: {err}",
                        target.class_name
                    );
                    stats.last_error = Some(err.to_string());
                    break;
                }
            };
            let batch = extract_page(&page, target, self.config.policy);
            // Forward before the next fetch; one outstanding batch per class.
            if let Err(err) = self.sink.transfer(&batch.descriptors) {
                eprintln!(
                    "[filesweep] class '{}' transfer failed: {err}",
                    target.class_name
                );
                stats.last_error = Some(err.to_string());
                break;
            }
            stats.pages += 1;
            stats.records += page.len();
            stats.emitted += batch.descriptors.len();
            stats.dropped += batch.dropped;
            stats.last_cursor = pager.cursor().cloned();
            if last_report.elapsed() >= report_every {
                eprintln!(
                    "[filesweep] class '{}' pages={} records={} emitted={} elapsed={:.1}s",
                    target.class_name,
                    stats.pages,
                    stats.records,
                    stats.emitted,
                    started.elapsed().as_secs_f64()
                );
                last_report = Instant::now();
            }
        }

        stats.duration_ms = started.elapsed().as_millis();
        debug!(
            class_name = %target.class_name,
            pages = stats.pages,
            records = stats.records,
            emitted = stats.emitted,
            dropped = stats.dropped,
            "class sweep finished"
        );
        stats
    }
}
