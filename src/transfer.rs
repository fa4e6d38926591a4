//! Transfer sink capability and the in-memory collecting sink.

use std::sync::Mutex;

use crate::data::FileDescriptor;
use crate::errors::SweepError;

/// Consumer of filtered descriptor batches.
///
/// `transfer` must complete before the next page for the same class is
/// fetched; that is the back-pressure contract. Implementations are assumed
/// idempotent or externally deduplicated, since a crash between a forwarded
/// batch and a persisted cursor re-sends the batch on restart.
pub trait TransferSink: Send + Sync {
    /// Relocate one batch. Never receives absent-value descriptors.
    fn transfer(&self, batch: &[FileDescriptor]) -> Result<(), SweepError>;
}

/// Sink that records every batch, for tests and demos.
#[derive(Default)]
pub struct CollectingSink {
    batches: Mutex<Vec<Vec<FileDescriptor>>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattened descriptors across every batch, in arrival order.
    pub fn descriptors(&self) -> Vec<FileDescriptor> {
        self.batches
            .lock()
            .expect("sink lock poisoned")
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// Sizes of the batches received, in arrival order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches
            .lock()
            .expect("sink lock poisoned")
            .iter()
            .map(Vec::len)
            .collect()
    }

    /// Number of batches received.
    pub fn batch_count(&self) -> usize {
        self.batches.lock().expect("sink lock poisoned").len()
    }
}

impl TransferSink for CollectingSink {
    fn transfer(&self, batch: &[FileDescriptor]) -> Result<(), SweepError> {
        self.batches
            .lock()
            .expect("sink lock poisoned")
            .push(batch.to_vec());
        Ok(())
    }
}
