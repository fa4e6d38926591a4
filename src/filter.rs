//! Descriptor inclusion policies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::filters::{CURRENT_FORMAT_PREFIX, LEGACY_NAME_PATTERN};
use crate::data::FileDescriptor;

static LEGACY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(LEGACY_NAME_PATTERN).expect("legacy name pattern is valid"));

/// `true` when `name` belongs to a file this system manages: either
/// current-format (`tfss-` prefix) or legacy-format (UUID-hyphen prefix).
pub fn is_managed_name(name: &str) -> bool {
    name.starts_with(CURRENT_FORMAT_PREFIX) || LEGACY_NAME.is_match(name)
}

/// Policy applied to extracted descriptors before they reach the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionPolicy {
    /// Drop absent-value descriptors only.
    Baseline,
    /// Additionally require a managed file name. Array-derived groups
    /// survive when any member passes.
    LegacyNames,
}

impl InclusionPolicy {
    /// `true` when a single descriptor survives this policy.
    pub fn admits(self, descriptor: &FileDescriptor) -> bool {
        match descriptor.file_name() {
            None => false,
            Some(name) => match self {
                InclusionPolicy::Baseline => true,
                InclusionPolicy::LegacyNames => is_managed_name(name),
            },
        }
    }

    /// `true` when at least one descriptor in a record group survives.
    pub fn admits_any(self, descriptors: &[FileDescriptor]) -> bool {
        descriptors.iter().any(|descriptor| self.admits(descriptor))
    }
}
