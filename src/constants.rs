/// Constants used by the pagination driver.
pub mod pagination {
    /// Fixed number of records requested per page.
    pub const PAGE_SIZE: usize = 1000;
    /// Projection key for the record creation timestamp.
    pub const CREATED_AT_KEY: &str = "createdAt";
    /// Interval between stderr progress reports during long sweeps.
    pub const REPORT_INTERVAL_MS: u64 = 750;
}

/// Constants used by the file-name inclusion filter.
pub mod filters {
    /// Prefix carried by current-format file names.
    pub const CURRENT_FORMAT_PREFIX: &str = "tfss-";
    /// Pattern matched by legacy-format file names: 8-4-4-4-12 hex groups
    /// followed by a hyphen, prefixed to the original name.
    pub const LEGACY_NAME_PATTERN: &str =
        "^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}-";
}
