//! Configurable limits for bounded bundle decoding.

/// Bundle-level limits.
///
/// These limits are enforced while splitting a bundle into record slices,
/// before any record is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum bundle size in bytes.
    pub max_bundle_bytes: usize,

    /// Maximum number of records of any single kind (groups, layers, images, data).
    pub max_records: usize,

    /// Maximum length of a single group/layer/image record body in bytes.
    pub max_record_len: usize,

    /// Maximum length of a single data blob in bytes.
    pub max_data_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // A 1000x1000 speedup layer is 6 MB on its own.
            max_bundle_bytes: 256 * 1024 * 1024,
            max_records: 4096,
            max_record_len: 1024,
            max_data_len: 64 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_bundle_bytes: 64 * 1024,
            max_records: 64,
            max_record_len: 256,
            max_data_len: 16 * 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_bundle_bytes: usize::MAX,
            max_records: usize::MAX,
            max_record_len: usize::MAX,
            max_data_len: usize::MAX,
        }
    }
}
