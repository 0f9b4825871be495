use serde::{Deserialize, Serialize};

/// Statistics for submitted transactions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DedupStats {
    /// Total number of submissions, including bypassed ones
    pub total: u64,

    /// Submissions accepted as unique
    pub unique: u64,

    /// Submissions rejected as duplicates
    pub duplicate: u64,

    /// Entries currently held in the display queue
    pub stored: usize,
}
