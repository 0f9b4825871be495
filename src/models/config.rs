use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of entries kept in the display queue
    pub max_stored_entries: usize,

    /// Digest algorithm identifier for content hashing
    pub hash_algorithm: String,

    /// Initial state of the duplicate-filtering toggle
    pub filtering_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_stored_entries: 1000,
            hash_algorithm: "sha-256".to_string(),
            filtering_enabled: true,
        }
    }
}
