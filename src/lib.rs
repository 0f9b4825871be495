pub mod dedup;
pub mod filter;
pub mod models;
pub mod utils;

pub use dedup::fingerprint::FingerprintGenerator;
pub use dedup::store::DedupStore;
pub use filter::engine::FilterEngine;
pub use filter::scope::{HostListScope, ScopeOracle};
pub use models::config::EngineConfig;
pub use models::criteria::{FilterCriteria, FilterPredicate, PatternMatch};
pub use models::stats::DedupStats;
pub use models::transaction::{
    TransactionEntry, TransactionRequest, TransactionResponse, TransactionSummary,
};
