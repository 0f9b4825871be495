use dashmap::DashSet;
use log::{debug, info, trace};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::dedup::fingerprint::FingerprintGenerator;
use crate::filter::engine::FilterEngine;
use crate::filter::scope::ScopeOracle;
use crate::models::config::EngineConfig;
use crate::models::criteria::FilterCriteria;
use crate::models::stats::DedupStats;
use crate::models::transaction::{
    TransactionEntry, TransactionRequest, TransactionResponse, TransactionSummary,
};

/// Manages transaction deduplication and bounded display storage
pub struct DedupStore {
    /// Engine configuration
    config: EngineConfig,
    /// Fingerprint generator shared by submit and attach paths
    generator: FingerprintGenerator,
    /// Filter engine used by the filter() read path
    engine: FilterEngine,
    /// Every fingerprint ever accepted, kept for the lifetime of the store
    seen: DashSet<String>,
    /// Display queue - bounded FIFO of unique entries
    entries: RwLock<VecDeque<TransactionEntry>>,
    /// Whether duplicate filtering is active
    filtering_enabled: AtomicBool,
    /// Count of all submissions
    total: AtomicU64,
    /// Count of submissions accepted as unique
    unique: AtomicU64,
    /// Count of submissions rejected as duplicates
    duplicate: AtomicU64,
}

impl DedupStore {
    /// Create a store from the given configuration
    pub fn new(config: EngineConfig) -> Self {
        let generator = FingerprintGenerator::new(&config.hash_algorithm);
        let filtering_enabled = AtomicBool::new(config.filtering_enabled);

        Self {
            config,
            generator,
            engine: FilterEngine::new(),
            seen: DashSet::new(),
            entries: RwLock::new(VecDeque::new()),
            filtering_enabled,
            total: AtomicU64::new(0),
            unique: AtomicU64::new(0),
            duplicate: AtomicU64::new(0),
        }
    }

    /// Attach a scope oracle consulted by scope filter clauses
    pub fn with_scope_oracle(mut self, oracle: Arc<dyn ScopeOracle + Send + Sync>) -> Self {
        self.engine.set_scope_oracle(oracle);
        self
    }

    /// Submit a request for deduplication
    ///
    /// Returns true when the transaction is new (or filtering is disabled)
    /// and false when it is a duplicate of one seen before.
    pub fn submit(&self, request: TransactionRequest) -> bool {
        self.total.fetch_add(1, Ordering::SeqCst);

        if !self.filtering_enabled.load(Ordering::SeqCst) {
            // Bypass: nothing is remembered while filtering is off
            trace!(
                "Filtering disabled, passing {} {} through",
                request.method,
                request.path
            );
            return true;
        }

        let fingerprint = self.generator.fingerprint(&request);

        if self.seen.insert(fingerprint.clone()) {
            self.unique.fetch_add(1, Ordering::SeqCst);
            let entry = TransactionEntry::new(request, fingerprint);

            let mut entries = self.entries.write();
            entries.push_back(entry);
            while entries.len() > self.config.max_stored_entries {
                if let Some(evicted) = entries.pop_front() {
                    debug!(
                        "Evicted oldest entry {} to maintain display capacity",
                        evicted.fingerprint
                    );
                }
            }

            true
        } else {
            self.duplicate.fetch_add(1, Ordering::SeqCst);
            debug!("Duplicate transaction rejected: {}", fingerprint);
            false
        }
    }

    /// Attach a response to the stored entry matching the request
    ///
    /// Best-effort: a no-op when the entry was never stored or has been
    /// evicted, and when a response is already attached.
    pub fn attach_response(&self, request: &TransactionRequest, response: TransactionResponse) {
        let fingerprint = self.generator.fingerprint(request);

        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.fingerprint == fingerprint) {
            Some(entry) => {
                if entry.attach_response(response) {
                    trace!("Attached response to {}", fingerprint);
                } else {
                    debug!("Entry {} already has a response, ignoring attach", fingerprint);
                }
            }
            None => debug!("No stored entry for {}, response dropped", fingerprint),
        }
    }

    /// Snapshot of the stored entries, oldest first
    pub fn snapshot(&self) -> Vec<TransactionEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Stored entries matching the given criteria, oldest first
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<TransactionEntry> {
        self.snapshot()
            .into_iter()
            .filter(|entry| self.engine.matches(entry, criteria))
            .collect()
    }

    /// Page of display summaries, oldest first
    pub fn summaries(&self, offset: usize, limit: usize) -> Vec<TransactionSummary> {
        self.entries
            .read()
            .iter()
            .skip(offset)
            .take(limit)
            .map(|entry| entry.summary())
            .collect()
    }

    /// Enable or disable duplicate filtering
    pub fn set_filtering_enabled(&self, enabled: bool) {
        self.filtering_enabled.store(enabled, Ordering::SeqCst);
        info!(
            "Duplicate filtering {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Whether duplicate filtering is active
    pub fn is_filtering_enabled(&self) -> bool {
        self.filtering_enabled.load(Ordering::SeqCst)
    }

    /// Forget all fingerprints, stored entries and counters
    ///
    /// Best-effort: a submit racing with clear may observe one structure
    /// emptied before the other.
    pub fn clear(&self) {
        self.seen.clear();
        self.entries.write().clear();
        self.total.store(0, Ordering::SeqCst);
        self.unique.store(0, Ordering::SeqCst);
        self.duplicate.store(0, Ordering::SeqCst);
        info!("Deduplication store cleared");
    }

    /// Count of all submissions
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Count of submissions accepted as unique
    pub fn unique_count(&self) -> u64 {
        self.unique.load(Ordering::SeqCst)
    }

    /// Count of submissions rejected as duplicates
    pub fn duplicate_count(&self) -> u64 {
        self.duplicate.load(Ordering::SeqCst)
    }

    /// Number of entries currently held for display
    pub fn stored_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Current statistics
    pub fn stats(&self) -> DedupStats {
        DedupStats {
            total: self.total_count(),
            unique: self.unique_count(),
            duplicate: self.duplicate_count(),
            stored: self.stored_count(),
        }
    }
}
