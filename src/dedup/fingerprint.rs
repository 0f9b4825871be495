use log::warn;
use sha2::{Digest, Sha256, Sha512};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::transaction::TransactionRequest;
use crate::utils::error::{AppError, AppResult};

/// Sentinel hash for requests that carry no hashable content
const EMPTY_CONTENT: &str = "EMPTY";

/// Computes canonical fingerprints for transaction requests
pub struct FingerprintGenerator {
    /// Digest algorithm identifier (e.g., "sha-256")
    algorithm: String,

    /// Sequence for fallback fingerprints when hashing fails
    fallback_seq: AtomicU64,
}

impl FingerprintGenerator {
    /// Create a generator using the given digest algorithm
    pub fn new(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            fallback_seq: AtomicU64::new(1),
        }
    }

    /// Compute the fingerprint for a request
    ///
    /// Never fails: when the configured digest is unavailable the request
    /// degrades to a per-call fallback fingerprint, so ingestion is never
    /// blocked and that one transaction is always treated as unique.
    pub fn fingerprint(&self, request: &TransactionRequest) -> String {
        let normalized = Self::normalize_path(&request.path);

        let content_hash = if !request.body.is_empty() {
            self.digest(&request.body)
        } else if request.method.eq_ignore_ascii_case("GET") && !request.query.is_empty() {
            self.digest(request.query.as_bytes())
        } else {
            Ok(EMPTY_CONTENT.to_string())
        };

        match content_hash {
            Ok(hash) => format!("{} | {} | {}", request.method, normalized, hash),
            Err(e) => {
                let seq = self.fallback_seq.fetch_add(1, Ordering::SeqCst);
                warn!("Fingerprint hashing failed ({}), using fallback #{}", e, seq);
                format!("{} | {} | fallback-{}", request.method, normalized, seq)
            }
        }
    }

    /// Normalize a request path: lowercase, trailing slashes stripped down to
    /// the root, leading slash guaranteed
    ///
    /// Idempotent: normalizing an already-normalized path is a no-op.
    pub fn normalize_path(path: &str) -> String {
        let mut normalized = path.to_lowercase();

        while normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }

        if !normalized.starts_with('/') {
            normalized.insert(0, '/');
        }

        normalized
    }

    /// Hash content with the configured digest, rendered as lowercase hex
    fn digest(&self, data: &[u8]) -> AppResult<String> {
        match self.algorithm.to_lowercase().as_str() {
            "sha-256" | "sha256" => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                Ok(hex::encode(hasher.finalize()))
            }
            "sha-512" | "sha512" => {
                let mut hasher = Sha512::new();
                hasher.update(data);
                Ok(hex::encode(hasher.finalize()))
            }
            other => Err(AppError::HashingError(format!(
                "unsupported digest algorithm: {}",
                other
            ))),
        }
    }
}

impl Default for FingerprintGenerator {
    fn default() -> Self {
        Self::new("sha-256")
    }
}
