use anyhow::Result;
use log::debug;

/// Host-application oracle deciding whether a URL is in scope
///
/// Implementations may fail; the filter engine treats an error as in scope so
/// a broken oracle never hides data.
pub trait ScopeOracle {
    /// Whether the given URL is in scope for the embedding application
    fn is_in_scope(&self, url: &str) -> Result<bool>;
}

/// Scope oracle backed by a fixed list of host substrings
pub struct HostListScope {
    /// Lowercased host substrings considered in scope
    hosts: Vec<String>,
}

impl HostListScope {
    /// Create a scope from the given host substrings
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            hosts: hosts.into_iter().map(|h| h.to_lowercase()).collect(),
        }
    }
}

impl ScopeOracle for HostListScope {
    fn is_in_scope(&self, url: &str) -> Result<bool> {
        let url = url.to_lowercase();
        let in_scope = self.hosts.iter().any(|host| url.contains(host));
        debug!("Scope check for {}: {}", url, in_scope);
        Ok(in_scope)
    }
}
