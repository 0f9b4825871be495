use log::{debug, trace, warn};
use regex::RegexBuilder;
use std::sync::Arc;

use crate::filter::scope::ScopeOracle;
use crate::models::criteria::{FilterCriteria, FilterPredicate, PatternMatch};
use crate::models::transaction::TransactionEntry;

/// Compiled-program size cap for caller-supplied regex patterns
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Evaluates filter criteria against transaction entries
pub struct FilterEngine {
    /// Oracle consulted by scope clauses, if the host application provides one
    scope_oracle: Option<Arc<dyn ScopeOracle + Send + Sync>>,
}

impl FilterEngine {
    /// Create an engine without a scope oracle
    pub fn new() -> Self {
        Self { scope_oracle: None }
    }

    /// Set the oracle consulted by scope clauses
    pub fn set_scope_oracle(&mut self, oracle: Arc<dyn ScopeOracle + Send + Sync>) {
        self.scope_oracle = Some(oracle);
    }

    /// Check whether an entry satisfies every clause of the criteria
    ///
    /// Criteria with no clauses match everything.
    pub fn matches(&self, entry: &TransactionEntry, criteria: &FilterCriteria) -> bool {
        criteria
            .predicates
            .iter()
            .all(|predicate| self.matches_predicate(entry, predicate))
    }

    /// Evaluate a single clause
    fn matches_predicate(&self, entry: &TransactionEntry, predicate: &FilterPredicate) -> bool {
        match predicate {
            FilterPredicate::Methods(methods) => Self::matches_method(methods, entry),
            FilterPredicate::Status(specs) => Self::matches_status(specs, entry),
            FilterPredicate::Host { pattern, invert } => {
                Self::matches_host(pattern, *invert, entry)
            }
            FilterPredicate::Path { pattern } => Self::matches_pattern(pattern, &entry.path),
            FilterPredicate::MimeTypes(types) => Self::matches_mime(types, entry),
            FilterPredicate::Extensions { include, exclude } => {
                Self::matches_extensions(include, exclude, entry)
            }
            FilterPredicate::InScope => self.matches_scope(entry),
            FilterPredicate::HasResponse => entry.has_response(),
        }
    }

    /// Method allow-list clause; the legacy value "All" matches any method
    fn matches_method(methods: &[String], entry: &TransactionEntry) -> bool {
        if methods.is_empty() {
            return true;
        }

        methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case("all") || m.eq_ignore_ascii_case(&entry.method))
    }

    /// Status clause: pending entries fail, otherwise any spec may match
    fn matches_status(specs: &[String], entry: &TransactionEntry) -> bool {
        if specs.is_empty() {
            return true;
        }

        let status = match entry.response_status {
            Some(status) => status,
            None => return false,
        };

        specs.iter().any(|spec| Self::status_spec_matches(spec, status))
    }

    /// Match one status spec: an exact code or a one-digit prefix range like "2xx"
    ///
    /// Malformed specs never match.
    fn status_spec_matches(spec: &str, status: u16) -> bool {
        let spec = spec.trim();

        if let Ok(code) = spec.parse::<u16>() {
            return status == code;
        }

        let lower = spec.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        if bytes.len() == 3 && bytes[0].is_ascii_digit() && &lower[1..] == "xx" {
            let base = u16::from(bytes[0] - b'0') * 100;
            return status >= base && status < base + 100;
        }

        false
    }

    /// Host clause with optional inversion
    fn matches_host(pattern: &PatternMatch, invert: bool, entry: &TransactionEntry) -> bool {
        if pattern.pattern.is_empty() {
            return true;
        }

        let matched = Self::matches_pattern(pattern, &entry.host);
        if invert {
            !matched
        } else {
            matched
        }
    }

    /// Text clause: substring by default, regex search on request
    ///
    /// Malformed or over-limit regex patterns fall back to substring matching.
    fn matches_pattern(pattern: &PatternMatch, haystack: &str) -> bool {
        if pattern.pattern.is_empty() {
            return true;
        }

        if pattern.regex {
            match RegexBuilder::new(&pattern.pattern)
                .case_insensitive(!pattern.case_sensitive)
                .size_limit(REGEX_SIZE_LIMIT)
                .build()
            {
                Ok(re) => return re.is_match(haystack),
                Err(e) => {
                    debug!(
                        "Invalid filter regex '{}', falling back to substring: {}",
                        pattern.pattern, e
                    );
                }
            }
        }

        if pattern.case_sensitive {
            haystack.contains(&pattern.pattern)
        } else {
            haystack.to_lowercase().contains(&pattern.pattern.to_lowercase())
        }
    }

    /// MIME clause against the response Content-Type primary token
    fn matches_mime(types: &[String], entry: &TransactionEntry) -> bool {
        if types.is_empty() {
            return true;
        }

        match entry.response_content_type() {
            Some(content_type) => types.iter().any(|t| t.eq_ignore_ascii_case(&content_type)),
            None => false,
        }
    }

    /// Extension clause: exclude always wins, include requires membership
    fn matches_extensions(include: &[String], exclude: &[String], entry: &TransactionEntry) -> bool {
        let extension = Self::path_extension(&entry.path);

        if let Some(ext) = &extension {
            if exclude.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                return false;
            }
        }

        if include.is_empty() {
            return true;
        }

        match extension {
            Some(ext) => include.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }

    /// File extension from a path, after stripping query string and fragment
    fn path_extension(path: &str) -> Option<String> {
        let path = path.split('?').next().unwrap_or(path);
        let path = path.split('#').next().unwrap_or(path);
        path.rfind('.')
            .map(|idx| path[idx + 1..].to_ascii_lowercase())
    }

    /// Scope clause: fails open when no oracle is configured or it errors
    fn matches_scope(&self, entry: &TransactionEntry) -> bool {
        match &self.scope_oracle {
            Some(oracle) => match oracle.is_in_scope(&entry.url()) {
                Ok(in_scope) => in_scope,
                Err(e) => {
                    warn!(
                        "Scope oracle failed for {}: {}, treating as in scope",
                        entry.url(),
                        e
                    );
                    true
                }
            },
            None => {
                trace!("No scope oracle configured, scope clause passes");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::scope::HostListScope;
    use crate::models::transaction::{TransactionRequest, TransactionResponse};
    use anyhow::anyhow;

    fn entry(method: &str, host: &str, path: &str) -> TransactionEntry {
        let request = TransactionRequest::new(method, host, 443, true, path);
        TransactionEntry::new(request, format!("{} | {} | EMPTY", method, path))
    }

    fn entry_with_status(status: u16) -> TransactionEntry {
        let mut entry = entry("GET", "example.com", "/a");
        entry.attach_response(TransactionResponse::new(status));
        entry
    }

    struct FailingOracle;

    impl ScopeOracle for FailingOracle {
        fn is_in_scope(&self, _url: &str) -> anyhow::Result<bool> {
            Err(anyhow!("oracle offline"))
        }
    }

    struct DenyAllOracle;

    impl ScopeOracle for DenyAllOracle {
        fn is_in_scope(&self, _url: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn empty_criteria_matches_everything() {
        let engine = FilterEngine::new();
        assert!(engine.matches(&entry("GET", "example.com", "/a"), &FilterCriteria::new()));
    }

    #[test]
    fn method_clause_is_case_insensitive() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_methods(vec!["get".to_string()]);
        assert!(engine.matches(&entry("GET", "example.com", "/a"), &criteria));
        assert!(!engine.matches(&entry("POST", "example.com", "/a"), &criteria));
    }

    #[test]
    fn legacy_all_matches_any_method() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_methods(vec!["All".to_string()]);
        assert!(engine.matches(&entry("DELETE", "example.com", "/a"), &criteria));
    }

    #[test]
    fn status_range_and_exact_specs() {
        let engine = FilterEngine::new();

        let range = FilterCriteria::new().with_statuses(vec!["2xx".to_string()]);
        assert!(engine.matches(&entry_with_status(204), &range));
        assert!(!engine.matches(&entry_with_status(301), &range));

        let exact = FilterCriteria::new().with_statuses(vec!["404".to_string()]);
        assert!(engine.matches(&entry_with_status(404), &exact));
        assert!(!engine.matches(&entry_with_status(200), &exact));
    }

    #[test]
    fn status_range_is_case_insensitive() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_statuses(vec!["4XX".to_string()]);
        assert!(engine.matches(&entry_with_status(403), &criteria));
    }

    #[test]
    fn pending_entries_fail_status_clauses() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_statuses(vec!["2xx".to_string()]);
        assert!(!engine.matches(&entry("GET", "example.com", "/a"), &criteria));
    }

    #[test]
    fn malformed_status_spec_never_matches() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_statuses(vec!["abc".to_string()]);
        assert!(!engine.matches(&entry_with_status(200), &criteria));
    }

    #[test]
    fn host_substring_is_case_insensitive_by_default() {
        let engine = FilterEngine::new();
        let criteria =
            FilterCriteria::new().with_host_pattern(PatternMatch::new("example.com"), false);
        assert!(engine.matches(&entry("GET", "api.EXAMPLE.com", "/a"), &criteria));
        assert!(!engine.matches(&entry("GET", "other.org", "/a"), &criteria));
    }

    #[test]
    fn case_sensitive_pattern_respects_case() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_host_pattern(
            PatternMatch::new("Example.com").with_case_sensitive(true),
            false,
        );
        assert!(engine.matches(&entry("GET", "api.Example.com", "/a"), &criteria));
        assert!(!engine.matches(&entry("GET", "api.example.com", "/a"), &criteria));
    }

    #[test]
    fn regex_pattern_uses_search_semantics() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_host_pattern(
            PatternMatch::new(r"example\.(com|org)").with_regex(true),
            false,
        );
        // Search, not full match: the surrounding subdomain does not matter
        assert!(engine.matches(&entry("GET", "api.example.com", "/a"), &criteria));
        assert!(!engine.matches(&entry("GET", "api.sample.net", "/a"), &criteria));
    }

    #[test]
    fn malformed_regex_falls_back_to_substring() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new()
            .with_host_pattern(PatternMatch::new("[").with_regex(true), false);
        assert!(engine.matches(&entry("GET", "host[1].example.com", "/a"), &criteria));
        assert!(!engine.matches(&entry("GET", "example.com", "/a"), &criteria));
    }

    #[test]
    fn inverted_host_excludes_matches() {
        let engine = FilterEngine::new();
        let criteria =
            FilterCriteria::new().with_host_pattern(PatternMatch::new("example.com"), true);
        assert!(!engine.matches(&entry("GET", "api.Example.COM", "/a"), &criteria));
        assert!(engine.matches(&entry("GET", "other.org", "/a"), &criteria));
    }

    #[test]
    fn path_pattern_matches_substring() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_path_pattern(PatternMatch::new("/api/"));
        assert!(engine.matches(&entry("GET", "example.com", "/api/users"), &criteria));
        assert!(!engine.matches(&entry("GET", "example.com", "/static/app.js"), &criteria));
    }

    #[test]
    fn extension_exclude_wins_over_include() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new()
            .with_extensions(vec!["png".to_string()], vec!["png".to_string()]);
        assert!(!engine.matches(&entry("GET", "example.com", "/logo.png"), &criteria));
    }

    #[test]
    fn extension_include_requires_membership() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_extensions(vec!["png".to_string()], Vec::new());
        assert!(engine.matches(&entry("GET", "example.com", "/logo.PNG"), &criteria));
        assert!(!engine.matches(&entry("GET", "example.com", "/page.html"), &criteria));
        assert!(!engine.matches(&entry("GET", "example.com", "/no-extension"), &criteria));
    }

    #[test]
    fn extension_strips_query_and_fragment() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_extensions(vec!["png".to_string()], Vec::new());
        assert!(engine.matches(&entry("GET", "example.com", "/logo.png?v=2#top"), &criteria));
    }

    #[test]
    fn excluded_extension_does_not_reject_other_paths() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_extensions(Vec::new(), vec!["gif".to_string()]);
        assert!(!engine.matches(&entry("GET", "example.com", "/pixel.gif"), &criteria));
        assert!(engine.matches(&entry("GET", "example.com", "/api/users"), &criteria));
    }

    #[test]
    fn mime_clause_uses_primary_token() {
        let engine = FilterEngine::new();
        let mut matched = entry("GET", "example.com", "/data");
        matched.attach_response(
            TransactionResponse::new(200)
                .with_headers("Content-Type: Application/JSON; charset=utf-8\r\n"),
        );
        let criteria =
            FilterCriteria::new().with_mime_types(vec!["application/json".to_string()]);
        assert!(engine.matches(&matched, &criteria));
    }

    #[test]
    fn mime_clause_fails_without_response() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().with_mime_types(vec!["text/html".to_string()]);
        assert!(!engine.matches(&entry("GET", "example.com", "/a"), &criteria));
    }

    #[test]
    fn scope_clause_fails_open() {
        let criteria = FilterCriteria::new().in_scope_only();

        let engine = FilterEngine::new();
        assert!(engine.matches(&entry("GET", "example.com", "/a"), &criteria));

        let mut failing = FilterEngine::new();
        failing.set_scope_oracle(Arc::new(FailingOracle));
        assert!(failing.matches(&entry("GET", "example.com", "/a"), &criteria));
    }

    #[test]
    fn scope_clause_respects_oracle_verdict() {
        let criteria = FilterCriteria::new().in_scope_only();

        let mut denying = FilterEngine::new();
        denying.set_scope_oracle(Arc::new(DenyAllOracle));
        assert!(!denying.matches(&entry("GET", "example.com", "/a"), &criteria));

        let mut allowing = FilterEngine::new();
        allowing.set_scope_oracle(Arc::new(HostListScope::new(vec!["example.com".to_string()])));
        assert!(allowing.matches(&entry("GET", "example.com", "/a"), &criteria));
        assert!(!allowing.matches(&entry("GET", "other.org", "/a"), &criteria));
    }

    #[test]
    fn require_response_clause() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new().require_response();
        assert!(!engine.matches(&entry("GET", "example.com", "/a"), &criteria));
        assert!(engine.matches(&entry_with_status(200), &criteria));
    }

    #[test]
    fn clauses_are_anded() {
        let engine = FilterEngine::new();
        let criteria = FilterCriteria::new()
            .with_methods(vec!["GET".to_string()])
            .with_statuses(vec!["5xx".to_string()]);
        // Method matches but status does not
        assert!(!engine.matches(&entry_with_status(200), &criteria));
    }
}
