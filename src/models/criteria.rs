use serde::{Deserialize, Serialize};

/// A text pattern with its matching options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    /// The pattern text (substring or regex)
    pub pattern: String,

    /// Match case-sensitively instead of the case-insensitive default
    pub case_sensitive: bool,

    /// Interpret the pattern as a regex searched anywhere in the field
    pub regex: bool,
}

impl PatternMatch {
    /// Create a case-insensitive substring pattern
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            case_sensitive: false,
            regex: false,
        }
    }

    /// Set case-sensitive matching
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set regex matching
    pub fn with_regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }
}

/// One filter clause; only clauses present in the criteria are evaluated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FilterPredicate {
    /// Method allow-list, case-insensitive; the legacy value "All" matches any method
    Methods(Vec<String>),

    /// Status specs: exact codes ("404") or one-digit prefix ranges ("2xx")
    Status(Vec<String>),

    /// Host pattern, optionally inverted
    Host { pattern: PatternMatch, invert: bool },

    /// Path pattern (no inversion)
    Path { pattern: PatternMatch },

    /// MIME allow-list compared against the response Content-Type primary token
    MimeTypes(Vec<String>),

    /// File extension include/exclude sets; exclude always wins
    Extensions {
        include: Vec<String>,
        exclude: Vec<String>,
    },

    /// Keep only entries the scope oracle reports as in scope
    InScope,

    /// Keep only entries with an attached response
    HasResponse,
}

/// Conjunctive filter criteria: every clause present must match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Active clauses, ANDed together; empty matches everything
    pub predicates: Vec<FilterPredicate>,
}

impl FilterCriteria {
    /// Create criteria that match every entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no clause is active
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Restrict to the given methods (no clause is added for an empty list)
    pub fn with_methods(mut self, methods: Vec<String>) -> Self {
        if !methods.is_empty() {
            self.predicates.push(FilterPredicate::Methods(methods));
        }
        self
    }

    /// Restrict to the given status specs (no clause is added for an empty list)
    pub fn with_statuses(mut self, statuses: Vec<String>) -> Self {
        if !statuses.is_empty() {
            self.predicates.push(FilterPredicate::Status(statuses));
        }
        self
    }

    /// Restrict by host pattern, optionally inverted (empty patterns are ignored)
    pub fn with_host_pattern(mut self, pattern: PatternMatch, invert: bool) -> Self {
        if !pattern.pattern.is_empty() {
            self.predicates.push(FilterPredicate::Host { pattern, invert });
        }
        self
    }

    /// Restrict by path pattern (empty patterns are ignored)
    pub fn with_path_pattern(mut self, pattern: PatternMatch) -> Self {
        if !pattern.pattern.is_empty() {
            self.predicates.push(FilterPredicate::Path { pattern });
        }
        self
    }

    /// Restrict to the given MIME types (no clause is added for an empty list)
    pub fn with_mime_types(mut self, types: Vec<String>) -> Self {
        if !types.is_empty() {
            self.predicates.push(FilterPredicate::MimeTypes(types));
        }
        self
    }

    /// Restrict by file extension sets (no clause is added when both are empty)
    pub fn with_extensions(mut self, include: Vec<String>, exclude: Vec<String>) -> Self {
        if !include.is_empty() || !exclude.is_empty() {
            self.predicates
                .push(FilterPredicate::Extensions { include, exclude });
        }
        self
    }

    /// Keep only entries the scope oracle reports as in scope
    pub fn in_scope_only(mut self) -> Self {
        self.predicates.push(FilterPredicate::InScope);
        self
    }

    /// Keep only entries with an attached response
    pub fn require_response(mut self) -> Self {
        self.predicates.push(FilterPredicate::HasResponse);
        self
    }
}
