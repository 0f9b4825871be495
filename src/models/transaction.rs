use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An HTTP request as handed in by the embedding proxy layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// HTTP method (e.g., GET, POST)
    pub method: String,

    /// Target host name
    pub host: String,

    /// Target port
    pub port: u16,

    /// Whether the transaction used TLS
    pub secure: bool,

    /// Request path
    pub path: String,

    /// Raw query string, empty when absent
    #[serde(default)]
    pub query: String,

    /// Raw request header block
    #[serde(default)]
    pub headers: Vec<u8>,

    /// Raw request body
    #[serde(default)]
    pub body: Vec<u8>,
}

impl TransactionRequest {
    /// Create a request with empty query, headers and body
    pub fn new(method: &str, host: &str, port: u16, secure: bool, path: &str) -> Self {
        Self {
            method: method.to_string(),
            host: host.to_string(),
            port,
            secure,
            path: path.to_string(),
            query: String::new(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Set the query string
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    /// Set the raw header block
    pub fn with_headers<B: Into<Vec<u8>>>(mut self, headers: B) -> Self {
        self.headers = headers.into();
        self
    }

    /// Set the raw body
    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }
}

/// An HTTP response to be associated with a stored entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response header block
    #[serde(default)]
    pub headers: Vec<u8>,

    /// Raw response body
    #[serde(default)]
    pub body: Vec<u8>,
}

impl TransactionResponse {
    /// Create a response with empty headers and body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Set the raw header block
    pub fn with_headers<B: Into<Vec<u8>>>(mut self, headers: B) -> Self {
        self.headers = headers.into();
        self
    }

    /// Set the raw body
    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }
}

/// A stored snapshot of one unique HTTP transaction
///
/// The request portion is immutable for the entry's lifetime; the response
/// portion transitions at most once from absent to present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// HTTP method
    pub method: String,

    /// Target host name
    pub host: String,

    /// Target port
    pub port: u16,

    /// Whether the transaction used TLS
    pub secure: bool,

    /// Request path
    pub path: String,

    /// Raw query string, empty when absent
    pub query: String,

    /// Raw request header block
    #[serde(skip_serializing)]
    pub request_headers: Vec<u8>,

    /// Raw request body
    #[serde(skip_serializing)]
    pub request_body: Vec<u8>,

    /// Response status code, None while the response is pending
    pub response_status: Option<u16>,

    /// Raw response header block
    #[serde(skip_serializing)]
    pub response_headers: Option<Vec<u8>>,

    /// Raw response body
    #[serde(skip_serializing)]
    pub response_body: Option<Vec<u8>>,

    /// Timestamp when the entry was created
    pub timestamp: DateTime<Utc>,

    /// Canonical fingerprint, computed once at construction
    pub fingerprint: String,
}

impl TransactionEntry {
    /// Create an entry from an accepted request and its fingerprint
    pub fn new(request: TransactionRequest, fingerprint: String) -> Self {
        Self {
            method: request.method,
            host: request.host,
            port: request.port,
            secure: request.secure,
            path: request.path,
            query: request.query,
            request_headers: request.headers,
            request_body: request.body,
            response_status: None,
            response_headers: None,
            response_body: None,
            timestamp: Utc::now(),
            fingerprint,
        }
    }

    /// Whether a response has been attached
    pub fn has_response(&self) -> bool {
        self.response_status.is_some()
    }

    /// Attach a response, returning false when one is already present
    pub fn attach_response(&mut self, response: TransactionResponse) -> bool {
        if self.has_response() {
            return false;
        }

        self.response_status = Some(response.status);
        self.response_headers = Some(response.headers);
        self.response_body = Some(response.body);
        true
    }

    /// Reassemble the full URL, eliding the default port for the scheme
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let default_port = if self.secure { 443 } else { 80 };

        let mut url = if self.port == default_port {
            format!("{}://{}{}", scheme, self.host, self.path)
        } else {
            format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
        };

        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query);
        }

        url
    }

    /// Primary MIME token from the response Content-Type header
    ///
    /// Scans the raw header block for the first Content-Type line and keeps
    /// the text before any ';' parameter, trimmed and lowercased.
    pub fn response_content_type(&self) -> Option<String> {
        let headers = self.response_headers.as_ref()?;
        let text = String::from_utf8_lossy(headers);

        for line in text.lines() {
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-type") {
                    let primary = value.split(';').next().unwrap_or(value).trim().to_lowercase();
                    if primary.is_empty() {
                        return None;
                    }
                    return Some(primary);
                }
            }
        }

        None
    }

    /// Produce a compact summary row for list views
    pub fn summary(&self) -> TransactionSummary {
        TransactionSummary {
            method: self.method.clone(),
            url: self.url(),
            status: self.response_status,
            request_bytes: self.request_body.len(),
            timestamp: self.timestamp,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

/// A more concise representation of an entry for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// HTTP method
    pub method: String,

    /// Full request URL
    pub url: String,

    /// Response status code, None while pending
    pub status: Option<u16>,

    /// Request body size in bytes
    pub request_bytes: usize,

    /// Timestamp when the entry was created
    pub timestamp: DateTime<Utc>,

    /// Canonical fingerprint
    pub fingerprint: String,
}
