use anyhow::Result;
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustsieve::utils::error::AppResult;
use rustsieve::utils::logging;
use rustsieve::{
    DedupStore, EngineConfig, FilterCriteria, HostListScope, PatternMatch, TransactionRequest,
    TransactionResponse,
};

#[derive(Parser, Debug)]
#[clap(author, version, about = "An HTTP transaction deduplication and filtering engine")]
struct Args {
    /// Maximum number of entries kept for display
    #[clap(long, default_value = "1000")]
    max_entries: usize,

    /// Content hash algorithm (sha-256 or sha-512)
    #[clap(long, default_value = "sha-256")]
    hash_algorithm: String,

    /// JSON file with recorded requests to replay
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Host substrings considered in scope (repeatable)
    #[clap(long = "scope-host")]
    scope_hosts: Vec<String>,

    /// Start with duplicate filtering disabled
    #[clap(long)]
    disable_filtering: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[clap(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger with specified level
    logging::init_logger(logging::get_log_level(&args.log_level));

    info!("Starting rustsieve v{}", env!("CARGO_PKG_VERSION"));

    // Create engine config
    let config = EngineConfig {
        max_stored_entries: args.max_entries,
        hash_algorithm: args.hash_algorithm.clone(),
        filtering_enabled: !args.disable_filtering,
    };

    // Initialize the deduplication store
    let mut store = DedupStore::new(config);
    if !args.scope_hosts.is_empty() {
        info!("Scope restricted to hosts: {:?}", args.scope_hosts);
        store = store.with_scope_oracle(Arc::new(HostListScope::new(args.scope_hosts.clone())));
    }

    let requests = match &args.input {
        Some(path) => {
            info!("Replaying requests from {}", path.display());
            load_requests(path)?
        }
        None => {
            info!("No input file given, running built-in sample traffic");
            sample_traffic()
        }
    };

    // Feed every request through the deduplication pipeline
    for request in requests {
        if store.submit(request.clone()) {
            info!("UNIQUE    {} {}", request.method, request.path);
        } else {
            info!("DUPLICATE {} {}", request.method, request.path);
        }
    }

    if args.input.is_none() {
        attach_sample_responses(&store);
    }

    println!("\nStored transactions:");
    for summary in store.summaries(0, args.max_entries) {
        let status = summary
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "pending".to_string());
        println!("  [{}] {} {}", status, summary.method, summary.url);
    }

    // Demonstrate the filter read path
    let successes = store.filter(&FilterCriteria::new().with_statuses(vec!["2xx".to_string()]));
    println!("\nEntries with 2xx responses: {}", successes.len());

    let third_party = store.filter(
        &FilterCriteria::new().with_host_pattern(PatternMatch::new("example.com"), true),
    );
    println!("Entries outside example.com: {}", third_party.len());

    println!(
        "\nStatistics:\n{}",
        serde_json::to_string_pretty(&store.stats())?
    );

    Ok(())
}

/// Load recorded requests from a JSON file
fn load_requests(path: &Path) -> AppResult<Vec<TransactionRequest>> {
    let raw = fs::read_to_string(path)?;
    let requests = serde_json::from_str(&raw)?;
    Ok(requests)
}

/// Small built-in request mix exercising the duplicate and filter paths
fn sample_traffic() -> Vec<TransactionRequest> {
    vec![
        TransactionRequest::new("GET", "example.com", 443, true, "/api/users"),
        TransactionRequest::new("GET", "example.com", 443, true, "/api/users"),
        TransactionRequest::new("POST", "api.example.com", 443, true, "/api/users")
            .with_body(r#"{"name":"ada"}"#),
        TransactionRequest::new("GET", "example.com", 443, true, "/api/users")
            .with_query("page=2"),
        TransactionRequest::new("GET", "static.example.com", 443, true, "/assets/logo.png"),
        TransactionRequest::new("GET", "tracker.ads.net", 80, false, "/pixel.gif"),
    ]
}

/// Attach canned responses to the built-in sample traffic
fn attach_sample_responses(store: &DedupStore) {
    let pairs = vec![
        (
            TransactionRequest::new("GET", "example.com", 443, true, "/api/users"),
            TransactionResponse::new(200).with_headers("Content-Type: application/json\r\n"),
        ),
        (
            TransactionRequest::new("GET", "static.example.com", 443, true, "/assets/logo.png"),
            TransactionResponse::new(200).with_headers("Content-Type: image/png\r\n"),
        ),
        (
            TransactionRequest::new("GET", "tracker.ads.net", 80, false, "/pixel.gif"),
            TransactionResponse::new(404).with_headers("Content-Type: text/html\r\n"),
        ),
    ];

    for (request, response) in pairs {
        store.attach_response(&request, response);
    }
}
