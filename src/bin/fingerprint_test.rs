use std::env;

use rustsieve::{FingerprintGenerator, TransactionRequest};

fn main() {
    println!("Fingerprint Test Application");
    println!("This shows the fingerprint computed for a request");

    let generator = FingerprintGenerator::default();

    // Get request parts from the command line or fall back to samples
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        println!("No request specified, fingerprinting built-in samples:");
        for request in samples() {
            print_fingerprint(&generator, &request);
        }
        println!();
        println!("Usage: fingerprint_test METHOD PATH [QUERY] [BODY]");
        return;
    }

    if args.len() < 2 {
        println!("Usage: fingerprint_test METHOD PATH [QUERY] [BODY]");
        return;
    }

    let mut request = TransactionRequest::new(&args[0], "localhost", 80, false, &args[1]);
    if let Some(query) = args.get(2) {
        request = request.with_query(query);
    }
    if let Some(body) = args.get(3) {
        request = request.with_body(body.clone());
    }

    print_fingerprint(&generator, &request);
}

fn samples() -> Vec<TransactionRequest> {
    vec![
        TransactionRequest::new("GET", "localhost", 80, false, "/API/Users/"),
        TransactionRequest::new("GET", "localhost", 80, false, "/api/users").with_query("page=2"),
        TransactionRequest::new("POST", "localhost", 80, false, "/api/users").with_body("{}"),
    ]
}

fn print_fingerprint(generator: &FingerprintGenerator, request: &TransactionRequest) {
    println!();
    println!("Method:      {}", request.method);
    println!("Path:        {}", request.path);
    println!(
        "Normalized:  {}",
        FingerprintGenerator::normalize_path(&request.path)
    );
    println!("Fingerprint: {}", generator.fingerprint(request));
}
