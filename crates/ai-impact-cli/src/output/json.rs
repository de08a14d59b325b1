use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout. Non-finite numbers were already mapped to
/// `null` when the result was converted to a `Value`.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = serde_json::to_writer_pretty(&mut out, value)
        .map_err(io::Error::from)
        .and_then(|_| writeln!(out));
    if let Err(e) = written {
        eprintln!("JSON output error: {}", e);
    }
}
