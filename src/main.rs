//!
//! mergington server binary
//! ------------------------
//! Command-line entry point for the Mergington High School activities API.
//! Supports configuration via CLI flags and environment variables; flags win.

use anyhow::Result;
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn parse_port_env(name: &str) -> Option<u16> {
    match env::var(name) {
        Ok(val) => val.parse::<u16>().ok(),
        Err(_) => None,
    }
}

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return args[i + 1].parse::<u16>().ok();
        }
        i += 1;
    }
    None
}

fn parse_string_arg(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("Mergington Activities Server\n\nUSAGE:\n  mergington [--http-port N] [--teachers-file PATH]\n\nOPTIONS:\n  --http-port N         HTTP API port (env: MERGINGTON_HTTP_PORT, default 8000)\n  --teachers-file PATH  Teacher credential JSON file (env: MERGINGTON_TEACHERS_FILE, default teachers.json)\n\nThe token signing secret comes from the ADMIN_JWT_SECRET environment\nvariable; without it an insecure development fallback is used.\n");
        return Ok(());
    }

    // Defaults
    let default_http: u16 = 8000;
    let default_teachers = "teachers.json";

    // Environment variables
    let env_http = parse_port_env("MERGINGTON_HTTP_PORT");
    let env_teachers = env::var("MERGINGTON_TEACHERS_FILE").ok();

    // CLI arguments override environment
    let arg_http = parse_port_arg(&args, "--http-port");
    let arg_teachers = parse_string_arg(&args, "--teachers-file");

    let http_port = arg_http.or(env_http).unwrap_or(default_http);
    let teachers_file = arg_teachers.or(env_teachers).unwrap_or_else(|| default_teachers.to_string());

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "mergington",
        "Mergington starting: RUST_LOG='{}', http_port={}, teachers_file='{}'",
        rust_log, http_port, teachers_file
    );

    mergington::server::run_with_port(http_port, &teachers_file).await
}
