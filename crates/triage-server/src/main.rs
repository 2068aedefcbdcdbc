//! Triage Server CLI
//!
//! Starts the HTTP server for IME intake email processing.

use std::env;
use std::process;
use tracing_subscriber::EnvFilter;
use triage_server::{config::ServerConfig, start_server, ServerError};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let mut config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        ServerConfig::default()
    };

    config.apply_env()?;

    start_server(config).await
}

fn print_help() {
    println!("Triage Server - IME intake email extraction");
    println!();
    println!("USAGE:");
    println!("    triage-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    OPENAI_API_KEY     API key for the extraction oracle");
    println!("    OPENAI_MODEL       Model name (default: gpt-4-turbo-preview)");
    println!("    PORT               Port to listen on (default: 3001)");
    println!("    RUST_LOG           Log filter (default: info)");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address, bind_port, database_path");
    println!("    - [oracle] base_url, model, timeout_secs");
    println!("    - [extractor] corpus_attachment_chars, attachment_content_chars,");
    println!("      max_concurrent_attachments");
    println!();
}
