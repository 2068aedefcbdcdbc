//! Sample email tool
//!
//! Prints a sample intake email, posts it to a running server, or runs case
//! extraction on it against the configured oracle.

use std::env;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use triage_domain::{CaseField, CaseWithRelations, OracleFailure, RawEmail};
use triage_extractor::{Extractor, ExtractorConfig};
use triage_llm::OpenAiProvider;
use triage_server::samples::SampleStyle;

const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Debug, thiserror::Error)]
enum SampleError {
    #[error("{0}")]
    Usage(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Oracle unavailable: {0}")]
    Oracle(#[from] OracleFailure),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        if matches!(e, SampleError::Usage(_)) {
            print_help();
        }
        process::exit(1);
    }
}

async fn run() -> Result<(), SampleError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (command, style) = match args.as_slice() {
        [command, style] => (command.as_str(), style.parse::<SampleStyle>().map_err(SampleError::Usage)?),
        [flag] if flag == "--help" => {
            print_help();
            return Ok(());
        }
        _ => return Err(SampleError::Usage("Expected a command and a style".to_string())),
    };

    let email = style.email();
    match command {
        "print" => println!("{}", serde_json::to_string_pretty(&email)?),
        "send" => send(style, &email).await?,
        "extract" => extract(&email).await?,
        other => return Err(SampleError::Usage(format!("Unknown command: {}", other))),
    }

    Ok(())
}

async fn send(style: SampleStyle, email: &RawEmail) -> Result<(), SampleError> {
    let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let client = reqwest::Client::new();

    println!("Sending {} email to {}", style, api_url);
    println!("  Subject: {}", email.subject);
    println!("  Attachments: {}", email.attachments.len());

    client
        .get(format!("{}/health", api_url))
        .send()
        .await?
        .error_for_status()?;

    let response = client
        .post(format!("{}/api/emails", api_url))
        .json(email)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SampleError::Rejected {
            status: status.as_u16(),
            body: response.text().await?,
        });
    }

    let record: CaseWithRelations = response.json().await?;
    println!("Created case {}", record.case.id);
    println!("  Patient: {}", record.case.patient_name.as_deref().unwrap_or("Unknown"));
    println!("  Case number: {}", record.case.case_number.as_deref().unwrap_or("N/A"));
    if let Some(notes) = &record.case.uncertainty_notes {
        println!("  Uncertainty notes: {}", notes);
    }
    Ok(())
}

async fn extract(email: &RawEmail) -> Result<(), SampleError> {
    let oracle = OpenAiProvider::from_env()?;
    if !oracle.is_configured() {
        return Err(OracleFailure::NotConfigured("OPENAI_API_KEY is not set".to_string()).into());
    }

    let extractor = Extractor::new(Arc::new(oracle), ExtractorConfig::default());
    let case = extractor.extract_case(email).await;

    for field in CaseField::ALL {
        println!("{:>16}: {}", field.as_str(), case.field(field).unwrap_or("(unset)"));
    }
    println!("Attachments:");
    for (i, classification) in case.attachment_classifications.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, classification.filename, classification.category.as_str());
    }
    if let Some(notes) = &case.uncertainty_notes {
        println!("Notes: {}", notes);
    }
    Ok(())
}

fn print_help() {
    println!("Triage Sample - send sample intake emails");
    println!();
    println!("USAGE:");
    println!("    triage-sample <print|send|extract> <style>");
    println!();
    println!("COMMANDS:");
    println!("    print      Print the sample email as JSON");
    println!("    send       POST the sample to a running server");
    println!("    extract    Run case extraction against the configured oracle");
    println!();
    println!("STYLES:");
    for style in SampleStyle::ALL {
        println!("    {:<13}{}", style.as_str(), style.description());
    }
    println!();
    println!("ENVIRONMENT:");
    println!("    API_URL            Server address for send (default: {})", DEFAULT_API_URL);
    println!("    OPENAI_API_KEY     API key used by extract");
    println!("    OPENAI_MODEL       Model used by extract");
    println!();
}
