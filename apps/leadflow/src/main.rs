//! # Leadflow - Lead Tracking Server
//!
//! The main binary for Leadflow.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for lead operations
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │           apps/leadflow (THE BINARY)           │
//! │                                                │
//! │   ┌─────────────┐          ┌─────────────┐     │
//! │   │    CLI      │          │  HTTP API   │     │
//! │   │   (clap)    │          │   (axum)    │     │
//! │   └──────┬──────┘          └──────┬──────┘     │
//! │          └───────────┬────────────┘            │
//! │                      ▼                         │
//! │              ┌───────────────┐                 │
//! │              │ leadflow-core │                 │
//! │              │  (THE RULES)  │                 │
//! │              └───────────────┘                 │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! leadflow server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! leadflow create --source partner --domain first
//! leadflow stage 1 contacted
//! leadflow analyze 1
//! leadflow list --stage qualified
//! ```

use clap::Parser;
use leadflow::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing; LEADFLOW_LOG_FORMAT=json selects structured output
    let log_format = std::env::var("LEADFLOW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "leadflow=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

// =============================================================================
// STARTUP BANNER
// =============================================================================

/// Print the Leadflow startup banner.
fn print_banner() {
    println!(
        r#"
  ╦  ╔═╗╔═╗╔╦╗╔═╗╦  ╔═╗╦ ╦
  ║  ║╣ ╠═╣ ║║╠╣ ║  ║ ║║║║
  ╩═╝╚═╝╩ ╩═╩╝╚  ╩═╝╚═╝╚╩╝

  Lead Tracking Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
