//! rentdash CLI - Rental-arbitrage operations dashboard
//!
//! # Commands
//!
//! ```bash
//! rentdash serve               # Start HTTP dashboard (PORT env or 5000)
//! rentdash report              # Print the two report views as JSON
//! rentdash leads               # Print the monthly lead funnel as JSON
//! ```

use clap::{Parser, Subcommand};
use rentdash::{
    expiring_soon, fetch_dashboard_data, http_client, lead_counts_by_month, pending_rsd,
    AppState, Authenticator, FileTokenStore, SheetsClient,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default listen port when neither the flag nor `PORT` is set.
const DEFAULT_PORT: u16 = 5000;

/// Default token file, matching the original deployment layout.
const DEFAULT_TOKEN_FILE: &str = "token.json";

#[derive(Parser)]
#[command(name = "rentdash")]
#[command(about = "Rental-arbitrage operations dashboard over Google Sheets", long_about = None)]
struct Cli {
    /// Path to the authorized-user token file
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP dashboard server
    Serve {
        /// Port to listen on (default: PORT env, else 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch both tables and print the two report views as JSON
    Report {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch the CRM table and print lead counts per month as JSON
    Leads {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let token_file = cli
        .token_file
        .or_else(|| env::var("RENTDASH_TOKEN_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port, &token_file).await,
        Commands::Report { output } => cmd_report(&token_file, output.as_deref()).await,
        Commands::Leads { output } => cmd_leads(&token_file, output.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the listen port: flag, then `PORT` env, then the default.
fn resolve_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}

fn make_state(token_file: &Path) -> Arc<AppState> {
    let http = http_client();
    let auth = Authenticator::new(FileTokenStore::new(token_file), http.clone());
    Arc::new(AppState { auth, http })
}

async fn cmd_serve(port: Option<u16>, token_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let port = resolve_port(port);
    rentdash::server::start_server(port, make_state(token_file)).await
}

async fn cmd_report(
    token_file: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = make_state(token_file);
    let token = state.auth.access_token().await?;
    let client = SheetsClient::new(state.http.clone(), token);

    let data = fetch_dashboard_data(&client).await?;
    let expiring = expiring_soon(&data.bookings);
    let pending = pending_rsd(&data.bookings);

    eprintln!("   Expiring soon: {} rows", expiring.len());
    eprintln!("   Pending RSD:   {} rows", pending.len());

    let json = serde_json::to_string_pretty(&serde_json::json!({
        "expiring_soon": expiring,
        "pending_rsd": pending,
    }))?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_leads(
    token_file: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = make_state(token_file);
    let token = state.auth.access_token().await?;
    let client = SheetsClient::new(state.http.clone(), token);

    println!("📖 Fetching {} / {}...", rentdash::pipeline::LEADS_DOCUMENT, rentdash::pipeline::LEADS_WORKSHEET);
    let rows = client
        .fetch_table(rentdash::pipeline::LEADS_DOCUMENT, rentdash::pipeline::LEADS_WORKSHEET)
        .await?;

    let leads = rentdash::build_leads(&rows);
    let funnel = lead_counts_by_month(&leads);
    eprintln!("   {} leads across {} months", leads.len(), funnel.len());

    let entries: Vec<_> = funnel
        .iter()
        .map(|(month, count)| serde_json::json!({ "month": month.to_string(), "leads": count }))
        .collect();
    let json = serde_json::to_string_pretty(&entries)?;
    write_output(&json, output)?;

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
