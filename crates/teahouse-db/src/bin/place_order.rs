//! # Place Order
//!
//! Places one order from a JSON `OrderRequest` and prints the result.
//!
//! ## Usage
//! ```bash
//! # From a file
//! cargo run -p teahouse-db --bin place-order -- order.json
//!
//! # From stdin, strict stock policy
//! cat order.json | TEAHOUSE_STOCK_POLICY=strict cargo run -p teahouse-db --bin place-order
//! ```
//!
//! ## Output
//! On success the `PlacedOrder` is printed as JSON on stdout and the
//! receipt on stderr. A rejected order prints the reason and exits with
//! status 2; a storage failure exits with status 1.

use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use teahouse_core::request::OrderRequest;
use teahouse_db::logging::init_tracing;
use teahouse_db::{AppConfig, Database, OrderCoordinator, TracingNotifier};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("place-order: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;
    let mut notify = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--notify" | "-n" => notify = true,
            "--help" | "-h" => {
                println!("Teahouse POS Order Placement");
                println!();
                println!("Usage: place-order [OPTIONS] [FILE]");
                println!();
                println!("Reads an order request as JSON from FILE, or stdin when omitted.");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: from config)");
                println!("  -c, --config <PATH>   Config file path");
                println!("  -n, --notify          Log the receipt after commit");
                println!("  -h, --help            Show this help message");
                return Ok(ExitCode::SUCCESS);
            }
            path => input = Some(PathBuf::from(path)),
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    init_tracing(&config.logging.filter);

    let body = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };
    let request: OrderRequest = serde_json::from_str(&body)?;

    let db = Database::new(config.db_config()).await?;
    let mut coordinator = OrderCoordinator::from_config(db.clone(), &config);
    if notify {
        coordinator = coordinator.with_notifier(Arc::new(TracingNotifier));
    }

    let code = match coordinator.place_order(request).await {
        Ok(placed) => {
            println!("{}", serde_json::to_string_pretty(&placed)?);
            eprintln!("{}", placed.summary.render_receipt());
            ExitCode::SUCCESS
        }
        Err(e) if e.is_rejection() => {
            eprintln!("Order rejected: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, retryable = e.is_retryable(), "Order failed");
            eprintln!("Order failed: {}", e);
            ExitCode::FAILURE
        }
    };

    db.close().await;
    Ok(code)
}
