//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `ibylin_core` linkage and storage wiring outside the app host.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `ibylin_cli [DATA_DIR]`. Without an argument only linkage is
//! checked; with one, the container is built there and summarized.

use futures::StreamExt;
use ibylin_core::{AppConfig, AppContainer};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    println!("ibylin_core ping={}", ibylin_core::ping());
    println!("ibylin_core version={}", ibylin_core::core_version());

    let Some(data_dir) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match summarize(AppConfig::new(data_dir)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ibylin_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn summarize(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(log_dir) = config.log_dir() {
        ibylin_core::init_logging(&config.log_level, log_dir)?;
    }
    let container = AppContainer::build(config)?;

    let mut users = container.user_repository().get_users();
    let count = match users.next().await {
        Some(snapshot) => snapshot?.len(),
        None => 0,
    };
    println!("users count={count}");

    match container.reading_history().last_read_book() {
        Some(book) => println!(
            "last_read title={} progress={}",
            book.book_title,
            book.progress_text()
        ),
        None => println!("last_read none"),
    }
    Ok(())
}
