//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `wayback_urls` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use wayback_urls::app::execute;
use wayback_urls::config::Cli;
use wayback_urls::error_handling::error_kind;
use wayback_urls::initialization::init_logger_with;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the current directory, then from next to the executable,
    // so WAYBACK_URLS_DB_PATH can be set without exporting it
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = execute(&cli.command, &config, &mut stdout).await {
        match error_kind(&e) {
            Some(kind) => eprintln!("wayback_urls error ({kind}): {:#}", e),
            None => eprintln!("wayback_urls error: {:#}", e),
        }
        process::exit(1);
    }
    Ok(())
}
