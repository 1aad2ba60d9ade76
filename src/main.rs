use clap::Parser;

use redic::cli::{execute_command, load_config, RedicArgs};
use redic::core::logging;

#[tokio::main]
async fn main() {
    let args = RedicArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    let log_guard = logging::init(&config.log_dir(), logging::level_for(args.verbosity()));
    log::debug!("{} v{} starting", redic::NAME, redic::VERSION);

    let result = execute_command(&args, &config).await;
    if let Err(e) = &result {
        tracing::debug!(error = ?e, "command failed");
    }

    // Flush the file log before exiting.
    drop(log_guard);

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
