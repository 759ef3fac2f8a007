use anyhow::Context;
use clap::Parser;
use std::io;

mod cli;
mod config;
mod error;
mod logging;
mod processor;
mod records;
mod transport;

use cli::{Cli, Mode};
use config::Config;
use processor::Processor;
use transport::HttpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_level = logging::level(cli.verbose);

    let config = match cli.mode()? {
        Mode::Batch(config) => config,
        Mode::MissingCsvFile => {
            println!("❌ Error: --csv-file is required for command line mode");
            println!("💡 Tip: Run without arguments for interactive mode!");
            return Ok(());
        }
        Mode::Interactive => {
            let stdin = io::stdin();
            match cli::run_interactive(&mut stdin.lock(), &mut io::stdout())? {
                Some(config) => config,
                None => return Ok(()),
            }
        }
    };

    logging::init(log_level);

    run(config).await.inspect_err(|e| {
        tracing::error!("Processing failed: {e:#}");
    })
}

async fn run(config: Config) -> anyhow::Result<()> {
    let transport = HttpTransport::new(config.request_timeout)
        .context("Failed to build HTTP client")?;
    let processor = Processor::new(config, transport);

    let stats = processor
        .process_csv(|path| {
            let stdin = io::stdin();
            cli::confirm_overwrite(path, &mut stdin.lock(), &mut io::stdout())
        })
        .await
        .with_context(|| {
            format!(
                "Failed to process {}",
                processor.config().csv_file.display()
            )
        })?;

    tracing::info!(
        total_rows = stats.total_rows,
        successful_calls = stats.successful_calls,
        failed_calls = stats.failed_calls,
        skipped_rows = stats.skipped_rows,
        "Processing complete"
    );

    Ok(())
}
