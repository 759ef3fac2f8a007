use clap::Parser;
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use crate::{
    config::{Config, DEFAULT_API_KEY, DEFAULT_API_URL, DEFAULT_RATE_LIMIT_SECS},
    error::ProcessorError,
};

#[derive(Parser, Debug)]
#[command(
    name = "wine-api-processor",
    version,
    about = "Process CSV wine data and make API calls",
    after_help = "Examples:\n  \
        # Interactive mode (no arguments):\n  \
        wine-api-processor\n\n  \
        # Command line mode:\n  \
        wine-api-processor --csv-file wines.csv --api-key my_key --api-url https://api.com\n\n  \
        # With defaults:\n  \
        wine-api-processor --csv-file wines.csv"
)]
pub struct Cli {
    /// Path to the CSV file
    #[arg(long)]
    pub csv_file: Option<PathBuf>,

    /// API key for authentication
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for the API endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// Delay between API calls in seconds
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_SECS)]
    pub rate_limit: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable mock pricing for testing
    #[arg(long)]
    pub enable_mock_pricing: bool,

    /// Do not send the placeholder `price` query parameter
    #[arg(long)]
    pub no_price_param: bool,
}

#[derive(Debug, PartialEq)]
pub enum Mode {
    Interactive,
    Batch(Config),
    /// `--api-key`/`--api-url` given without `--csv-file`.
    MissingCsvFile,
}

impl Cli {
    pub fn mode(self) -> Result<Mode, ProcessorError> {
        if self.csv_file.is_none() && self.api_key.is_none() && self.api_url.is_none() {
            return Ok(Mode::Interactive);
        }

        let Some(csv_file) = self.csv_file else {
            return Ok(Mode::MissingCsvFile);
        };

        let config = Config::new(csv_file)
            .with_api_key(self.api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string()))
            .with_api_url(self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()))
            .with_rate_limit_secs(self.rate_limit)?
            .with_mock_pricing(self.enable_mock_pricing)
            .with_price_param(!self.no_price_param);

        Ok(Mode::Batch(config))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn is_no(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "n" | "no")
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<String> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }

    Ok(line.trim().to_string())
}

/// Walks the user through the run settings. `None` means the user gave up.
pub fn run_interactive<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Config>> {
    writeln!(out, "🎉 🍷 WELCOME TO INTERACTIVE WINE PROCESSOR! 🍷 🎉")?;
    writeln!(out, "==================================================")?;
    writeln!(out)?;
    writeln!(out, "I'll guide you through setting up your wine processing run!")?;
    writeln!(out)?;

    loop {
        let csv_file = loop {
            let path = ask(input, out, "📁 What's the path to your CSV file? ")?;
            if Path::new(&path).exists() {
                break PathBuf::from(path);
            }

            writeln!(out, "❌ File not found: {path}")?;
            if !is_yes(&ask(input, out, "Would you like to try again? (y/n): ")?) {
                writeln!(out, "Exiting...")?;
                return Ok(None);
            }
        };
        writeln!(out)?;

        writeln!(out, "🔑 Let's configure your API settings!")?;
        writeln!(out)?;
        let mut api_key = ask(
            input,
            out,
            &format!("What's your API key? (default: {DEFAULT_API_KEY}): "),
        )?;
        if api_key.is_empty() {
            api_key = DEFAULT_API_KEY.to_string();
        }
        let mut api_url = ask(
            input,
            out,
            &format!("What's your API endpoint URL? (default: {DEFAULT_API_URL}): "),
        )?;
        if api_url.is_empty() {
            api_url = DEFAULT_API_URL.to_string();
        }
        writeln!(out)?;

        writeln!(out, "🎭 Mock Pricing Configuration")?;
        writeln!(out, "This generates fake prices for testing purposes.")?;
        writeln!(out)?;
        let enable_mock_pricing = is_yes(&ask(input, out, "Enable mock pricing for testing? (y/N): ")?);
        writeln!(out)?;

        writeln!(out, "Here's what we're about to run:")?;
        writeln!(out, "  📁 CSV File: {}", csv_file.display())?;
        writeln!(out, "  🔑 API Key: {api_key}")?;
        writeln!(out, "  🌐 API URL: {api_url}")?;
        writeln!(
            out,
            "  🎭 Mock Pricing: {}",
            if enable_mock_pricing { "Enabled" } else { "Disabled" }
        )?;
        writeln!(out)?;

        let confirm = ask(
            input,
            out,
            "Does this look correct? Ready to process your wines? (Y/n): ",
        )?;
        if is_no(&confirm) {
            writeln!(out, "No problem! Let's start over...")?;
            writeln!(out)?;
            continue;
        }

        writeln!(out)?;
        writeln!(out, "✅ Let's get this wine party started! 🍷🚀")?;
        writeln!(out)?;

        let config = Config::new(csv_file)
            .with_api_key(api_key)
            .with_api_url(api_url)
            .with_mock_pricing(enable_mock_pricing);
        return Ok(Some(config));
    }
}

/// Asks whether an existing results file may be replaced.
pub fn confirm_overwrite<R: BufRead, W: Write>(
    path: &Path,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    writeln!(
        out,
        "\n⚠️  Warning: Results file '{}' already exists!",
        path.display()
    )?;
    let overwrite = is_yes(&ask(input, out, "Do you want to overwrite it? (y/n): ")?);
    if !overwrite {
        writeln!(out, "✅ A new timestamped results file will be written instead.")?;
    }

    Ok(overwrite)
}
