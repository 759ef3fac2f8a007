use chrono::Local;
use std::{io, path::Path};
use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::ProcessorError,
    records::{
        format_timestamp, read_rows, resolve_output_path, results_path, vintage, wine_name,
        write_results, ResultRecord, RowInput, Status, UNKNOWN,
    },
    transport::Transport,
};

const SUCCESS_STATUS: u16 = 200;
const DEFAULT_MOCK_PRICE: &str = "$28";
const LOGGED_BODY_CHARS: usize = 200;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_rows: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub skipped_rows: usize,
}

/// Result of the single request made for a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success,
    Failed { status: u16, body: String },
    Error { message: String },
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Success => Status::Success,
            Outcome::Failed { .. } => Status::Failed,
            Outcome::Error { .. } => Status::Error,
        }
    }
}

pub struct Processor<T> {
    config: Config,
    transport: T,
}

impl<T: Transport> Processor<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads the configured CSV, calls the endpoint once per row and writes
    /// the results file next to the input.
    pub async fn process_csv<F>(&self, confirm_overwrite: F) -> Result<ProcessingStats, ProcessorError>
    where
        F: FnOnce(&Path) -> io::Result<bool>,
    {
        let csv_file = &self.config.csv_file;
        let rows = read_rows(csv_file).inspect_err(|e| error!("{e}"))?;

        let (stats, results) = self.process_rows(&rows).await;

        let output = resolve_output_path(results_path(csv_file), Local::now(), confirm_overwrite)?;
        write_results(&results, &output, self.config.enable_mock_pricing)
            .inspect_err(|e| error!("{e}"))?;

        Ok(stats)
    }

    pub async fn process_rows(&self, rows: &[RowInput]) -> (ProcessingStats, Vec<ResultRecord>) {
        let mut stats = ProcessingStats::default();
        let mut results = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            // Row 1 of the file is the header.
            let row_num = index + 2;
            stats.total_rows += 1;

            let outcome = self.attempt(row).await;

            let name = wine_name(row).unwrap_or(UNKNOWN);
            let year = vintage(row).unwrap_or(UNKNOWN);

            match &outcome {
                Outcome::Success => {
                    stats.successful_calls += 1;
                    info!("Row {row_num}: Successfully processed {name} ({year})");
                }
                Outcome::Failed { status, body } => {
                    stats.failed_calls += 1;
                    error!("Row {row_num}: API call failed for {name} ({year}) with status {status}: {body}");
                }
                Outcome::Error { message } => {
                    stats.failed_calls += 1;
                    error!("Row {row_num}: Error processing {name} ({year}): {message}");
                }
            }

            results.push(ResultRecord {
                row: row_num,
                wine_name: name.to_string(),
                vintage: year.to_string(),
                status: outcome.status(),
                mock_price: self
                    .config
                    .enable_mock_pricing
                    .then(|| mock_price(year)),
                timestamp: format_timestamp(Local::now()),
            });

            if index + 1 < rows.len() {
                tokio::time::sleep(self.config.rate_limit).await;
            }
        }

        (stats, results)
    }

    /// Makes exactly one request for `row`.
    pub async fn attempt(&self, row: &RowInput) -> Outcome {
        let params = self.build_params(row);
        debug!("Original row: {row:?}");
        debug!("Request parameters: {params:?}");

        match self.transport.get(&self.config.api_url, &params).await {
            Ok(response) if response.status == SUCCESS_STATUS => {
                let preview: String = response.body.chars().take(LOGGED_BODY_CHARS).collect();
                debug!("API call successful: {preview}...");
                Outcome::Success
            }
            Ok(response) => Outcome::Failed {
                status: response.status,
                body: response.body,
            },
            Err(e) => Outcome::Error {
                message: e.to_string(),
            },
        }
    }

    pub fn build_params(&self, row: &RowInput) -> Vec<(&'static str, String)> {
        let name = wine_name(row).unwrap_or_default();
        let year = vintage(row).unwrap_or_default();

        let mut params = vec![
            ("api_key", self.config.api_key.clone()),
            ("winename", encode_wine_name(name)),
            ("vintage", year.to_string()),
        ];
        if self.config.include_price_param {
            params.push(("price", mock_price(year)));
        }
        params.extend([
            ("currencycode", "USD".to_string()),
            ("location", "MA".to_string()),
            ("state", "MA".to_string()),
            ("offer_type", "sale".to_string()),
            ("country", "USA".to_string()),
        ]);

        params
    }
}

/// Form-style encoding: spaces become `+`, everything else non-unreserved is percent-encoded.
pub fn encode_wine_name(name: &str) -> String {
    urlencoding::encode(name).replace("%20", "+")
}

/// Placeholder price bucketed by vintage year.
pub fn mock_price(vintage: &str) -> String {
    let Ok(year) = vintage.trim().parse::<i64>() else {
        return DEFAULT_MOCK_PRICE.to_string();
    };

    let price = match year {
        2015..=2017 => year - 2010 + 25,
        2018..=2020 => year - 2015 + 35,
        2021..=2023 => year - 2020 + 42,
        _ => return DEFAULT_MOCK_PRICE.to_string(),
    };

    format!("${price}")
}
