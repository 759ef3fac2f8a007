use chrono::{DateTime, Local};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::File,
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::ProcessorError;

/// One source row: column name to raw cell value, keyed in sorted column order.
pub type RowInput = BTreeMap<String, String>;

pub const WINE_NAME_COLUMNS: [&str; 2] = ["Wine Name", "\u{feff}Wine Name"];
pub const VINTAGE_COLUMNS: [&str; 1] = ["Vintage"];
pub const UNKNOWN: &str = "Unknown";

const RESULTS_SUFFIX: &str = "_results";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const PATH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Success,
    Failed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "Row")]
    pub row: usize,
    #[serde(rename = "Wine Name")]
    pub wine_name: String,
    #[serde(rename = "Vintage")]
    pub vintage: String,
    #[serde(rename = "Status")]
    pub status: Status,
    /// Only `Some` when mock pricing is enabled for the run.
    #[serde(rename = "Mock Price", skip_serializing_if = "Option::is_none")]
    pub mock_price: Option<String>,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RowInput>, ProcessorError> {
    let path = path.as_ref();
    let source_err = |source: csv::Error| ProcessorError::Source {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| source_err(e.into()))?;
    // csv::Reader buffers internally.
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers().map_err(source_err)?.clone();
    info!("Processing CSV with {} columns", headers.len());
    info!("CSV columns: {:?}", headers.iter().collect::<Vec<_>>());

    rdr.deserialize::<RowInput>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(source_err)
}

/// Returns the value of the first candidate column that is present and non-empty.
pub fn lookup_field<'a>(row: &'a RowInput, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|column| row.get(*column))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}

pub fn wine_name(row: &RowInput) -> Option<&str> {
    lookup_field(row, &WINE_NAME_COLUMNS)
}

pub fn vintage(row: &RowInput) -> Option<&str> {
    lookup_field(row, &VINTAGE_COLUMNS)
}

pub fn format_timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `data/wines.csv` becomes `data/wines_results.csv`.
pub fn results_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input.with_file_name(format!("{stem}{RESULTS_SUFFIX}.csv"))
}

/// Picks the final output path. An existing file is only reused when
/// `confirm_overwrite` agrees, otherwise a timestamp suffix is appended
/// (plus a counter if that name is taken as well).
pub fn resolve_output_path<F>(
    path: PathBuf,
    now: DateTime<Local>,
    confirm_overwrite: F,
) -> io::Result<PathBuf>
where
    F: FnOnce(&Path) -> io::Result<bool>,
{
    if !path.exists() || confirm_overwrite(&path)? {
        return Ok(path);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = now.format(PATH_TIMESTAMP_FORMAT).to_string();
    let mut suffixed = path.with_file_name(format!("{stem}_{stamp}.csv"));
    let mut counter = 1;
    while suffixed.exists() {
        suffixed = path.with_file_name(format!("{stem}_{stamp}_{counter}.csv"));
        counter += 1;
    }
    debug!("Output path {} taken, using {}", path.display(), suffixed.display());

    Ok(suffixed)
}

pub fn write_results<P: AsRef<Path>>(
    records: &[ResultRecord],
    path: P,
    include_mock_price: bool,
) -> Result<(), ProcessorError> {
    let path = path.as_ref();
    write_csv(records, path, include_mock_price).map_err(|source| ProcessorError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Results written to {}", path.display());
    Ok(())
}

fn write_csv(records: &[ResultRecord], path: &Path, include_mock_price: bool) -> csv::Result<()> {
    // The header is written up front so an empty run still gets one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let mut header = vec!["Row", "Wine Name", "Vintage", "Status"];
    if include_mock_price {
        header.push("Mock Price");
    }
    header.push("Timestamp");
    wtr.write_record(&header)?;

    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;

    Ok(())
}
