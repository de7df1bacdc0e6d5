//! CSV export.

use super::header;
use crate::models::Record;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Write `records` as CSV to any writer, header first.
///
/// Narrow records are padded with empty fields so every line has the header's
/// width.
pub fn write_records<W: Write>(records: &[Record], writer: W) -> Result<(), Box<dyn Error>> {
    let header = header(records);
    let mut wtr = ::csv::Writer::from_writer(writer);
    wtr.write_record(&header)?;
    for record in records {
        let row = header.iter().map(|label| record.get(label).unwrap_or(""));
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `records` to a CSV file at `path`.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub fn write_csv(records: &[Record], path: &Path) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    write_records(records, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), "Wrote CSV");
    Ok(())
}
