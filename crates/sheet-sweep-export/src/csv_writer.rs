//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use sheet_sweep_core::Grid;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a grid to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        grid: &Grid,
        path: P,
        options: &CsvWriteOptions,
    ) -> ExportResult<()> {
        let file = File::create(path)?;
        Self::write(grid, file, options)
    }

    /// Write a grid to a writer.
    ///
    /// Short rows are padded with empty fields so every record has the width
    /// of the widest row.
    pub fn write<W: Write>(grid: &Grid, writer: W, options: &CsvWriteOptions) -> ExportResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        for row in grid {
            let mut record: Vec<&str> = row.iter().map(String::as_str).collect();
            record.resize(width, "");
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
