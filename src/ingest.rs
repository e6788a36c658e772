//! Roster CSV ingestion.
//!
//! The roster arrives wide: one row per student, one column per line, each
//! cell a section code. Ingestion melts it into one [`AssignmentRecord`] per
//! non-empty cell, in line-column order then row order.

use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::config::RosterLayout;
use crate::error::Result;
use crate::models::AssignmentRecord;
use crate::validation::validate_roster;

/// A roster CSV as read, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WideRoster {
    /// Column headers, trimmed.
    pub headers: Vec<String>,
    /// Data rows; lengths may differ from the header until validated.
    pub rows: Vec<Vec<String>>,
}

impl WideRoster {
    /// Reads a wide roster from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for row in rdr.records() {
            rows.push(row?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Reads a wide roster from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Writes the roster as CSV.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes the roster to a CSV file.
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(std::io::BufWriter::new(file))
    }

    /// Index of the column with the given header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Indices of the line columns, in header order.
    pub fn line_columns(&self, prefix: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }

    /// Validates the roster and melts it into assignment records.
    pub fn to_records(&self, layout: &RosterLayout) -> Result<Vec<AssignmentRecord>> {
        validate_roster(self, layout)?;

        let line_cols = self.line_columns(&layout.line_prefix);
        // Validation guarantees the student column exists.
        let Some(student_col) = self.column(&layout.student_column) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for &col in &line_cols {
            let line = &self.headers[col];
            for row in &self.rows {
                let section = row[col].trim();
                if section.is_empty() {
                    continue;
                }
                records.push(AssignmentRecord::new(
                    row[student_col].trim(),
                    line.as_str(),
                    section,
                    layout.course_prefix_len,
                ));
            }
        }
        debug!(
            lines = line_cols.len(),
            rows = self.rows.len(),
            records = records.len(),
            "melted roster"
        );
        Ok(records)
    }
}

/// Loads and validates a roster from any CSV source.
pub fn load_roster_reader<R: Read>(reader: R, layout: &RosterLayout) -> Result<Vec<AssignmentRecord>> {
    WideRoster::from_reader(reader)?.to_records(layout)
}

/// Loads and validates a roster CSV file.
pub fn load_roster_csv(path: impl AsRef<Path>, layout: &RosterLayout) -> Result<Vec<AssignmentRecord>> {
    let path = path.as_ref();
    let records = WideRoster::from_path(path)?.to_records(layout)?;
    info!(path = %path.display(), records = records.len(), "loaded roster");
    Ok(records)
}
