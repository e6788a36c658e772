//! CSV and JSON export of report tables.
//!
//! Every writer takes a generic [`Write`] sink so callers can target files,
//! buffers, or stdout. [`write_run`] writes the full set of report files
//! into one directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::{AssignmentRecord, CountsTable, Move};
use crate::report::{ImbalanceRow, ImpactRow, QuickSummary, RangeRow, RunReport};

/// Counts table file name.
pub const COUNTS_FILE: &str = "counts_by_course_line.csv";
/// Imbalance report file name.
pub const IMBALANCE_FILE: &str = "imbalanced_courses.csv";
/// Move list file name.
pub const MOVES_FILE: &str = "move_suggestions.csv";
/// Impact table file name.
pub const IMPACT_FILE: &str = "before_after_impact.csv";
/// Range summary file name.
pub const RANGES_FILE: &str = "range_summary.csv";
/// Markdown summary file name.
pub const SUMMARY_MD_FILE: &str = "summary.md";
/// JSON summary file name.
pub const SUMMARY_JSON_FILE: &str = "summary.json";
/// Post-run allocations file name.
pub const ALLOCATIONS_FILE: &str = "allocations_after.csv";

/// One post-run allocation in long form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRow {
    #[serde(rename = "Code")]
    pub student_id: String,
    #[serde(rename = "Line")]
    pub line_id: String,
    #[serde(rename = "Class")]
    pub section_id: String,
    #[serde(rename = "Course")]
    pub course_id: String,
}

impl From<&AssignmentRecord> for AllocationRow {
    fn from(r: &AssignmentRecord) -> Self {
        Self {
            student_id: r.student_id.clone(),
            line_id: r.line_id.clone(),
            section_id: r.section_id.clone(),
            course_id: r.course_id.clone(),
        }
    }
}

/// Writes the course × line grid: one row per course, one column per line,
/// blank where the course has no students on a line.
pub fn write_counts<W: Write>(writer: W, counts: &CountsTable) -> Result<()> {
    let lines = counts.lines();
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Course"];
    header.extend(lines.iter().copied());
    wtr.write_record(&header)?;

    for course in counts.courses() {
        let per_line = counts.lines_for(course);
        let mut row = vec![course.to_string()];
        row.extend(lines.iter().map(|line| match per_line.get(line) {
            Some(&n) if n > 0 => n.to_string(),
            _ => String::new(),
        }));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes serializable rows with a header line, even when there are none.
fn write_rows<W: Write, T: Serialize>(writer: W, header: &[&str], rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the imbalance report.
pub fn write_imbalance<W: Write>(writer: W, rows: &[ImbalanceRow]) -> Result<()> {
    write_rows(
        writer,
        &["Course", "Range", "Max", "Min", "OfferingLines", "AppearsIn"],
        rows,
    )
}

/// Writes the move list in commit order.
pub fn write_moves<W: Write>(writer: W, moves: &[Move]) -> Result<()> {
    write_rows(
        writer,
        &["StudentCode", "Course", "FromLine", "ToLine", "ToSection"],
        moves,
    )
}

/// Writes the before/after impact table.
pub fn write_impact<W: Write>(writer: W, rows: &[ImpactRow]) -> Result<()> {
    write_rows(writer, &["Course", "Line", "Before", "After", "Change"], rows)
}

/// Writes the per-course range summary.
pub fn write_ranges<W: Write>(writer: W, rows: &[RangeRow]) -> Result<()> {
    write_rows(
        writer,
        &["Course", "RangeBefore", "RangeAfter", "Improvement"],
        rows,
    )
}

/// Writes the record set in long form.
pub fn write_allocations<W: Write>(writer: W, records: &[AssignmentRecord]) -> Result<()> {
    let rows: Vec<AllocationRow> = records.iter().map(AllocationRow::from).collect();
    write_rows(writer, &["Code", "Line", "Class", "Course"], &rows)
}

/// Writes the quick summary as pretty-printed JSON.
pub fn write_summary_json<W: Write>(mut writer: W, summary: &QuickSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

/// Writes every report file for a run into `dir`, creating it if needed.
///
/// Returns the paths written, in a fixed order.
pub fn write_run(
    dir: impl AsRef<Path>,
    before: &CountsTable,
    report: &RunReport,
    records_after: &[AssignmentRecord],
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(8);

    let (path, w) = create(dir, COUNTS_FILE)?;
    write_counts(w, before)?;
    written.push(path);

    let (path, w) = create(dir, IMBALANCE_FILE)?;
    write_imbalance(w, &report.imbalance)?;
    written.push(path);

    let (path, w) = create(dir, MOVES_FILE)?;
    write_moves(w, &report.moves)?;
    written.push(path);

    let (path, w) = create(dir, IMPACT_FILE)?;
    write_impact(w, &report.impact)?;
    written.push(path);

    let (path, w) = create(dir, RANGES_FILE)?;
    write_ranges(w, &report.ranges)?;
    written.push(path);

    let (path, mut w) = create(dir, SUMMARY_MD_FILE)?;
    w.write_all(report.to_markdown().as_bytes())?;
    w.flush()?;
    written.push(path);

    let (path, mut w) = create(dir, SUMMARY_JSON_FILE)?;
    write_summary_json(&mut w, &report.summary)?;
    w.flush()?;
    written.push(path);

    let (path, w) = create(dir, ALLOCATIONS_FILE)?;
    write_allocations(w, records_after)?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "wrote reports");
    Ok(written)
}
