//! Input validation for student rosters.
//!
//! Checks structural integrity of a roster before any balancing run.
//! Detects:
//! - Missing student identifier column
//! - No recognizable line columns
//! - Rows whose field count differs from the header
//! - Blank student identifiers on rows that hold assignments
//! - A student assigned twice on the same line
//!
//! All problems are collected; none is retried.

use std::collections::HashSet;
use std::fmt;

use crate::config::RosterLayout;
use crate::ingest::WideRoster;
use crate::models::AssignmentRecord;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The student identifier column is absent.
    MissingStudentColumn,
    /// No column header starts with the line prefix.
    NoLineColumns,
    /// A row has a different number of fields than the header.
    MalformedRow,
    /// A row holds assignments but no student identifier.
    EmptyStudentId,
    /// The same student appears twice on one line.
    DuplicateLineAssignment,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the shape of a wide roster.
///
/// Checks:
/// 1. The student identifier column exists
/// 2. At least one line column exists
/// 3. Every row has as many fields as the header
/// 4. Rows with assignments carry a student identifier
/// 5. No student holds two assignments on the same line
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(roster: &WideRoster, layout: &RosterLayout) -> ValidationResult {
    let mut errors = Vec::new();

    let student_col = roster.column(&layout.student_column);
    if student_col.is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingStudentColumn,
            format!("Expected a '{}' column to identify students", layout.student_column),
        ));
    }

    let line_cols = roster.line_columns(&layout.line_prefix);
    if line_cols.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoLineColumns,
            format!(
                "No line columns found; expected headers starting with '{}'",
                layout.line_prefix
            ),
        ));
    }

    let width = roster.headers.len();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for (row_idx, row) in roster.rows.iter().enumerate() {
        // Row numbers as a spreadsheet shows them: header is row 1.
        let row_no = row_idx + 2;
        if row.len() != width {
            errors.push(ValidationError::new(
                ValidationErrorKind::MalformedRow,
                format!("Row {row_no} has {} fields, header has {width}", row.len()),
            ));
            continue;
        }
        let Some(student_col) = student_col else {
            continue;
        };
        let student = row[student_col].trim();

        for &col in &line_cols {
            if row[col].trim().is_empty() {
                continue;
            }
            if student.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyStudentId,
                    format!("Row {row_no} has assignments but no student identifier"),
                ));
                break;
            }
            let line = roster.headers[col].trim();
            if !seen.insert((student, line)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateLineAssignment,
                    format!("Student '{student}' is assigned twice on line '{line}'"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a normalized record set supplied directly to the engine.
///
/// Checks blank student identifiers and duplicate (student, line) pairs.
pub fn validate_records(records: &[AssignmentRecord]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for r in records {
        if r.student_id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyStudentId,
                format!("Record on line '{}' has no student identifier", r.line_id),
            ));
            continue;
        }
        if !seen.insert((r.student_id.as_str(), r.line_id.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateLineAssignment,
                format!(
                    "Student '{}' is assigned twice on line '{}'",
                    r.student_id, r.line_id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
