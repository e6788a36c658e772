//! Offering index: course → lines that currently carry the course.
//!
//! Rebuilt from a fresh [`CountsTable`] every round. A course can only be
//! relocated onto one of its own offering lines.

use std::collections::BTreeMap;

use crate::models::CountsTable;

/// Per-course ordered set of lines with nonzero headcount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferingIndex {
    lines: BTreeMap<String, Vec<String>>,
}

impl OfferingIndex {
    /// Builds the index from a headcount table.
    pub fn from_counts(counts: &CountsTable) -> Self {
        let mut lines: BTreeMap<String, Vec<String>> = BTreeMap::new();
        // The table iterates by course then ascending line.
        for (course, line, n) in counts.iter() {
            if n > 0 {
                lines
                    .entry(course.to_string())
                    .or_default()
                    .push(line.to_string());
            }
        }
        Self { lines }
    }

    /// Offering lines for a course, ascending. Empty if the course is unknown.
    pub fn lines_for(&self, course_id: &str) -> &[String] {
        self.lines.get(course_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `course` is currently taught on `line`.
    pub fn offers(&self, course_id: &str, line_id: &str) -> bool {
        self.lines_for(course_id).iter().any(|l| l == line_id)
    }

    /// Courses in the index, ascending.
    pub fn courses(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }
}
