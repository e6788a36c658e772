//! Headcount table.
//!
//! Aggregates assignment records into `(course, line) → headcount`. This is
//! the single source of truth for imbalance, targets, and offerings; it is
//! recomputed from the store rather than patched.

use std::collections::{BTreeMap, BTreeSet};

use super::AssignmentRecord;

/// Headcount per `(course, line)`, ordered by course then line.
///
/// Only pairs with at least one record are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountsTable {
    counts: BTreeMap<(String, String), usize>,
}

impl CountsTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates headcounts from a record set.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AssignmentRecord>) -> Self {
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for r in records {
            *counts
                .entry((r.course_id.clone(), r.line_id.clone()))
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Headcount for a pair (0 when absent).
    pub fn get(&self, course_id: &str, line_id: &str) -> usize {
        self.counts
            .get(&(course_id.to_string(), line_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Distinct courses, ascending.
    pub fn courses(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for (course, _) in self.counts.keys() {
            if out.last() != Some(&course.as_str()) {
                out.push(course.as_str());
            }
        }
        out
    }

    /// Distinct lines across all courses, ascending.
    pub fn lines(&self) -> Vec<&str> {
        self.counts
            .keys()
            .map(|(_, line)| line.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Per-line headcounts for one course, ascending by line.
    pub fn lines_for(&self, course_id: &str) -> BTreeMap<&str, usize> {
        self.counts
            .iter()
            .filter(|((course, _), _)| course == course_id)
            .map(|((_, line), &n)| (line.as_str(), n))
            .collect()
    }

    /// Total headcount of one course across all lines.
    pub fn course_total(&self, course_id: &str) -> usize {
        self.lines_for(course_id).values().sum()
    }

    /// Iterates `(course, line, headcount)` in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.counts
            .iter()
            .map(|((course, line), &n)| (course.as_str(), line.as_str(), n))
    }

    /// Number of `(course, line)` pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the table has no pairs.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
