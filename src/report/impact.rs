//! Before/after impact of a balancing run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::CountsTable;

/// Headcount change for one `(course, line)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRow {
    /// Course identifier.
    #[serde(rename = "Course")]
    pub course_id: String,
    /// Line identifier.
    #[serde(rename = "Line")]
    pub line_id: String,
    /// Headcount before the run.
    #[serde(rename = "Before")]
    pub before: usize,
    /// Headcount after the run.
    #[serde(rename = "After")]
    pub after: usize,
    /// `after - before`.
    #[serde(rename = "Change")]
    pub change: i64,
}

/// Outer-joins two headcount snapshots.
///
/// A pair present in only one snapshot appears with 0 on the other side.
/// Rows are ordered by course, then line.
pub fn impact_table(before: &CountsTable, after: &CountsTable) -> Vec<ImpactRow> {
    let mut joined: BTreeMap<(&str, &str), (usize, usize)> = BTreeMap::new();
    for (course, line, n) in before.iter() {
        joined.entry((course, line)).or_default().0 = n;
    }
    for (course, line, n) in after.iter() {
        joined.entry((course, line)).or_default().1 = n;
    }

    joined
        .into_iter()
        .map(|((course, line), (b, a))| ImpactRow {
            course_id: course.to_string(),
            line_id: line.to_string(),
            before: b,
            after: a,
            change: a as i64 - b as i64,
        })
        .collect()
}

/// Spread of one course before and after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRow {
    /// Course identifier.
    #[serde(rename = "Course")]
    pub course_id: String,
    /// Nonzero spread before.
    #[serde(rename = "RangeBefore")]
    pub range_before: usize,
    /// Nonzero spread after.
    #[serde(rename = "RangeAfter")]
    pub range_after: usize,
    /// `range_before - range_after`; negative when the run widened the spread.
    #[serde(rename = "Improvement")]
    pub improvement: i64,
}

/// Per-course spread before and after, ignoring zero headcounts.
///
/// Only courses with a positive spread on at least one side are kept,
/// ordered by course.
pub fn range_summary(impact: &[ImpactRow]) -> Vec<RangeRow> {
    let mut by_course: BTreeMap<&str, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for row in impact {
        let entry = by_course.entry(row.course_id.as_str()).or_default();
        if row.before > 0 {
            entry.0.push(row.before);
        }
        if row.after > 0 {
            entry.1.push(row.after);
        }
    }

    by_course
        .into_iter()
        .map(|(course, (before, after))| {
            let range_before = spread(&before);
            let range_after = spread(&after);
            RangeRow {
                course_id: course.to_string(),
                range_before,
                range_after,
                improvement: range_before as i64 - range_after as i64,
            }
        })
        .filter(|r| r.range_before > 0 || r.range_after > 0)
        .collect()
}

fn spread(values: &[usize]) -> usize {
    match (values.iter().max(), values.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}
