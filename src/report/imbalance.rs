//! Course imbalance report.
//!
//! For every course taught on enough lines, the spread between its fullest
//! and emptiest nonzero line. Lines with no students for a course are not
//! offering lines and never count as the minimum.

use serde::{Deserialize, Serialize};

use crate::models::CountsTable;

/// One course's imbalance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImbalanceRow {
    /// Course identifier.
    #[serde(rename = "Course")]
    pub course_id: String,
    /// Max minus min nonzero headcount.
    #[serde(rename = "Range")]
    pub spread: usize,
    /// Largest nonzero headcount.
    #[serde(rename = "Max")]
    pub max: usize,
    /// Smallest nonzero headcount.
    #[serde(rename = "Min")]
    pub min: usize,
    /// Offering lines, comma-joined in ascending order.
    #[serde(rename = "OfferingLines")]
    pub offering_lines: String,
    /// Number of offering lines.
    #[serde(rename = "AppearsIn")]
    pub appears_in: usize,
}

/// Builds the imbalance report.
///
/// Courses on fewer than `min_lines` offering lines are left out. Rows are
/// sorted by descending spread, then ascending course.
pub fn imbalance_report(counts: &CountsTable, min_lines: usize) -> Vec<ImbalanceRow> {
    let mut rows: Vec<ImbalanceRow> = counts
        .courses()
        .into_iter()
        .filter_map(|course| {
            let nonzero: Vec<(&str, usize)> = counts
                .lines_for(course)
                .into_iter()
                .filter(|&(_, n)| n > 0)
                .collect();
            if nonzero.is_empty() || nonzero.len() < min_lines {
                return None;
            }
            let max = nonzero.iter().map(|&(_, n)| n).max().unwrap_or(0);
            let min = nonzero.iter().map(|&(_, n)| n).min().unwrap_or(0);
            Some(ImbalanceRow {
                course_id: course.to_string(),
                spread: max - min,
                max,
                min,
                offering_lines: nonzero
                    .iter()
                    .map(|&(line, _)| line)
                    .collect::<Vec<_>>()
                    .join(","),
                appears_in: nonzero.len(),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.spread
            .cmp(&a.spread)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentRecord;

    fn counts(pairs: &[(&str, &str, usize)]) -> CountsTable {
        let mut records = Vec::new();
        for &(course, line, n) in pairs {
            for i in 0..n {
                records.push(AssignmentRecord::new(format!("{course}{line}{i}"), line, course, 16));
            }
        }
        CountsTable::from_records(&records)
    }

    #[test]
    fn test_sorted_by_spread_then_course() {
        let t = counts(&[
            ("MAT", "L1", 10),
            ("MAT", "L2", 4),
            ("ENG", "L1", 3),
            ("ENG", "L2", 9),
            ("ART", "L1", 5),
            ("ART", "L3", 5),
        ]);
        let report = imbalance_report(&t, 2);
        let order: Vec<&str> = report.iter().map(|r| r.course_id.as_str()).collect();
        assert_eq!(order, vec!["ENG", "MAT", "ART"]);
        assert_eq!(report[0].spread, 6);
        assert_eq!(report[1].max, 10);
        assert_eq!(report[1].min, 4);
        assert_eq!(report[2].spread, 0);
        assert_eq!(report[2].offering_lines, "L1,L3");
    }

    #[test]
    fn test_single_line_courses_excluded() {
        let t = counts(&[("PE", "L1", 20), ("MAT", "L1", 2), ("MAT", "L2", 1)]);
        let report = imbalance_report(&t, 2);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].course_id, "MAT");
        assert_eq!(report[0].appears_in, 2);
    }

    #[test]
    fn test_min_lines_threshold() {
        let t = counts(&[("MAT", "L1", 2), ("MAT", "L2", 1)]);
        assert!(imbalance_report(&t, 3).is_empty());
        assert_eq!(imbalance_report(&t, 1).len(), 1);
    }
}
