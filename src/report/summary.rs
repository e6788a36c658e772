//! Run summary and its markdown rendering.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total moves | Committed relocation steps |
//! | Students moved | Distinct students with at least one step |
//! | Courses improved | Courses whose nonzero spread shrank |
//! | Average improvement | Mean spread reduction over improved courses |
//! | Still unbalanced | Courses whose spread after exceeds the alert range |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::models::Move;

use super::RangeRow;

/// Headline figures for a balancing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickSummary {
    /// Committed relocation steps.
    pub total_moves: usize,
    /// Distinct students relocated.
    pub students_moved: usize,
    /// Courses whose spread shrank.
    pub courses_improved: usize,
    /// Mean spread reduction across improved courses (0.0 if none).
    pub average_improvement: f64,
    /// Spread above which a course is flagged.
    pub alert_range: usize,
    /// Courses still above the alert range, widest first.
    pub still_unbalanced: Vec<RangeRow>,
}

impl QuickSummary {
    /// Computes the summary from the move log and range summary.
    pub fn calculate(moves: &[Move], ranges: &[RangeRow], alert_range: usize) -> Self {
        let students_moved = moves
            .iter()
            .map(|m| m.student_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let improvements: Vec<i64> = ranges
            .iter()
            .map(|r| r.improvement)
            .filter(|&i| i > 0)
            .collect();
        let average_improvement = if improvements.is_empty() {
            0.0
        } else {
            improvements.iter().sum::<i64>() as f64 / improvements.len() as f64
        };

        let mut still_unbalanced: Vec<RangeRow> = ranges
            .iter()
            .filter(|r| r.range_after > alert_range)
            .cloned()
            .collect();
        still_unbalanced.sort_by(|a, b| {
            b.range_after
                .cmp(&a.range_after)
                .then_with(|| a.course_id.cmp(&b.course_id))
        });

        Self {
            total_moves: moves.len(),
            students_moved,
            courses_improved: improvements.len(),
            average_improvement,
            alert_range,
            still_unbalanced,
        }
    }
}

/// Renders the human-readable run report.
///
/// Sections: quick summary, courses still above the alert range, per-course
/// range summary (largest improvement first), and moves grouped by student.
pub fn render_markdown(summary: &QuickSummary, ranges: &[RangeRow], moves: &[Move]) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "# Student Move Suggestions & Impact Summary\n");

    let _ = writeln!(out, "## Quick Summary\n");
    let _ = writeln!(out, "- Total moves proposed: {}", summary.total_moves);
    let _ = writeln!(out, "- Students moved: {}", summary.students_moved);
    let _ = writeln!(out, "- Courses with improved balance: {}", summary.courses_improved);
    let _ = writeln!(
        out,
        "- Average improvement in course range (ignoring 0s): {:.1}\n",
        summary.average_improvement
    );

    let _ = writeln!(
        out,
        "## Courses Still Unbalanced (Range > {} After Moves)\n",
        summary.alert_range
    );
    if summary.still_unbalanced.is_empty() {
        let _ = writeln!(
            out,
            "All courses balanced within a range of {}.\n",
            summary.alert_range
        );
    } else {
        let _ = writeln!(out, "| Course | Range After | Range Before |");
        let _ = writeln!(out, "|--------|-------------|--------------|");
        for r in &summary.still_unbalanced {
            let _ = writeln!(out, "| {} | {} | {} |", r.course_id, r.range_after, r.range_before);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "## Per-course Range Summary\n");
    let mut sorted: Vec<&RangeRow> = ranges.iter().collect();
    sorted.sort_by(|a, b| {
        b.improvement
            .cmp(&a.improvement)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    let _ = writeln!(out, "| Course | Range Before | Range After | Improvement |");
    let _ = writeln!(out, "|--------|--------------|-------------|-------------|");
    for r in sorted {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            r.course_id, r.range_before, r.range_after, r.improvement
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Student Moves\n");
    if moves.is_empty() {
        let _ = writeln!(out, "No moves proposed.");
        return out;
    }
    let mut grouped: Vec<&Move> = moves.iter().collect();
    grouped.sort_by(|a, b| {
        (&a.student_id, &a.course_id, &a.from_line, &a.to_line)
            .cmp(&(&b.student_id, &b.course_id, &b.from_line, &b.to_line))
    });
    let mut current: Option<&str> = None;
    for m in grouped {
        if current != Some(m.student_id.as_str()) {
            let _ = writeln!(out, "\n### {}\n", m.student_id);
            current = Some(m.student_id.as_str());
        }
        let _ = writeln!(out, "- {}: {} \u{2192} {}", m.course_id, m.from_line, m.to_line);
    }
    out
}
