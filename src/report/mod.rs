//! Imbalance, impact, and run-summary reports.
//!
//! Everything here is read-only over headcount snapshots and the move log;
//! reports are what downstream exporters and front ends consume.
//!
//! # Reports
//!
//! - **Imbalance**: per-course nonzero spread, widest first.
//! - **Impact**: outer join of before/after headcounts with deltas.
//! - **Ranges**: per-course spread before and after, with improvement.
//! - **Summary**: headline metrics and a markdown rendering.

mod impact;
mod imbalance;
mod summary;

pub use impact::{impact_table, range_summary, ImpactRow, RangeRow};
pub use imbalance::{imbalance_report, ImbalanceRow};
pub use summary::{render_markdown, QuickSummary};

use crate::config::ReportConfig;
use crate::models::{CountsTable, Move};

/// All reports for one balancing run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Imbalance before the run.
    pub imbalance: Vec<ImbalanceRow>,
    /// Committed moves, in commit order.
    pub moves: Vec<Move>,
    /// Before/after headcounts.
    pub impact: Vec<ImpactRow>,
    /// Per-course spread before/after.
    pub ranges: Vec<RangeRow>,
    /// Headline figures.
    pub summary: QuickSummary,
}

impl RunReport {
    /// Builds every report from the two headcount snapshots and the move log.
    pub fn build(
        before: &CountsTable,
        after: &CountsTable,
        moves: Vec<Move>,
        config: &ReportConfig,
    ) -> Self {
        let imbalance = imbalance_report(before, config.min_lines);
        let impact = impact_table(before, after);
        let ranges = range_summary(&impact);
        let summary = QuickSummary::calculate(&moves, &ranges, config.alert_range);
        Self {
            imbalance,
            moves,
            impact,
            ranges,
            summary,
        }
    }

    /// Markdown rendering of the summary, ranges, and moves.
    pub fn to_markdown(&self) -> String {
        render_markdown(&self.summary, &self.ranges, &self.moves)
    }
}
