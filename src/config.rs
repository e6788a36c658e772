//! Run configuration.
//!
//! Three groups, each with serde defaults so a TOML file only needs the
//! keys it overrides:
//!
//! ```toml
//! [balance]
//! max_rounds = 200
//! max_moves_per_student = 3
//! multi_hop = true
//!
//! [roster]
//! student_column = "Code"
//! line_prefix = "AL"
//! course_prefix_len = 5
//!
//! [report]
//! min_lines = 2
//! alert_range = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::balancing::MAX_CHAIN_DEPTH;
use crate::error::Result;
use crate::models::DEFAULT_COURSE_PREFIX_LEN;

/// Balancing engine limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Maximum full passes before the loop stops.
    pub max_rounds: usize,
    /// Maximum relocation steps any one student may undergo.
    pub max_moves_per_student: usize,
    /// Allow chains that first relocate a blocking course.
    pub multi_hop: bool,
    /// Chain depth when `multi_hop` is on (clamped to 2).
    pub max_chain_depth: usize,
    /// Only balance the N most imbalanced courses of the initial report.
    pub top_only: Option<usize>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_rounds: 200,
            max_moves_per_student: 3,
            multi_hop: true,
            max_chain_depth: MAX_CHAIN_DEPTH,
            top_only: None,
        }
    }
}

impl BalanceConfig {
    /// Sets the round cap.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Sets the per-student move budget.
    pub fn with_max_moves_per_student(mut self, max_moves: usize) -> Self {
        self.max_moves_per_student = max_moves;
        self
    }

    /// Enables or disables multi-hop chains.
    pub fn with_multi_hop(mut self, multi_hop: bool) -> Self {
        self.multi_hop = multi_hop;
        self
    }

    /// Restricts balancing to the top N imbalanced courses.
    pub fn with_top_only(mut self, top_only: usize) -> Self {
        self.top_only = Some(top_only);
        self
    }

    /// Chain depth the planner should use.
    pub fn effective_depth(&self) -> usize {
        if self.multi_hop {
            self.max_chain_depth.min(MAX_CHAIN_DEPTH)
        } else {
            0
        }
    }
}

/// Shape of the wide roster CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterLayout {
    /// Header of the student identifier column.
    pub student_column: String,
    /// Prefix identifying line columns.
    pub line_prefix: String,
    /// Leading section-code characters that name the course.
    pub course_prefix_len: usize,
}

impl Default for RosterLayout {
    fn default() -> Self {
        Self {
            student_column: "Code".to_string(),
            line_prefix: "AL".to_string(),
            course_prefix_len: DEFAULT_COURSE_PREFIX_LEN,
        }
    }
}

/// Reporting thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Courses must appear on at least this many lines to be reported.
    pub min_lines: usize,
    /// Courses whose spread after the run exceeds this are flagged.
    pub alert_range: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_lines: 2,
            alert_range: 3,
        }
    }
}

/// Complete configuration, as read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine limits.
    pub balance: BalanceConfig,
    /// Roster CSV layout.
    pub roster: RosterLayout,
    /// Report thresholds.
    pub report: ReportConfig,
}

impl AppConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
