//! Course/line enrolment balancing.
//!
//! Students take at most one course per line (timetable block). A course is
//! usually taught on several lines, and the headcounts across those lines
//! drift apart. This crate reports the imbalance and relocates students
//! between a course's lines until every course is as even as the students'
//! other commitments allow, moving a blocking course out of the way first
//! when needed.
//!
//! # Modules
//!
//! - **`models`**: Assignment records, the allocation store, headcounts,
//!   chain steps and moves
//! - **`balancing`**: Offering index, fair targets, section choice, chain
//!   planner, atomic executor, and the balancing loop
//! - **`report`**: Imbalance, before/after impact, range and quick summaries
//! - **`ingest`** / **`export`**: Wide roster CSV in, report tables out
//! - **`validation`**: Roster shape checks
//! - **`config`**: Engine, roster layout, and report settings
//! - **`generator`**: Seeded synthetic rosters
//!
//! # Example
//!
//! ```
//! use line_balance::balancing::Balancer;
//! use line_balance::config::AppConfig;
//! use line_balance::ingest::load_roster_reader;
//! use line_balance::models::AllocationStore;
//! use line_balance::report::RunReport;
//!
//! let csv = "Code,AL1,AL2\nS1,12MATa,\nS2,12MATa,\nS3,12MATa,\nS4,,12MATb\n";
//! let config = AppConfig::default();
//! let records = load_roster_reader(csv.as_bytes(), &config.roster).unwrap();
//!
//! let outcome = Balancer::new(config.balance).run(AllocationStore::new(records));
//! let report = RunReport::build(&outcome.before, &outcome.after, outcome.moves, &config.report);
//! assert_eq!(report.summary.total_moves, 1);
//! assert_eq!(report.ranges[0].range_after, 0);
//! ```
//!
//! # Guarantees
//!
//! Per-course enrolment is conserved, no student ever holds two courses on
//! one line, and each student's relocations stay within the move budget.

pub mod balancing;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod ingest;
pub mod models;
pub mod report;
pub mod validation;

pub use error::{Error, Result};
