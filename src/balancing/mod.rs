//! Line balancing engine.
//!
//! Moves students between the lines a course is taught on until every
//! multi-line course is as even as the students' other commitments allow.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`OfferingIndex`] | Lines each course is currently taught on |
//! | [`LineTargets`] | Fair per-line headcounts and surplus/deficit lines |
//! | [`pick_section`] | Least-loaded destination section |
//! | [`ChainPlanner`] | Bounded-depth relocation chains around conflicts |
//! | [`MoveBudget`] | Per-student step cap and moved-course set |
//! | [`MoveExecutor`] | All-or-nothing chain validation and commit |
//! | [`Balancer`] | Greedy round loop tying the above together |
//!
//! # Guarantees
//!
//! - Per-course enrolment totals never change.
//! - A student never holds two courses on one line.
//! - No student exceeds the step budget; no student's course moves twice.
//! - The loop terminates within the configured round cap.

mod budget;
mod engine;
mod executor;
mod offering;
mod planner;
mod section;
mod target;

pub use budget::MoveBudget;
pub use engine::{BalanceOutcome, Balancer, Termination};
pub use executor::{MoveExecutor, PreparedChain, Rejection};
pub use offering::OfferingIndex;
pub use planner::{ChainPlanner, MAX_CHAIN_DEPTH};
pub use section::{least_loaded, pick_section};
pub use target::LineTargets;
