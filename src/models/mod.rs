//! Allocation domain models.
//!
//! Provides the data types the balancing engine reads and mutates. Every
//! structure here is derived from the flat record set in a fixed order:
//! records → counts → (offerings, targets) → sections.
//!
//! # Domain Mappings
//!
//! | line-balance | Timetabling | Workforce |
//! |--------------|-------------|-----------|
//! | Line | Block/Period | Shift |
//! | Course | Subject | Role |
//! | Section | Class group | Crew |
//! | Student | Student | Worker |

mod counts;
mod moves;
mod record;
mod store;

pub use counts::CountsTable;
pub use moves::{ChainStep, Move};
pub use record::{course_of, AssignmentRecord, DEFAULT_COURSE_PREFIX_LEN};
pub use store::{AllocationStore, LineCourses, StudentSchedules};
