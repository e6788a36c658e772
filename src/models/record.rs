//! Assignment record model.
//!
//! One record per student per line they occupy. The course is never stored
//! independently of the section: it is the fixed-length prefix of the
//! section code, so a relocation that changes the section can never leave
//! the course out of sync.

use serde::{Deserialize, Serialize};

/// Default number of leading section-code characters that name the course.
pub const DEFAULT_COURSE_PREFIX_LEN: usize = 5;

/// A student's enrolment in one section on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Student identifier.
    pub student_id: String,
    /// Line (time-slot) identifier.
    pub line_id: String,
    /// Course identifier, derived from `section_id`.
    pub course_id: String,
    /// Concrete class-section code.
    pub section_id: String,
}

impl AssignmentRecord {
    /// Creates a record, deriving the course from the section code.
    pub fn new(
        student_id: impl Into<String>,
        line_id: impl Into<String>,
        section_id: impl Into<String>,
        course_prefix_len: usize,
    ) -> Self {
        let section_id = section_id.into();
        Self {
            student_id: student_id.into(),
            line_id: line_id.into(),
            course_id: course_of(&section_id, course_prefix_len).to_string(),
            section_id,
        }
    }
}

/// Returns the course part of a section code.
///
/// Counts characters, not bytes. A code shorter than `prefix_len` is its
/// own course.
pub fn course_of(section_id: &str, prefix_len: usize) -> &str {
    match section_id.char_indices().nth(prefix_len) {
        Some((idx, _)) => &section_id[..idx],
        None => section_id,
    }
}
