//! Relocation steps and committed moves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One planned relocation of a student's course from one line to another.
///
/// A chain is an ordered `Vec<ChainStep>`, all for the same student.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainStep {
    /// Course being relocated.
    pub course_id: String,
    /// Line the course currently sits on.
    pub from_line: String,
    /// Line the course moves to.
    pub to_line: String,
}

impl ChainStep {
    /// Creates a step.
    pub fn new(
        course_id: impl Into<String>,
        from_line: impl Into<String>,
        to_line: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            from_line: from_line.into(),
            to_line: to_line.into(),
        }
    }
}

impl fmt::Display for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.course_id, self.from_line, self.to_line)
    }
}

/// A committed relocation. Appended to the move log, never mutated.
///
/// Field names follow the exported CSV headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Relocated student.
    #[serde(rename = "StudentCode")]
    pub student_id: String,
    /// Relocated course.
    #[serde(rename = "Course")]
    pub course_id: String,
    /// Line the student left.
    #[serde(rename = "FromLine")]
    pub from_line: String,
    /// Line the student joined.
    #[serde(rename = "ToLine")]
    pub to_line: String,
    /// Section the student landed in.
    #[serde(rename = "ToSection")]
    pub to_section: String,
}

impl Move {
    /// Creates a move record for one applied step.
    pub fn from_step(student_id: impl Into<String>, step: &ChainStep, to_section: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            course_id: step.course_id.clone(),
            from_line: step.from_line.clone(),
            to_line: step.to_line.clone(),
            to_section: to_section.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_display() {
        let step = ChainStep::new("12ENG", "AL1", "AL3");
        assert_eq!(step.to_string(), "12ENG: AL1 -> AL3");
    }

    #[test]
    fn test_move_from_step() {
        let step = ChainStep::new("12ENG", "AL1", "AL3");
        let m = Move::from_step("S7", &step, "12ENGb");
        assert_eq!(m.student_id, "S7");
        assert_eq!(m.course_id, "12ENG");
        assert_eq!(m.from_line, "AL1");
        assert_eq!(m.to_line, "AL3");
        assert_eq!(m.to_section, "12ENGb");
    }
}
