//! Per-student disruption guardrails.
//!
//! Tracks how many relocation steps each student has undergone and which
//! of their courses have already been moved, across a whole run.

use std::collections::{HashMap, HashSet};

use crate::models::ChainStep;

/// Move budget and "already moved" set for one balancing run.
#[derive(Debug, Clone, Default)]
pub struct MoveBudget {
    max_per_student: usize,
    used: HashMap<String, usize>,
    moved: HashSet<(String, String)>,
}

impl MoveBudget {
    /// Creates a budget allowing `max_per_student` steps per student.
    pub fn new(max_per_student: usize) -> Self {
        Self {
            max_per_student,
            used: HashMap::new(),
            moved: HashSet::new(),
        }
    }

    /// Steps already charged to a student.
    pub fn used(&self, student_id: &str) -> usize {
        self.used.get(student_id).copied().unwrap_or(0)
    }

    /// Whether `steps` more relocations fit the student's remaining budget.
    pub fn allows(&self, student_id: &str, steps: usize) -> bool {
        self.used(student_id) + steps <= self.max_per_student
    }

    /// Whether the student's course has already been relocated this run.
    pub fn already_moved(&self, student_id: &str, course_id: &str) -> bool {
        self.moved
            .contains(&(student_id.to_string(), course_id.to_string()))
    }

    /// Whether a chain may be committed: within budget, moving each course
    /// at most once, and touching no course of the student that has
    /// already moved.
    pub fn admits(&self, student_id: &str, chain: &[ChainStep]) -> bool {
        let mut courses = HashSet::with_capacity(chain.len());
        self.allows(student_id, chain.len())
            && chain.iter().all(|step| {
                courses.insert(step.course_id.as_str())
                    && !self.already_moved(student_id, &step.course_id)
            })
    }

    /// Charges a committed chain to the student.
    pub fn charge(&mut self, student_id: &str, chain: &[ChainStep]) {
        *self.used.entry(student_id.to_string()).or_insert(0) += chain.len();
        for step in chain {
            self.moved
                .insert((student_id.to_string(), step.course_id.clone()));
        }
    }
}
