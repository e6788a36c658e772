//! Bounded-depth relocation chain planner.
//!
//! A student moving course `c` from line `from` to line `to` is often
//! blocked: they already hold another course `b` on `to`. The planner
//! searches for a short sequence of relocations that frees `to` first.
//!
//! # Algorithm
//!
//! 1. `to` is free for the student → `[(c, from, to)]`.
//! 2. Depth budget 0 → no plan.
//! 3. One hop: the first offering line `alt` of `b` (ascending, `alt != to`)
//!    the student does not occupy → `[(b, to, alt), (c, from, to)]`.
//! 4. Two hops (budget ≥ 2): for each offering line `alt` of `b` the student
//!    does occupy, with course `c2` there, the first offering line `alt2` of
//!    `c2` the student does not occupy →
//!    `[(c2, alt, alt2), (b, to, alt), (c, from, to)]`.
//!
//! First fit, not minimum disruption: the first valid chain under ascending
//! line order wins. Chains are proposals; the executor re-validates them.

use crate::models::{ChainStep, LineCourses};

use super::OfferingIndex;

/// Deepest conflict resolution the planner will attempt.
pub const MAX_CHAIN_DEPTH: usize = 2;

/// Greedy first-fit chain search over one student's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPlanner {
    max_depth: usize,
}

impl ChainPlanner {
    /// Creates a planner; `max_depth` is clamped to [`MAX_CHAIN_DEPTH`].
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.min(MAX_CHAIN_DEPTH),
        }
    }

    /// A planner that only proposes direct moves into free lines.
    pub fn direct_only() -> Self {
        Self::new(0)
    }

    /// Effective depth budget.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Plans the relocation of `course_id` from `from` to `to` for a student
    /// whose current schedule is `schedule`.
    ///
    /// Returns the steps in application order, ending with the requested
    /// move, or `None` when no chain fits the depth budget.
    pub fn plan(
        &self,
        schedule: &LineCourses,
        offerings: &OfferingIndex,
        course_id: &str,
        from: &str,
        to: &str,
    ) -> Option<Vec<ChainStep>> {
        let requested = ChainStep::new(course_id, from, to);

        let Some(blocking) = schedule.get(to) else {
            return Some(vec![requested]);
        };
        if self.max_depth == 0 {
            return None;
        }

        // One hop: move the blocking course to a free line it is taught on.
        for alt in offerings.lines_for(blocking) {
            if alt == to || schedule.contains_key(alt) {
                continue;
            }
            return Some(vec![ChainStep::new(blocking, to, alt), requested]);
        }

        if self.max_depth < 2 {
            return None;
        }

        // Two hops: free an occupied alternative line first.
        for alt in offerings.lines_for(blocking) {
            if alt == to || alt == from {
                // `from` still holds the course being moved.
                continue;
            }
            let Some(second) = schedule.get(alt) else {
                continue;
            };
            for alt2 in offerings.lines_for(second) {
                if alt2 == alt || schedule.contains_key(alt2) {
                    continue;
                }
                return Some(vec![
                    ChainStep::new(second, alt, alt2),
                    ChainStep::new(blocking, to, alt),
                    requested,
                ]);
            }
        }

        None
    }
}

impl Default for ChainPlanner {
    fn default() -> Self {
        Self::new(MAX_CHAIN_DEPTH)
    }
}
