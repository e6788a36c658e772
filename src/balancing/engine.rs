//! Balancing loop.
//!
//! # Algorithm
//!
//! Each round:
//! 1. Recompute headcounts and the offering index from the store.
//! 2. For each course (ascending), compute fair targets; skip balanced courses.
//! 3. For each deficit line, each surplus line, each student on the surplus
//!    line (ascending), ask the planner for a chain and the executor to
//!    commit it, subject to the move budget.
//! 4. The first committed chain ends the round; the next round rescans from
//!    the first course. A round that commits nothing ends the run.
//!
//! A `(from, to)` pair is only tried when `current[from] > current[to] + 1`.
//! Surplus/deficit pairs closer than that are skipped, so the order differs
//! from a plain deficit × surplus scan: with `{A:5, B:4, C:6, D:3}` the first
//! move is C→B, not A→B. Every requested move then strictly narrows its pair,
//! which keeps input at spread ≤ 1 untouched and guarantees progress.
//!
//! The round cap bounds the run; the loop always terminates.
//!
//! # Complexity
//! O(rounds × courses × candidates × chain search) with a full rescan per
//! round.

use std::collections::BTreeSet;

use tracing::{debug, info, trace};

use crate::config::BalanceConfig;
use crate::models::{AllocationStore, CountsTable, Move};
use crate::report::imbalance_report;

use super::{ChainPlanner, LineTargets, MoveBudget, MoveExecutor, OfferingIndex};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A full pass found no executable relocation.
    Converged,
    /// The round cap was reached.
    RoundCap,
}

/// Result of a balancing run.
#[derive(Debug, Clone)]
pub struct BalanceOutcome {
    /// Committed moves, in commit order.
    pub moves: Vec<Move>,
    /// Headcounts before the run.
    pub before: CountsTable,
    /// Headcounts after the run.
    pub after: CountsTable,
    /// The store after all moves.
    pub store: AllocationStore,
    /// Rounds executed, including the final empty one on convergence.
    pub rounds: usize,
    /// Why the run stopped.
    pub termination: Termination,
}

impl BalanceOutcome {
    /// Number of distinct students relocated.
    pub fn students_moved(&self) -> usize {
        self.moves
            .iter()
            .map(|m| m.student_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Greedy course/line balancer.
///
/// # Example
///
/// ```
/// use line_balance::balancing::Balancer;
/// use line_balance::config::BalanceConfig;
/// use line_balance::models::{AllocationStore, AssignmentRecord};
///
/// let mut records = Vec::new();
/// for i in 0..6 {
///     records.push(AssignmentRecord::new(format!("S{i}"), "AL1", "12ENGa", 5));
/// }
/// records.push(AssignmentRecord::new("S9", "AL2", "12ENGb", 5));
/// records.push(AssignmentRecord::new("S8", "AL2", "12ENGb", 5));
///
/// let outcome = Balancer::new(BalanceConfig::default()).run(AllocationStore::new(records));
/// assert_eq!(outcome.after.get("12ENG", "AL1"), 4);
/// assert_eq!(outcome.after.get("12ENG", "AL2"), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Balancer {
    config: BalanceConfig,
}

impl Balancer {
    /// Creates a balancer.
    pub fn new(config: BalanceConfig) -> Self {
        Self { config }
    }

    /// The balancer's configuration.
    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Runs the loop to convergence or the round cap.
    pub fn run(&self, mut store: AllocationStore) -> BalanceOutcome {
        let before = store.counts();
        let planner = ChainPlanner::new(self.config.effective_depth());
        let mut budget = MoveBudget::new(self.config.max_moves_per_student);
        let scope = self.scope(&before);

        info!(
            records = store.len(),
            courses = before.courses().len(),
            max_rounds = self.config.max_rounds,
            max_moves_per_student = self.config.max_moves_per_student,
            depth = planner.max_depth(),
            "balancing started"
        );

        let mut moves = Vec::new();
        let mut rounds = 0;
        let termination = loop {
            if rounds >= self.config.max_rounds {
                break Termination::RoundCap;
            }
            rounds += 1;
            debug!(round = rounds, moves = moves.len(), "round started");
            match self.round(&mut store, &planner, &mut budget, scope.as_ref()) {
                Some(committed) => moves.extend(committed),
                None => break Termination::Converged,
            }
        };

        let after = store.counts();
        info!(
            rounds,
            moves = moves.len(),
            termination = ?termination,
            "balancing finished"
        );

        BalanceOutcome {
            moves,
            before,
            after,
            store,
            rounds,
            termination,
        }
    }

    /// Courses eligible for balancing, or `None` for all.
    fn scope(&self, counts: &CountsTable) -> Option<BTreeSet<String>> {
        self.config.top_only.map(|n| {
            imbalance_report(counts, 2)
                .into_iter()
                .take(n)
                .map(|row| row.course_id)
                .collect()
        })
    }

    /// One pass over all courses. Returns the moves of the single chain
    /// committed, or `None` if nothing could be committed.
    fn round(
        &self,
        store: &mut AllocationStore,
        planner: &ChainPlanner,
        budget: &mut MoveBudget,
        scope: Option<&BTreeSet<String>>,
    ) -> Option<Vec<Move>> {
        let counts = store.counts();
        let offerings = OfferingIndex::from_counts(&counts);

        for course in counts.courses() {
            if scope.is_some_and(|s| !s.contains(course)) {
                continue;
            }
            let Some(targets) = LineTargets::compute(course, counts.lines_for(course)) else {
                continue;
            };
            if targets.is_balanced() {
                continue;
            }

            for (to, _) in targets.deficit() {
                for (from, _) in targets.surplus() {
                    // A move must narrow the gap, or targets can swap forever.
                    if targets.current_for(from) <= targets.current_for(to) + 1 {
                        continue;
                    }
                    let candidates: Vec<String> = store
                        .students_on(course, from)
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    for student in &candidates {
                        let committed = Self::try_relocate(
                            store, planner, budget, &offerings, student, course, from, to,
                        );
                        if committed.is_some() {
                            return committed;
                        }
                    }
                }
            }
            debug!(course, spread = targets.spread(), "no executable relocation this pass");
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn try_relocate(
        store: &mut AllocationStore,
        planner: &ChainPlanner,
        budget: &mut MoveBudget,
        offerings: &OfferingIndex,
        student: &str,
        course: &str,
        from: &str,
        to: &str,
    ) -> Option<Vec<Move>> {
        if !budget.allows(student, 1) || budget.already_moved(student, course) {
            return None;
        }
        let schedule = store.schedules().get(student)?;
        let chain = planner.plan(schedule, offerings, course, from, to)?;
        if !budget.admits(student, &chain) {
            trace!(student, course, steps = chain.len(), "chain exceeds move budget");
            return None;
        }

        match MoveExecutor::execute(store, student, &chain) {
            Ok(committed) => {
                budget.charge(student, &chain);
                info!(
                    student,
                    course,
                    from,
                    to,
                    steps = chain.len(),
                    "committed relocation"
                );
                Some(committed)
            }
            Err(rejection) => {
                trace!(student, course, %rejection, "chain rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentRecord;
    use crate::validation::validate_records;
    use std::collections::{BTreeMap, HashMap};

    fn rec(student: &str, line: &str, section: &str) -> AssignmentRecord {
        AssignmentRecord::new(student, line, section, 2)
    }

    /// `n` single-course students of `section` on `line`, ids prefixed.
    fn cohort(prefix: &str, n: usize, line: &str, section: &str) -> Vec<AssignmentRecord> {
        (0..n)
            .map(|i| rec(&format!("{prefix}{i:02}"), line, section))
            .collect()
    }

    fn totals(counts: &CountsTable) -> BTreeMap<String, usize> {
        counts
            .courses()
            .into_iter()
            .map(|c| (c.to_string(), counts.course_total(c)))
            .collect()
    }

    #[test]
    fn test_direct_balancing() {
        let mut records = cohort("A", 10, "L1", "MAa");
        records.extend(cohort("B", 4, "L2", "MAb"));
        let outcome = Balancer::default().run(AllocationStore::new(records));

        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(outcome.after.get("MA", "L1"), 7);
        assert_eq!(outcome.after.get("MA", "L2"), 7);
        assert_eq!(outcome.moves.len(), 3);
        // ascending student order on the surplus line
        let moved: Vec<&str> = outcome.moves.iter().map(|m| m.student_id.as_str()).collect();
        assert_eq!(moved, vec!["A00", "A01", "A02"]);
        assert!(outcome.moves.iter().all(|m| m.to_section == "MAb"));
    }

    #[test]
    fn test_chain_frees_destination() {
        // Everyone on L1 for MA also holds EN on L2; EN is taught on L3 too.
        let mut records = Vec::new();
        for i in 0..4 {
            let s = format!("A{i}");
            records.push(rec(&s, "L1", "MAa"));
            records.push(rec(&s, "L2", "ENa"));
        }
        records.push(rec("B0", "L2", "MAb"));
        records.push(rec("C0", "L3", "ENb"));
        records.push(rec("C1", "L3", "ENb"));
        records.push(rec("C2", "L3", "ENb"));
        records.push(rec("C3", "L3", "ENb"));

        let outcome = Balancer::default().run(AllocationStore::new(records));

        assert_eq!(outcome.after.get("MA", "L1") + outcome.after.get("MA", "L2"), 5);
        let spread = outcome.after.get("MA", "L1").abs_diff(outcome.after.get("MA", "L2"));
        assert!(spread <= 1);
        // the first move is a two-step chain: EN off L2, then MA onto L2
        assert_eq!(outcome.moves[0].course_id, "EN");
        assert_eq!(outcome.moves[0].from_line, "L2");
        assert_eq!(outcome.moves[0].to_line, "L3");
        assert_eq!(outcome.moves[1].course_id, "MA");
        assert_eq!(outcome.moves[1].to_line, "L2");
    }

    #[test]
    fn test_multi_hop_disabled() {
        let mut records = Vec::new();
        for i in 0..4 {
            let s = format!("A{i}");
            records.push(rec(&s, "L1", "MAa"));
            records.push(rec(&s, "L2", "ENa"));
        }
        records.push(rec("B0", "L2", "MAb"));
        records.extend(cohort("C", 4, "L3", "ENb"));

        let config = BalanceConfig::default().with_multi_hop(false);
        let outcome = Balancer::new(config).run(AllocationStore::new(records));
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn test_round_cap() {
        let mut records = cohort("A", 10, "L1", "MAa");
        records.extend(cohort("B", 2, "L2", "MAb"));
        let config = BalanceConfig::default().with_max_rounds(2);
        let outcome = Balancer::new(config).run(AllocationStore::new(records));

        assert_eq!(outcome.termination, Termination::RoundCap);
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.moves.len(), 2);
        assert_eq!(outcome.after.get("MA", "L2"), 4);
    }

    #[test]
    fn test_zero_rounds() {
        let records = cohort("A", 3, "L1", "MAa");
        let config = BalanceConfig::default().with_max_rounds(0);
        let outcome = Balancer::new(config).run(AllocationStore::new(records));
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.termination, Termination::RoundCap);
    }

    #[test]
    fn test_budget_limits_chains() {
        // Only a two-step chain works, but the budget allows one step.
        let mut records = Vec::new();
        for i in 0..4 {
            let s = format!("A{i}");
            records.push(rec(&s, "L1", "MAa"));
            records.push(rec(&s, "L2", "ENa"));
        }
        records.push(rec("B0", "L2", "MAb"));
        records.extend(cohort("C", 4, "L3", "ENb"));

        let config = BalanceConfig::default().with_max_moves_per_student(1);
        let outcome = Balancer::new(config).run(AllocationStore::new(records));
        assert!(outcome.moves.is_empty());
    }

    #[test]
    fn test_invariants_hold() {
        let mut records = Vec::new();
        for i in 0..9 {
            let s = format!("A{i}");
            records.push(rec(&s, "L1", if i % 2 == 0 { "MAa" } else { "MAb" }));
            records.push(rec(&s, "L2", "ENa"));
            if i < 5 {
                records.push(rec(&s, "L3", "ARa"));
            }
        }
        for i in 0..2 {
            let s = format!("B{i}");
            records.push(rec(&s, "L2", "MAc"));
            records.push(rec(&s, "L3", "ENb"));
            records.push(rec(&s, "L1", "ARb"));
        }
        let config = BalanceConfig::default().with_max_moves_per_student(2);
        let outcome = Balancer::new(config).run(AllocationStore::new(records));

        // enrolment is conserved per course
        assert_eq!(totals(&outcome.before), totals(&outcome.after));

        // one course per line per student
        let mut seen = std::collections::HashSet::new();
        for r in outcome.store.records() {
            assert!(seen.insert((r.student_id.clone(), r.line_id.clone())));
        }

        // budget and dedup
        let mut per_student: HashMap<&str, usize> = HashMap::new();
        let mut pairs = std::collections::HashSet::new();
        for m in &outcome.moves {
            *per_student.entry(m.student_id.as_str()).or_insert(0) += 1;
            assert!(pairs.insert((m.student_id.as_str(), m.course_id.as_str())));
        }
        assert!(per_student.values().all(|&n| n <= 2));
    }

    #[test]
    fn test_balanced_input_is_idempotent() {
        let mut records = cohort("A", 5, "L1", "MAa");
        records.extend(cohort("B", 4, "L2", "MAb"));
        records.extend(cohort("C", 3, "L1", "ENa"));
        records.extend(cohort("D", 3, "L3", "ENb"));
        let outcome = Balancer::default().run(AllocationStore::new(records));
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.rounds, 1);
    }

    #[test]
    fn test_second_run_adds_no_moves() {
        let mut records = cohort("A", 11, "L1", "MAa");
        records.extend(cohort("B", 2, "L2", "MAb"));
        records.extend(cohort("C", 1, "L3", "MAc"));
        let first = Balancer::default().run(AllocationStore::new(records));
        assert!(!first.moves.is_empty());

        let second = Balancer::default().run(first.store);
        assert!(second.moves.is_empty());
        assert_eq!(second.before, second.after);
    }

    #[test]
    fn test_top_only_scope() {
        let mut records = cohort("A", 9, "L1", "MAa");
        records.extend(cohort("B", 1, "L2", "MAb"));
        records.extend(cohort("C", 5, "L1", "ENa"));
        records.extend(cohort("D", 1, "L2", "ENb"));
        let config = BalanceConfig::default().with_top_only(1);
        let outcome = Balancer::new(config).run(AllocationStore::new(records));

        assert!(outcome.moves.iter().all(|m| m.course_id == "MA"));
        assert_eq!(outcome.after.get("EN", "L1"), 5);
        assert_eq!(outcome.after.get("MA", "L1"), 5);
    }

    #[test]
    fn test_two_hop_chain_committed() {
        // A00: MA on L1, EN on L2, AR on L3. EN's other line is L3, and AR
        // is also taught on L4, so MA reaches L2 only via AR → L4, EN → L3.
        let mut records = vec![
            rec("A00", "L1", "MAa"),
            rec("A00", "L2", "ENa"),
            rec("A00", "L3", "ARa"),
            rec("B0", "L2", "MAb"),
            rec("E0", "L2", "ENa"),
            rec("E1", "L3", "ENb"),
            rec("E2", "L3", "ENb"),
            rec("R0", "L3", "ARa"),
            rec("R1", "L4", "ARb"),
            rec("R2", "L4", "ARb"),
        ];
        records.extend(cohort("Z", 4, "L1", "MAa"));

        let outcome = Balancer::default().run(AllocationStore::new(records));

        let first: Vec<(&str, &str, &str, &str, &str)> = outcome.moves[..3]
            .iter()
            .map(|m| {
                (
                    m.student_id.as_str(),
                    m.course_id.as_str(),
                    m.from_line.as_str(),
                    m.to_line.as_str(),
                    m.to_section.as_str(),
                )
            })
            .collect();
        assert_eq!(
            first,
            vec![
                ("A00", "AR", "L3", "L4", "ARb"),
                ("A00", "EN", "L2", "L3", "ENb"),
                ("A00", "MA", "L1", "L2", "MAb"),
            ]
        );

        assert!(validate_records(outcome.store.records()).is_ok());
        let schedules = outcome.store.schedules();
        assert_eq!(schedules.course_on("A00", "L2"), Some("MA"));
        assert_eq!(schedules.course_on("A00", "L3"), Some("EN"));
        assert_eq!(schedules.course_on("A00", "L4"), Some("AR"));
        assert!(!schedules.occupies("A00", "L1"));
    }

    #[test]
    fn test_course_held_on_two_lines_moves_once() {
        // A00 holds CX on both L1 and L2; freeing L2 would move CX itself.
        let mut records = vec![
            rec("A00", "L1", "CXa"),
            rec("A00", "L2", "CXb"),
            rec("B0", "L2", "CXb"),
            rec("C0", "L3", "CXc"),
            rec("C1", "L3", "CXc"),
        ];
        records.extend(cohort("Z", 5, "L1", "CXa"));
        assert!(validate_records(&records).is_ok());

        let outcome = Balancer::default().run(AllocationStore::new(records));

        let mut pairs = std::collections::HashSet::new();
        for m in &outcome.moves {
            assert!(
                pairs.insert((m.student_id.as_str(), m.course_id.as_str())),
                "{} moved {} twice",
                m.student_id,
                m.course_id
            );
        }
        assert_eq!(outcome.moves.len(), 2);
        assert_eq!(outcome.moves[0].student_id, "Z00");
        assert_eq!(outcome.moves[0].to_line, "L2");
        assert_eq!(outcome.moves[1].student_id, "A00");
        assert_eq!(outcome.moves[1].to_line, "L3");
        assert!(validate_records(outcome.store.records()).is_ok());
        assert_eq!(outcome.termination, Termination::Converged);
    }
}
