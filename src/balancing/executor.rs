//! Atomic chain application.
//!
//! A chain is validated in full before anything is written. Validation
//! replays the steps in order over a scratch copy of the student's
//! schedule and of every section registry the chain touches, so step `k`
//! sees the effect of steps `0..k`. The section picked for each step during
//! the replay is exactly the one that applying the steps in order would pick.
//! Only a fully valid chain is committed to the store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::models::{AllocationStore, ChainStep, Move};

use super::section::least_loaded;

/// Why a chain was refused. None of these are errors: the balancing loop
/// moves on to the next candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The chain has no steps.
    EmptyChain,
    /// The student holds no records.
    UnknownStudent,
    /// The student does not hold the step's course on its source line.
    SourceMismatch(ChainStep),
    /// The student already holds a course on the step's destination line.
    DestinationOccupied(ChainStep),
    /// The course has no section on the destination line.
    MissingSection(ChainStep),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyChain => write!(f, "empty chain"),
            Self::UnknownStudent => write!(f, "unknown student"),
            Self::SourceMismatch(step) => write!(f, "source mismatch at {step}"),
            Self::DestinationOccupied(step) => write!(f, "destination occupied at {step}"),
            Self::MissingSection(step) => write!(f, "no destination section at {step}"),
        }
    }
}

/// One validated step: which record moves, and into which section.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    record: usize,
    step: ChainStep,
    section: String,
}

/// A chain that passed validation against a specific store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedChain {
    student_id: String,
    placements: Vec<Placement>,
}

impl PreparedChain {
    /// Student the chain relocates.
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// Destination sections, in step order.
    pub fn sections(&self) -> Vec<&str> {
        self.placements.iter().map(|p| p.section.as_str()).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the chain has no steps (never true for a prepared chain).
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Section registries touched by a chain under replay.
type RegistryOverlay = HashMap<(String, String), BTreeMap<String, usize>>;

fn registry<'m>(
    overlay: &'m mut RegistryOverlay,
    store: &AllocationStore,
    course_id: &str,
    line_id: &str,
) -> &'m mut BTreeMap<String, usize> {
    overlay
        .entry((course_id.to_string(), line_id.to_string()))
        .or_insert_with(|| {
            store
                .sections_on(course_id, line_id)
                .into_iter()
                .map(|(section, n)| (section.to_string(), n))
                .collect()
        })
}

/// Validates and applies relocation chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveExecutor;

impl MoveExecutor {
    /// Validates a chain against the store's current state.
    ///
    /// Checks, per step in order: the student holds exactly that course on
    /// the source line, holds nothing on the destination line, and the
    /// course has a section there.
    pub fn prepare(
        store: &AllocationStore,
        student_id: &str,
        chain: &[ChainStep],
    ) -> Result<PreparedChain, Rejection> {
        if chain.is_empty() {
            return Err(Rejection::EmptyChain);
        }
        let mut schedule = store
            .schedules()
            .get(student_id)
            .cloned()
            .ok_or(Rejection::UnknownStudent)?;

        // record index → (line, section) after the steps replayed so far
        let mut relocated: HashMap<usize, (String, String)> = HashMap::new();
        let mut overlay = RegistryOverlay::new();
        let mut placements = Vec::with_capacity(chain.len());

        for step in chain {
            if schedule.get(&step.from_line) != Some(&step.course_id) {
                return Err(Rejection::SourceMismatch(step.clone()));
            }
            if schedule.contains_key(&step.to_line) {
                return Err(Rejection::DestinationOccupied(step.clone()));
            }

            let found = store.records().iter().enumerate().find_map(|(i, r)| {
                let (line, section) = relocated
                    .get(&i)
                    .map(|(l, s)| (l.as_str(), s.as_str()))
                    .unwrap_or((r.line_id.as_str(), r.section_id.as_str()));
                (r.student_id == student_id && r.course_id == step.course_id && line == step.from_line)
                    .then(|| (i, section.to_string()))
            });
            let Some((record, source_section)) = found else {
                return Err(Rejection::SourceMismatch(step.clone()));
            };

            let section = {
                let dest = registry(&mut overlay, store, &step.course_id, &step.to_line);
                least_loaded(dest.iter().map(|(s, &n)| (s.as_str(), n)))
                    .map(str::to_string)
                    .ok_or_else(|| Rejection::MissingSection(step.clone()))?
            };

            let source = registry(&mut overlay, store, &step.course_id, &step.from_line);
            if let Some(n) = source.get_mut(&source_section) {
                *n -= 1;
                if *n == 0 {
                    source.remove(&source_section);
                }
            }
            *registry(&mut overlay, store, &step.course_id, &step.to_line)
                .entry(section.clone())
                .or_insert(0) += 1;

            schedule.remove(&step.from_line);
            schedule.insert(step.to_line.clone(), step.course_id.clone());
            relocated.insert(record, (step.to_line.clone(), section.clone()));
            placements.push(Placement {
                record,
                step: step.clone(),
                section,
            });
        }

        Ok(PreparedChain {
            student_id: student_id.to_string(),
            placements,
        })
    }

    /// Applies a prepared chain in step order and returns the move records.
    ///
    /// The chain must have been prepared against the store's current state.
    pub fn commit(store: &mut AllocationStore, prepared: PreparedChain) -> Vec<Move> {
        let mut moves = Vec::with_capacity(prepared.placements.len());
        for p in prepared.placements {
            store.relocate(p.record, &p.step.to_line, &p.section);
            moves.push(Move::from_step(&prepared.student_id, &p.step, p.section));
        }
        store.rebuild_schedules();
        moves
    }

    /// Validates then applies a chain; on rejection the store is untouched.
    pub fn execute(
        store: &mut AllocationStore,
        student_id: &str,
        chain: &[ChainStep],
    ) -> Result<Vec<Move>, Rejection> {
        let prepared = Self::prepare(store, student_id, chain)?;
        Ok(Self::commit(store, prepared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentRecord;

    fn rec(student: &str, line: &str, section: &str) -> AssignmentRecord {
        AssignmentRecord::new(student, line, section, 2)
    }

    /// S on {L1: CX, L2: CY}; CY also taught on L3; CX taught on L2.
    fn blocked_store() -> AllocationStore {
        AllocationStore::new(vec![
            rec("S", "L1", "CXa"),
            rec("S", "L2", "CYa"),
            rec("T", "L2", "CXa"),
            rec("T", "L1", "CYa"),
            rec("U", "L3", "CYb"),
            rec("U", "L2", "CXb"),
        ])
    }

    #[test]
    fn test_direct_move_applies() {
        let mut store = AllocationStore::new(vec![
            rec("S", "L1", "CXa"),
            rec("T", "L2", "CXb"),
        ]);
        let moves = MoveExecutor::execute(&mut store, "S", &[ChainStep::new("CX", "L1", "L2")]).unwrap();

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to_section, "CXb");
        assert_eq!(store.schedules().course_on("S", "L2"), Some("CX"));
        assert!(!store.schedules().occupies("S", "L1"));
        assert_eq!(store.counts().get("CX", "L2"), 2);
    }

    #[test]
    fn test_chain_replays_in_order() {
        let mut store = blocked_store();
        let chain = vec![ChainStep::new("CY", "L2", "L3"), ChainStep::new("CX", "L1", "L2")];
        let moves = MoveExecutor::execute(&mut store, "S", &chain).unwrap();

        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].course_id, "CY");
        assert_eq!(moves[0].to_section, "CYb");
        assert_eq!(moves[1].course_id, "CX");
        // CXa and CXb each hold one student on L2; lexical tie-break
        assert_eq!(moves[1].to_section, "CXa");
        assert_eq!(store.schedules().course_on("S", "L2"), Some("CX"));
        assert_eq!(store.schedules().course_on("S", "L3"), Some("CY"));
        assert!(!store.schedules().occupies("S", "L1"));
    }

    #[test]
    fn test_blocked_single_step_rejected() {
        let store = blocked_store();
        let err = MoveExecutor::prepare(&store, "S", &[ChainStep::new("CX", "L1", "L2")]).unwrap_err();
        assert!(matches!(err, Rejection::DestinationOccupied(_)));
    }

    #[test]
    fn test_rejection_leaves_store_untouched() {
        let mut store = blocked_store();
        let before = store.records().to_vec();
        // second step targets L4 where CX has no section
        let chain = vec![ChainStep::new("CY", "L2", "L3"), ChainStep::new("CX", "L1", "L4")];
        let err = MoveExecutor::execute(&mut store, "S", &chain).unwrap_err();

        assert_eq!(err, Rejection::MissingSection(ChainStep::new("CX", "L1", "L4")));
        assert_eq!(store.records(), before.as_slice());
    }

    #[test]
    fn test_source_mismatch() {
        let store = blocked_store();
        let err = MoveExecutor::prepare(&store, "S", &[ChainStep::new("CX", "L3", "L4")]).unwrap_err();
        assert!(matches!(err, Rejection::SourceMismatch(_)));
    }

    #[test]
    fn test_unknown_student_and_empty_chain() {
        let store = blocked_store();
        assert_eq!(
            MoveExecutor::prepare(&store, "Z", &[ChainStep::new("CX", "L1", "L2")]).unwrap_err(),
            Rejection::UnknownStudent
        );
        assert_eq!(MoveExecutor::prepare(&store, "S", &[]).unwrap_err(), Rejection::EmptyChain);
    }

    #[test]
    fn test_prepare_then_commit() {
        let mut store = AllocationStore::new(vec![
            rec("S", "L1", "CZa"),
            rec("S", "L2", "CYa"),
            rec("A", "L2", "CZa"),
            rec("B", "L2", "CZb"),
            rec("B", "L1", "CZb"),
            rec("C", "L3", "CYa"),
        ]);
        let chain = vec![ChainStep::new("CY", "L2", "L3"), ChainStep::new("CZ", "L1", "L2")];
        let prepared = MoveExecutor::prepare(&store, "S", &chain).unwrap();
        assert_eq!(prepared.student_id(), "S");
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared.sections(), vec!["CYa", "CZa"]);

        let moves = MoveExecutor::commit(&mut store, prepared);
        assert_eq!(moves[1].to_section, "CZa");
        assert_eq!(store.sections_on("CZ", "L2")["CZa"], 2);
        assert_eq!(store.sections_on("CZ", "L1")["CZb"], 1);
    }

    #[test]
    fn test_same_course_moved_twice_in_chain() {
        // The student holds CW on two lines; the chain moves one copy off L3
        // and the other onto L3, which must still find a section there.
        let mut store = AllocationStore::new(vec![
            rec("S", "L1", "CXa"),
            rec("S", "L2", "CWa"),
            rec("S", "L3", "CWa"),
            rec("T", "L4", "CWb"),
            rec("T", "L2", "CXa"),
        ]);
        let chain = vec![
            ChainStep::new("CW", "L3", "L4"),
            ChainStep::new("CW", "L2", "L3"),
            ChainStep::new("CX", "L1", "L2"),
        ];
        let err = MoveExecutor::execute(&mut store, "S", &chain).unwrap_err();
        // S was the only CW student on L3, so no section remains there
        assert_eq!(err, Rejection::MissingSection(ChainStep::new("CW", "L2", "L3")));
        assert_eq!(store.schedules().course_on("S", "L3"), Some("CW"));
    }
}
