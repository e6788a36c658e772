//! Allocation store and the per-student schedule index.
//!
//! The store owns the flat record set, which is authoritative. The
//! student → line → course index is derived from it and rebuilt after
//! every committed relocation, so the two can never drift.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{AssignmentRecord, CountsTable};

/// A single student's schedule: line → course.
pub type LineCourses = BTreeMap<String, String>;

/// Derived index: student → line → course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentSchedules {
    by_student: HashMap<String, LineCourses>,
}

impl StudentSchedules {
    /// Builds the index from a record set.
    ///
    /// When a student has two records on one line the later record wins;
    /// input validation rejects such rosters before they reach the store.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AssignmentRecord>) -> Self {
        let mut by_student: HashMap<String, LineCourses> = HashMap::new();
        for r in records {
            by_student
                .entry(r.student_id.clone())
                .or_default()
                .insert(r.line_id.clone(), r.course_id.clone());
        }
        Self { by_student }
    }

    /// The schedule of one student, if they hold any records.
    pub fn get(&self, student_id: &str) -> Option<&LineCourses> {
        self.by_student.get(student_id)
    }

    /// The course a student holds on a line.
    pub fn course_on(&self, student_id: &str, line_id: &str) -> Option<&str> {
        self.get(student_id)
            .and_then(|lines| lines.get(line_id))
            .map(String::as_str)
    }

    /// Whether a student holds any course on a line.
    pub fn occupies(&self, student_id: &str, line_id: &str) -> bool {
        self.course_on(student_id, line_id).is_some()
    }

    /// Number of students indexed.
    pub fn student_count(&self) -> usize {
        self.by_student.len()
    }
}

/// The current student → line → course/section assignments.
///
/// Mutated only through the move executor, one committed chain at a time.
#[derive(Debug, Clone, Default)]
pub struct AllocationStore {
    records: Vec<AssignmentRecord>,
    schedules: StudentSchedules,
}

impl AllocationStore {
    /// Creates a store from a normalized record set.
    pub fn new(records: Vec<AssignmentRecord>) -> Self {
        let schedules = StudentSchedules::from_records(&records);
        Self { records, schedules }
    }

    /// All records, in ingestion order.
    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    /// Consumes the store, returning its records.
    pub fn into_records(self) -> Vec<AssignmentRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The derived schedule index.
    pub fn schedules(&self) -> &StudentSchedules {
        &self.schedules
    }

    /// Aggregates the current headcounts.
    pub fn counts(&self) -> CountsTable {
        CountsTable::from_records(&self.records)
    }

    /// Students enrolled in `course` on `line`, ascending and distinct.
    pub fn students_on(&self, course_id: &str, line_id: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.course_id == course_id && r.line_id == line_id)
            .map(|r| r.student_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Section registry for `(course, line)`: section → headcount.
    ///
    /// Derived on demand; empty when the course has no section on the line.
    pub fn sections_on(&self, course_id: &str, line_id: &str) -> BTreeMap<&str, usize> {
        let mut sections: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.records {
            if r.course_id == course_id && r.line_id == line_id {
                *sections.entry(r.section_id.as_str()).or_insert(0) += 1;
            }
        }
        sections
    }

    /// Moves one record to a new line and section.
    ///
    /// The schedule index is left stale; callers rebuild it once per
    /// committed chain with [`AllocationStore::rebuild_schedules`].
    pub(crate) fn relocate(&mut self, index: usize, to_line: &str, to_section: &str) {
        let record = &mut self.records[index];
        record.line_id = to_line.to_string();
        record.section_id = to_section.to_string();
    }

    pub(crate) fn rebuild_schedules(&mut self) {
        self.schedules = StudentSchedules::from_records(&self.records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(student: &str, line: &str, section: &str) -> AssignmentRecord {
        AssignmentRecord::new(student, line, section, 3)
    }

    fn sample_store() -> AllocationStore {
        AllocationStore::new(vec![
            rec("S2", "L1", "MATa"),
            rec("S1", "L1", "MATb"),
            rec("S3", "L1", "MATa"),
            rec("S1", "L2", "ENGa"),
            rec("S2", "L2", "ARTa"),
        ])
    }

    #[test]
    fn test_schedule_index() {
        let store = sample_store();
        let s = store.schedules();
        assert_eq!(s.student_count(), 3);
        assert_eq!(s.course_on("S1", "L1"), Some("MAT"));
        assert_eq!(s.course_on("S1", "L2"), Some("ENG"));
        assert!(s.occupies("S2", "L2"));
        assert!(!s.occupies("S3", "L2"));
        assert!(s.get("S9").is_none());
    }

    #[test]
    fn test_students_on_sorted() {
        let store = sample_store();
        assert_eq!(store.students_on("MAT", "L1"), vec!["S1", "S2", "S3"]);
        assert!(store.students_on("MAT", "L2").is_empty());
    }

    #[test]
    fn test_sections_on() {
        let store = sample_store();
        let sections = store.sections_on("MAT", "L1");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["MATa"], 2);
        assert_eq!(sections["MATb"], 1);
        assert!(store.sections_on("MAT", "L2").is_empty());
    }

    #[test]
    fn test_relocate_and_rebuild() {
        let mut store = sample_store();
        // sample order: S3's MAT record is third
        let idx = 2;
        assert_eq!(store.records()[idx].student_id, "S3");
        store.relocate(idx, "L2", "MATc");
        store.rebuild_schedules();

        assert_eq!(store.schedules().course_on("S3", "L2"), Some("MAT"));
        assert!(!store.schedules().occupies("S3", "L1"));
        assert_eq!(store.counts().get("MAT", "L2"), 1);
        assert_eq!(store.len(), 5);
    }
}
