//! Destination section choice.
//!
//! When a course runs several parallel sections on one line, a relocated
//! student joins the section with the fewest students. Ties go to the
//! lexically smallest section code, so repeated runs choose identically.

use crate::models::AllocationStore;

/// Picks the least-loaded section from `(section, headcount)` pairs.
///
/// Returns `None` when there are no sections.
pub fn least_loaded<'a>(sections: impl IntoIterator<Item = (&'a str, usize)>) -> Option<&'a str> {
    sections
        .into_iter()
        .min_by(|(a_id, a_n), (b_id, b_n)| a_n.cmp(b_n).then_with(|| a_id.cmp(b_id)))
        .map(|(id, _)| id)
}

/// Picks the section a student relocating into `(course, line)` should join.
///
/// `None` means the course has no section on that line, and a relocation
/// there is impossible.
pub fn pick_section(store: &AllocationStore, course_id: &str, line_id: &str) -> Option<String> {
    let sections = store.sections_on(course_id, line_id);
    least_loaded(sections).map(str::to_string)
}
