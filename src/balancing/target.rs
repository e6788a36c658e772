//! Fair per-line headcount targets.
//!
//! # Algorithm
//!
//! For a course with `n` offering lines and `total` students:
//! `base = total / n`, `remainder = total % n`. Lines are stably sorted by
//! ascending current headcount and the first `remainder` of them get
//! `base + 1`; the rest get `base`. The extra seats go to the currently
//! smallest lines, which is what drives convergence.
//!
//! Ties keep ascending line order, so identical input gives identical
//! targets.

use std::collections::BTreeMap;

/// Targets for one course across its offering lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTargets {
    /// Course the targets belong to.
    pub course_id: String,
    /// Current headcount per offering line.
    pub current: BTreeMap<String, usize>,
    /// Fair headcount per offering line.
    pub target: BTreeMap<String, usize>,
}

impl LineTargets {
    /// Computes targets from per-line headcounts.
    ///
    /// Lines with zero headcount are not offering lines and are ignored.
    /// Returns `None` when fewer than two offering lines remain.
    pub fn compute<'a>(
        course_id: &str,
        counts: impl IntoIterator<Item = (&'a str, usize)>,
    ) -> Option<Self> {
        let current: BTreeMap<String, usize> = counts
            .into_iter()
            .filter(|&(_, n)| n > 0)
            .map(|(line, n)| (line.to_string(), n))
            .collect();
        if current.len() < 2 {
            return None;
        }

        let total: usize = current.values().sum();
        let n = current.len();
        let base = total / n;
        let remainder = total % n;

        // BTreeMap yields ascending lines; sort_by_key is stable.
        let mut ascending: Vec<(&String, usize)> = current.iter().map(|(l, &c)| (l, c)).collect();
        ascending.sort_by_key(|&(_, c)| c);

        let target = ascending
            .iter()
            .enumerate()
            .map(|(i, (line, _))| {
                let t = if i < remainder { base + 1 } else { base };
                (line.to_string(), t)
            })
            .collect();

        Some(Self {
            course_id: course_id.to_string(),
            current,
            target,
        })
    }

    /// Target for a line (0 for non-offering lines).
    pub fn target_for(&self, line_id: &str) -> usize {
        self.target.get(line_id).copied().unwrap_or(0)
    }

    /// Current headcount for a line.
    pub fn current_for(&self, line_id: &str) -> usize {
        self.current.get(line_id).copied().unwrap_or(0)
    }

    /// Lines above target with their excess, ascending by line.
    pub fn surplus(&self) -> Vec<(&str, usize)> {
        self.current
            .iter()
            .filter_map(|(line, &c)| {
                let t = self.target_for(line);
                (c > t).then(|| (line.as_str(), c - t))
            })
            .collect()
    }

    /// Lines below target with their shortfall, ascending by line.
    pub fn deficit(&self) -> Vec<(&str, usize)> {
        self.current
            .iter()
            .filter_map(|(line, &c)| {
                let t = self.target_for(line);
                (c < t).then(|| (line.as_str(), t - c))
            })
            .collect()
    }

    /// Max minus min headcount over the offering lines.
    pub fn spread(&self) -> usize {
        let max = self.current.values().max().copied().unwrap_or(0);
        let min = self.current.values().min().copied().unwrap_or(0);
        max - min
    }

    /// Whether the course needs no relocation.
    ///
    /// With an odd remainder the targets can swap a `base + 1` line and a
    /// `base` line, so a spread of one counts as balanced even though a
    /// surplus and a deficit line both exist.
    pub fn is_balanced(&self) -> bool {
        self.spread() <= 1 || self.surplus().is_empty() || self.deficit().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(pairs: &[(&'static str, usize)]) -> Option<LineTargets> {
        LineTargets::compute("C", pairs.iter().copied())
    }

    #[test]
    fn test_two_lines_even_total() {
        let t = targets(&[("A", 10), ("B", 4)]).unwrap();
        assert_eq!(t.target_for("A"), 7);
        assert_eq!(t.target_for("B"), 7);
        assert_eq!(t.surplus(), vec![("A", 3)]);
        assert_eq!(t.deficit(), vec![("B", 3)]);
        assert!(!t.is_balanced());
    }

    #[test]
    fn test_three_lines_no_remainder() {
        let t = targets(&[("A", 10), ("B", 9), ("C", 8)]).unwrap();
        for line in ["A", "B", "C"] {
            assert_eq!(t.target_for(line), 9);
        }
        assert_eq!(t.surplus(), vec![("A", 1)]);
        assert_eq!(t.deficit(), vec![("C", 1)]);
    }

    #[test]
    fn test_remainder_goes_to_smallest_lines() {
        // total 11 over 3 lines: base 3, remainder 2 → the two smallest get 4
        let t = targets(&[("A", 7), ("B", 1), ("C", 3)]).unwrap();
        assert_eq!(t.target_for("B"), 4);
        assert_eq!(t.target_for("C"), 4);
        assert_eq!(t.target_for("A"), 3);
    }

    #[test]
    fn test_remainder_tie_keeps_line_order() {
        // base 2, remainder 1: A and B tie on 2, A sorts first
        let t = targets(&[("X", 3), ("B", 2), ("A", 2)]).unwrap();
        assert_eq!(t.target_for("A"), 3);
        assert_eq!(t.target_for("B"), 2);
        assert_eq!(t.target_for("X"), 2);
    }

    #[test]
    fn test_zero_lines_excluded() {
        let t = targets(&[("A", 6), ("B", 0), ("C", 2)]).unwrap();
        assert_eq!(t.current.len(), 2);
        assert_eq!(t.target_for("A"), 4);
        assert_eq!(t.target_for("C"), 4);
        assert_eq!(t.target_for("B"), 0);
    }

    #[test]
    fn test_single_line_skipped() {
        assert!(targets(&[("A", 12)]).is_none());
        assert!(targets(&[("A", 12), ("B", 0)]).is_none());
        assert!(targets(&[]).is_none());
    }

    #[test]
    fn test_spread_of_one_is_balanced() {
        let t = targets(&[("A", 5), ("B", 4)]).unwrap();
        // targets swap the counts: A → 4, B → 5
        assert_eq!(t.surplus(), vec![("A", 1)]);
        assert_eq!(t.spread(), 1);
        assert!(t.is_balanced());
    }

    #[test]
    fn test_totals_preserved() {
        let t = targets(&[("A", 13), ("B", 2), ("C", 7), ("D", 1)]).unwrap();
        let sum: usize = t.target.values().sum();
        assert_eq!(sum, 23);
    }
}
