//! Seeded synthetic rosters.
//!
//! Produces valid wide rosters for demos and property tests. Each course is
//! offered on a random subset of lines with one or two sections per line,
//! and every `(course, line)` offering gets a random popularity weight, so
//! students pile onto some lines and balancing has work to do.
//!
//! Output is a pure function of the configuration, seed included.

use std::collections::{BTreeMap, HashSet};

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::RosterLayout;
use crate::ingest::WideRoster;

/// Generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of students.
    pub students: usize,
    /// Number of lines (`AL1..ALn`).
    pub lines: usize,
    /// Number of courses.
    pub courses: usize,
    /// Maximum offering lines per course.
    pub max_lines_per_course: usize,
    /// Probability that a student leaves a line empty.
    pub free_line_rate: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            students: 120,
            lines: 6,
            courses: 18,
            max_lines_per_course: 3,
            free_line_rate: 0.1,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn with_students(mut self, students: usize) -> Self {
        self.students = students;
        self
    }

    pub fn with_lines(mut self, lines: usize) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_courses(mut self, courses: usize) -> Self {
        self.courses = courses;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// One course offering on one line.
#[derive(Debug, Clone)]
struct Offering {
    course: String,
    sections: Vec<String>,
    weight: u32,
}

/// Builds synthetic wide rosters in the default roster layout.
#[derive(Debug, Clone, Default)]
pub struct RosterGenerator {
    config: GeneratorConfig,
}

impl RosterGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Course code for the `i`-th course: five characters, `12C01`, `12C02`, ...
    fn course_code(i: usize) -> String {
        format!("12C{:02}", i % 100)
    }

    /// Generates a roster.
    pub fn generate(&self) -> WideRoster {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let layout = RosterLayout::default();

        let line_ids: Vec<String> = (1..=cfg.lines)
            .map(|i| format!("{}{i}", layout.line_prefix))
            .collect();
        let offerings = self.offerings(&mut rng, &line_ids);

        let mut headers = vec![layout.student_column.clone()];
        headers.extend(line_ids.iter().cloned());

        let mut rows = Vec::with_capacity(cfg.students);
        for s in 0..cfg.students {
            let mut row = vec![format!("S{:04}", s + 1)];
            let mut taken: HashSet<&str> = HashSet::new();
            for line in &line_ids {
                let cell = if rng.random_bool(cfg.free_line_rate.clamp(0.0, 1.0)) {
                    None
                } else {
                    let open: Vec<&Offering> = offerings
                        .get(line.as_str())
                        .into_iter()
                        .flatten()
                        .filter(|o| !taken.contains(o.course.as_str()))
                        .collect();
                    let picked: Option<&Offering> =
                        open.choose_weighted(&mut rng, |o| o.weight).ok().copied();
                    picked.and_then(|o| {
                        taken.insert(o.course.as_str());
                        o.sections.choose(&mut rng).cloned()
                    })
                };
                row.push(cell.unwrap_or_default());
            }
            rows.push(row);
        }

        WideRoster { headers, rows }
    }

    /// Assigns each course a random set of offering lines, sections, and
    /// popularity weights.
    fn offerings(&self, rng: &mut StdRng, line_ids: &[String]) -> BTreeMap<String, Vec<Offering>> {
        let cfg = &self.config;
        let mut by_line: BTreeMap<String, Vec<Offering>> = BTreeMap::new();
        if line_ids.is_empty() {
            return by_line;
        }
        let max_lines = cfg.max_lines_per_course.clamp(1, line_ids.len());

        for c in 0..cfg.courses {
            let course = Self::course_code(c + 1);
            let count = rng.random_range(1..=max_lines);
            for line in line_ids.choose_multiple(rng, count) {
                let sections = (0..rng.random_range(1..=2u8))
                    .map(|k| format!("{course}{}", char::from(b'a' + k)))
                    .collect();
                by_line.entry(line.clone()).or_default().push(Offering {
                    course: course.clone(),
                    sections,
                    weight: rng.random_range(1..=8),
                });
            }
        }
        by_line
    }
}
