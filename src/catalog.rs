use serde::Serialize;

/// Exam kinds that require a year to disambiguate the paper.
pub const DATED_EXAM_KINDS: [&str; 3] = ["mid_sem1", "mid_sem2", "end_sem"];

/// Year-independent syllabus-unit resources.
pub const UNIT_KINDS: [&str; 5] = ["unit1", "unit2", "unit3", "unit4", "unit5"];

/// The single resource kind available for lab subjects.
pub const LAB_MATERIAL: &str = "material";

const THEORY_SUBJECTS: [&str; 7] = [
    "biology",
    "mathematics",
    "communication_skill",
    "electrical_engineering",
    "mechanical_engineering",
    "environmental_science",
    "physics",
];

const LAB_SUBJECTS: [&str; 8] = [
    "physics_lab1",
    "physics_lab2",
    "engineering_graphics_lab",
    "workshop",
    "mechanics_lab",
    "chemistry_lab",
    "language_lab",
    "design_thinking_lab",
];

const YEARS: [&str; 2] = ["2024", "2023"];

/// Subjects grouped by category, as returned by `GET /subjects`.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectListing {
    pub theory: Vec<String>,
    pub labs: Vec<String>,
}

/// Static enumeration of valid subjects, exam types, and years.
/// Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    theory: Vec<String>,
    labs: Vec<String>,
    years: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            theory: THEORY_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            labs: LAB_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            years: YEARS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_theory(&self, subject: &str) -> bool {
        self.theory.iter().any(|s| s == subject)
    }

    pub fn is_lab(&self, subject: &str) -> bool {
        self.labs.iter().any(|s| s == subject)
    }

    pub fn list_subjects(&self) -> SubjectListing {
        SubjectListing {
            theory: self.theory.clone(),
            labs: self.labs.clone(),
        }
    }

    /// Exam types available for a subject. Theory subjects get the dated
    /// exams plus the unit resources, labs get the single material entry,
    /// and an unrecognized subject gets an empty list rather than an error.
    pub fn list_options(&self, subject: &str) -> Vec<String> {
        if self.is_lab(subject) {
            vec![LAB_MATERIAL.to_string()]
        } else if self.is_theory(subject) {
            DATED_EXAM_KINDS
                .iter()
                .chain(UNIT_KINDS.iter())
                .map(|s| s.to_string())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Years on offer for a (subject, exam type) pair. Only dated exams of
    /// theory subjects are year-disambiguated; everything else is empty.
    pub fn list_years(&self, subject: &str, exam_type: &str) -> Vec<String> {
        if self.is_theory(subject) && is_dated_exam(exam_type) {
            self.years.clone()
        } else {
            Vec::new()
        }
    }
}

pub fn is_dated_exam(exam_type: &str) -> bool {
    DATED_EXAM_KINDS.contains(&exam_type)
}

/// Map a (subject, exam type, year) triple to its on-disk filename.
///
/// Pure and total over any string inputs; invalid combinations simply
/// produce a name that will not exist under the asset root.
pub fn resolve_filename(subject: &str, exam_type: &str, year: &str) -> String {
    if exam_type == LAB_MATERIAL {
        format!("{subject}_material.pdf")
    } else if exam_type.starts_with("unit") {
        format!("{subject}_{exam_type}.pdf")
    } else {
        format!("{subject}_{exam_type}_{year}.pdf")
    }
}
