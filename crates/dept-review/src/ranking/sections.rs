use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::domain::{AcademicYear, DepartmentId, DomainError};

/// The five self-assessment sections a department reports against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    CurriculumAndTeaching,
    ResearchAndPublications,
    FacultyProfile,
    StudentOutcomes,
    InfrastructureAndOutreach,
}

impl SectionKind {
    pub const COUNT: usize = 5;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::CurriculumAndTeaching,
            Self::ResearchAndPublications,
            Self::FacultyProfile,
            Self::StudentOutcomes,
            Self::InfrastructureAndOutreach,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::CurriculumAndTeaching => 0,
            Self::ResearchAndPublications => 1,
            Self::FacultyProfile => 2,
            Self::StudentOutcomes => 3,
            Self::InfrastructureAndOutreach => 4,
        }
    }

    pub const fn numeral(self) -> &'static str {
        match self {
            Self::CurriculumAndTeaching => "I",
            Self::ResearchAndPublications => "II",
            Self::FacultyProfile => "III",
            Self::StudentOutcomes => "IV",
            Self::InfrastructureAndOutreach => "V",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CurriculumAndTeaching => "Curriculum & Teaching",
            Self::ResearchAndPublications => "Research & Publications",
            Self::FacultyProfile => "Faculty Profile",
            Self::StudentOutcomes => "Student Outcomes",
            Self::InfrastructureAndOutreach => "Infrastructure & Outreach",
        }
    }
}

impl FromStr for SectionKind {
    type Err = DomainError;

    /// Accepts `1`..`5`, roman numerals, or the snake_case name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ordered()
            .into_iter()
            .find(|section| {
                let position = (section.index() + 1).to_string();
                needle == position
                    || section.numeral().eq_ignore_ascii_case(needle)
                    || section_slug(*section).eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| DomainError::UnknownSection(needle.to_string()))
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Section {}: {}", self.numeral(), self.label())
    }
}

fn section_slug(section: SectionKind) -> &'static str {
    match section {
        SectionKind::CurriculumAndTeaching => "curriculum_and_teaching",
        SectionKind::ResearchAndPublications => "research_and_publications",
        SectionKind::FacultyProfile => "faculty_profile",
        SectionKind::StudentOutcomes => "student_outcomes",
        SectionKind::InfrastructureAndOutreach => "infrastructure_and_outreach",
    }
}

/// One raw submitted data point for a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    pub section: SectionKind,
    pub criterion: String,
    pub points: f64,
}

/// Per-section subtotals and their sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionTotals {
    pub subtotals: [f64; SectionKind::COUNT],
    pub total: f64,
}

impl SectionTotals {
    pub fn zero() -> Self {
        Self::from_subtotals([0.0; SectionKind::COUNT])
    }

    pub fn from_subtotals(subtotals: [f64; SectionKind::COUNT]) -> Self {
        Self {
            subtotals,
            total: subtotals.iter().sum(),
        }
    }

    pub fn subtotal(&self, section: SectionKind) -> f64 {
        self.subtotals[section.index()]
    }

    pub fn breakdown(&self) -> Vec<SectionSubtotalView> {
        SectionKind::ordered()
            .into_iter()
            .map(|section| SectionSubtotalView {
                section,
                section_label: section.label(),
                score: self.subtotal(section),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSubtotalView {
    pub section: SectionKind,
    pub section_label: &'static str,
    pub score: f64,
}

/// Derives the automatic total from raw section rows.
///
/// Implementations must be deterministic and must always produce a value;
/// a section without rows contributes zero.
pub trait SectionScoreCalculator: Send + Sync {
    fn compute_section_totals(
        &self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
        rows: &[SectionRow],
    ) -> SectionTotals;
}

/// Maximum points each section can contribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRubric {
    pub section_caps: [f64; SectionKind::COUNT],
}

impl ScoringRubric {
    pub fn cap(&self, section: SectionKind) -> f64 {
        self.section_caps[section.index()]
    }

    pub fn maximum_total(&self) -> f64 {
        self.section_caps.iter().sum()
    }
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self {
            section_caps: [100.0, 150.0, 150.0, 150.0, 175.0],
        }
    }
}

/// Sums each section's rows and clamps the result to the rubric cap.
#[derive(Debug, Clone, Default)]
pub struct RubricCalculator {
    rubric: ScoringRubric,
}

impl RubricCalculator {
    pub fn new(rubric: ScoringRubric) -> Self {
        Self { rubric }
    }
}

impl SectionScoreCalculator for RubricCalculator {
    fn compute_section_totals(
        &self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
        rows: &[SectionRow],
    ) -> SectionTotals {
        let mut subtotals = [0.0; SectionKind::COUNT];

        for row in rows {
            if !row.points.is_finite() || row.points < 0.0 {
                debug!(
                    department = %department_id,
                    year = %academic_year,
                    criterion = %row.criterion,
                    points = row.points,
                    "ignoring unusable section points"
                );
                continue;
            }
            subtotals[row.section.index()] += row.points;
        }

        for section in SectionKind::ordered() {
            let slot = &mut subtotals[section.index()];
            *slot = slot.clamp(0.0, self.rubric.cap(section));
        }

        SectionTotals::from_subtotals(subtotals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(section: SectionKind, points: f64) -> SectionRow {
        SectionRow {
            section,
            criterion: format!("{}-criterion", section.numeral()),
            points,
        }
    }

    fn compute(rows: &[SectionRow]) -> SectionTotals {
        RubricCalculator::default().compute_section_totals(
            DepartmentId(7),
            &AcademicYear::starting(2024),
            rows,
        )
    }

    #[test]
    fn default_rubric_spans_full_range() {
        assert_eq!(ScoringRubric::default().maximum_total(), 725.0);
    }

    #[test]
    fn missing_data_yields_zero_total() {
        let totals = compute(&[]);
        assert_eq!(totals, SectionTotals::zero());
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn subtotals_sum_into_total() {
        let totals = compute(&[
            row(SectionKind::CurriculumAndTeaching, 40.0),
            row(SectionKind::CurriculumAndTeaching, 12.5),
            row(SectionKind::FacultyProfile, 80.0),
            row(SectionKind::InfrastructureAndOutreach, 30.0),
        ]);

        assert_eq!(totals.subtotal(SectionKind::CurriculumAndTeaching), 52.5);
        assert_eq!(totals.subtotal(SectionKind::ResearchAndPublications), 0.0);
        assert_eq!(totals.subtotal(SectionKind::FacultyProfile), 80.0);
        assert_eq!(totals.total, 162.5);
    }

    #[test]
    fn sections_are_capped_and_bad_points_skipped() {
        let totals = compute(&[
            row(SectionKind::CurriculumAndTeaching, 90.0),
            row(SectionKind::CurriculumAndTeaching, 45.0),
            row(SectionKind::StudentOutcomes, -20.0),
            row(SectionKind::StudentOutcomes, f64::NAN),
            row(SectionKind::StudentOutcomes, 10.0),
        ]);

        assert_eq!(totals.subtotal(SectionKind::CurriculumAndTeaching), 100.0);
        assert_eq!(totals.subtotal(SectionKind::StudentOutcomes), 10.0);
        assert_eq!(totals.total, 110.0);
    }

    #[test]
    fn calculation_is_deterministic() {
        let rows = vec![
            row(SectionKind::ResearchAndPublications, 33.3),
            row(SectionKind::FacultyProfile, 66.6),
        ];
        assert_eq!(compute(&rows), compute(&rows));
    }

    #[test]
    fn section_parses_numbers_numerals_and_names() {
        assert_eq!("1".parse::<SectionKind>(), Ok(SectionKind::CurriculumAndTeaching));
        assert_eq!("iv".parse::<SectionKind>(), Ok(SectionKind::StudentOutcomes));
        assert_eq!(
            "faculty_profile".parse::<SectionKind>(),
            Ok(SectionKind::FacultyProfile)
        );
        assert!("6".parse::<SectionKind>().is_err());
    }
}
