//! In-memory snapshot of review data, loadable from CSV exports.
//!
//! A data directory holds `departments.csv`, `section_scores.csv`,
//! `experts.csv` and `expert_reviews.csv`. The snapshot implements every
//! collaborator trait the ranking service reads from.

mod parser;

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::ranking::{
    AcademicYear, Category, Department, DepartmentCode, DepartmentDirectory, DepartmentId,
    DepartmentKey, DomainError, ExpertDirectory, ExpertId, ExpertReview, SectionDataSource,
    SectionKind, SectionRow, SourceError,
};
use parser::{parse_rows, DepartmentRow, ExpertReviewRow, ExpertRow, SectionScoreRow};

pub const DEPARTMENTS_FILE: &str = "departments.csv";
pub const SECTION_SCORES_FILE: &str = "section_scores.csv";
pub const EXPERTS_FILE: &str = "experts.csv";
pub const EXPERT_REVIEWS_FILE: &str = "expert_reviews.csv";

#[derive(Debug)]
pub enum DatasetImportError {
    Io {
        file: &'static str,
        source: std::io::Error,
    },
    Csv {
        file: &'static str,
        source: csv::Error,
    },
    Invalid {
        file: &'static str,
        source: DomainError,
    },
    DuplicateDepartment(DepartmentId),
    DuplicateExpert(Category),
    UnknownDepartment {
        file: &'static str,
        reference: String,
    },
    AmbiguousDepartment {
        file: &'static str,
        reference: String,
        by_id: String,
        by_code: String,
    },
}

impl fmt::Display for DatasetImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetImportError::Io { file, source } => {
                write!(f, "failed to read {file}: {source}")
            }
            DatasetImportError::Csv { file, source } => {
                write!(f, "invalid CSV data in {file}: {source}")
            }
            DatasetImportError::Invalid { file, source } => write!(f, "{file}: {source}"),
            DatasetImportError::DuplicateDepartment(id) => {
                write!(f, "department id {id} appears more than once")
            }
            DatasetImportError::DuplicateExpert(category) => {
                write!(f, "more than one expert assigned to {category}")
            }
            DatasetImportError::UnknownDepartment { file, reference } => {
                write!(f, "{file} references unknown department '{reference}'")
            }
            DatasetImportError::AmbiguousDepartment {
                file,
                reference,
                by_id,
                by_code,
            } => write!(
                f,
                "{file}: '{reference}' is the id of {by_id} and the code of {by_code}"
            ),
        }
    }
}

impl std::error::Error for DatasetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetImportError::Io { source, .. } => Some(source),
            DatasetImportError::Csv { source, .. } => Some(source),
            DatasetImportError::Invalid { source, .. } => Some(source),
            DatasetImportError::DuplicateDepartment(_)
            | DatasetImportError::DuplicateExpert(_)
            | DatasetImportError::UnknownDepartment { .. }
            | DatasetImportError::AmbiguousDepartment { .. } => None,
        }
    }
}

/// Expert assigned to review one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertAssignment {
    pub expert_id: ExpertId,
    pub name: String,
    pub category: Category,
}

/// Already-fetched rows for every department, section and review.
#[derive(Debug, Clone, Default)]
pub struct PortalDataset {
    departments: Vec<Department>,
    section_rows: HashMap<(DepartmentId, AcademicYear), Vec<SectionRow>>,
    experts: HashMap<Category, ExpertAssignment>,
    reviews: Vec<ExpertReview>,
}

impl PortalDataset {
    /// Departments are kept ordered by name, then id.
    pub fn new(departments: Vec<Department>) -> Result<Self, DatasetImportError> {
        let mut seen = std::collections::HashSet::new();
        for department in &departments {
            if !seen.insert(department.id) {
                return Err(DatasetImportError::DuplicateDepartment(department.id));
            }
        }

        let mut departments = departments;
        departments.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(Self {
            departments,
            ..Self::default()
        })
    }

    pub fn assign_expert(
        &mut self,
        assignment: ExpertAssignment,
    ) -> Result<(), DatasetImportError> {
        if self.experts.contains_key(&assignment.category) {
            return Err(DatasetImportError::DuplicateExpert(assignment.category));
        }
        debug!(
            expert = %assignment.expert_id,
            name = %assignment.name,
            category = assignment.category.slug(),
            "expert assigned"
        );
        self.experts.insert(assignment.category, assignment);
        Ok(())
    }

    pub fn add_section_row(
        &mut self,
        department_id: DepartmentId,
        academic_year: AcademicYear,
        row: SectionRow,
    ) {
        self.section_rows
            .entry((department_id, academic_year))
            .or_default()
            .push(row);
    }

    /// Later reviews for the same expert, department and year replace earlier ones.
    pub fn record_review(&mut self, review: ExpertReview) {
        self.reviews.retain(|existing| {
            !(existing.expert_id == review.expert_id
                && existing.department_id == review.department_id
                && existing.academic_year == review.academic_year)
        });
        self.reviews.push(review);
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Numeric text prefers the department with that id over a numeric code.
    pub fn department_by_key(&self, key: &DepartmentKey) -> Option<&Department> {
        key.find_in(&self.departments)
    }

    /// Department a review row names; text that is one department's id and
    /// another's code is rejected.
    fn review_department(&self, reference: &str) -> Result<DepartmentId, DatasetImportError> {
        let unknown = || DatasetImportError::UnknownDepartment {
            file: EXPERT_REVIEWS_FILE,
            reference: reference.to_string(),
        };
        let key = DepartmentKey::parse(reference).ok_or_else(unknown)?;

        if let Some((by_id, by_code)) = key.conflict_in(&self.departments) {
            return Err(DatasetImportError::AmbiguousDepartment {
                file: EXPERT_REVIEWS_FILE,
                reference: key.to_string(),
                by_id: by_id.name.clone(),
                by_code: by_code.name.clone(),
            });
        }

        self.department_by_key(&key)
            .map(|department| department.id)
            .ok_or_else(unknown)
    }

    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DatasetImportError> {
        let dir = dir.as_ref();
        let open = |file: &'static str| {
            File::open(dir.join(file)).map_err(|source| DatasetImportError::Io { file, source })
        };

        let dataset = Self::from_readers(
            open(DEPARTMENTS_FILE)?,
            open(SECTION_SCORES_FILE)?,
            open(EXPERTS_FILE)?,
            open(EXPERT_REVIEWS_FILE)?,
        )?;

        info!(
            data_dir = %dir.display(),
            departments = dataset.departments.len(),
            experts = dataset.experts.len(),
            reviews = dataset.reviews.len(),
            "review dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_readers<D, S, E, V>(
        departments: D,
        section_scores: S,
        experts: E,
        reviews: V,
    ) -> Result<Self, DatasetImportError>
    where
        D: Read,
        S: Read,
        E: Read,
        V: Read,
    {
        let department_rows: Vec<DepartmentRow> = read_csv(DEPARTMENTS_FILE, departments)?;
        let mut parsed = Vec::with_capacity(department_rows.len());
        for row in department_rows {
            parsed.push(Department {
                id: DepartmentId(row.id),
                code: DepartmentCode(row.code),
                name: row.name,
                category: invalid_in(DEPARTMENTS_FILE, row.category.parse())?,
            });
        }
        let mut dataset = Self::new(parsed)?;

        let section_rows: Vec<SectionScoreRow> = read_csv(SECTION_SCORES_FILE, section_scores)?;
        for row in section_rows {
            let department_id = DepartmentId(row.department_id);
            if !dataset.departments.iter().any(|d| d.id == department_id) {
                return Err(DatasetImportError::UnknownDepartment {
                    file: SECTION_SCORES_FILE,
                    reference: department_id.to_string(),
                });
            }
            let academic_year = invalid_in(SECTION_SCORES_FILE, row.academic_year.parse())?;
            let section: SectionKind = invalid_in(SECTION_SCORES_FILE, row.section.parse())?;
            dataset.add_section_row(
                department_id,
                academic_year,
                SectionRow {
                    section,
                    criterion: row.criterion,
                    points: row.points,
                },
            );
        }

        let expert_rows: Vec<ExpertRow> = read_csv(EXPERTS_FILE, experts)?;
        for row in expert_rows {
            dataset.assign_expert(ExpertAssignment {
                expert_id: ExpertId(row.expert_id),
                name: row.name,
                category: invalid_in(EXPERTS_FILE, row.category.parse())?,
            })?;
        }

        let review_rows: Vec<ExpertReviewRow> = read_csv(EXPERT_REVIEWS_FILE, reviews)?;
        for row in review_rows {
            let department_id = dataset.review_department(&row.department)?;

            dataset.record_review(ExpertReview {
                expert_id: ExpertId(row.expert_id),
                department_id,
                academic_year: invalid_in(EXPERT_REVIEWS_FILE, row.academic_year.parse())?,
                total_score: row.total_score,
                remarks: row.remarks,
            });
        }

        Ok(dataset)
    }
}

fn read_csv<R, T>(file: &'static str, reader: R) -> Result<Vec<T>, DatasetImportError>
where
    R: Read,
    T: for<'de> serde::Deserialize<'de>,
{
    parse_rows(reader).map_err(|source| DatasetImportError::Csv { file, source })
}

fn invalid_in<T>(
    file: &'static str,
    parsed: Result<T, DomainError>,
) -> Result<T, DatasetImportError> {
    parsed.map_err(|source| DatasetImportError::Invalid { file, source })
}

impl DepartmentDirectory for PortalDataset {
    fn departments_in(&self, category: Category) -> Result<Vec<Department>, SourceError> {
        Ok(self
            .departments
            .iter()
            .filter(|department| department.category == category)
            .cloned()
            .collect())
    }

    fn all_departments(&self) -> Result<Vec<Department>, SourceError> {
        Ok(self.departments.clone())
    }

    fn find(&self, key: &DepartmentKey) -> Result<Option<Department>, SourceError> {
        Ok(self.department_by_key(key).cloned())
    }
}

impl SectionDataSource for PortalDataset {
    fn fetch_section_data(
        &self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
    ) -> Result<Vec<SectionRow>, SourceError> {
        Ok(self
            .section_rows
            .get(&(department_id, academic_year.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

impl ExpertDirectory for PortalDataset {
    fn find_expert_for_category(
        &self,
        category: Category,
    ) -> Result<Option<ExpertId>, SourceError> {
        Ok(self
            .experts
            .get(&category)
            .map(|assignment| assignment.expert_id.clone()))
    }

    fn find_expert_review(
        &self,
        expert_id: &ExpertId,
        department: &DepartmentKey,
        academic_year: &AcademicYear,
    ) -> Result<Option<ExpertReview>, SourceError> {
        let Some(department_id) = self.department_by_key(department).map(|d| d.id) else {
            return Ok(None);
        };

        Ok(self
            .reviews
            .iter()
            .find(|review| {
                review.expert_id == *expert_id
                    && review.department_id == department_id
                    && review.academic_year == *academic_year
            })
            .cloned())
    }
}
