use super::domain::{
    AcademicYear, Category, Department, DepartmentId, DepartmentKey, ExpertId, ExpertReview,
};
use super::sections::SectionRow;

/// Lookup of departments as listed on the dashboards.
///
/// Listings are returned ordered by department name. That order is the only
/// tie-break the rankings use, so implementations must keep it stable.
pub trait DepartmentDirectory: Send + Sync {
    fn departments_in(&self, category: Category) -> Result<Vec<Department>, SourceError>;
    fn all_departments(&self) -> Result<Vec<Department>, SourceError>;
    fn find(&self, key: &DepartmentKey) -> Result<Option<Department>, SourceError>;
}

/// Raw self-assessment rows submitted by a department for a year.
pub trait SectionDataSource: Send + Sync {
    fn fetch_section_data(
        &self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
    ) -> Result<Vec<SectionRow>, SourceError>;
}

/// Expert assignments and their consolidated reviews.
pub trait ExpertDirectory: Send + Sync {
    fn find_expert_for_category(&self, category: Category)
        -> Result<Option<ExpertId>, SourceError>;

    /// `department` may be given by id or by code.
    fn find_expert_review(
        &self,
        expert_id: &ExpertId,
        department: &DepartmentKey,
        academic_year: &AcademicYear,
    ) -> Result<Option<ExpertReview>, SourceError>;
}

/// Everything a ranking pass reads from.
pub trait ReviewDataSource: DepartmentDirectory + SectionDataSource + ExpertDirectory {}

impl<T> ReviewDataSource for T where T: DepartmentDirectory + SectionDataSource + ExpertDirectory {}

/// Failure reported by a data collaborator.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source returned inconsistent data: {0}")]
    Inconsistent(String),
}
