use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{AcademicYear, Category, Department, DepartmentKey, DepartmentScoreRecord};
use super::engine::{rank, RankScope};
use super::repository::ReviewDataSource;
use super::resolver::ScoreResolver;
use super::sections::{
    RubricCalculator, ScoringRubric, SectionScoreCalculator, SectionSubtotalView,
};

/// Service composing the data sources, section calculator and ranking engine.
pub struct DepartmentRankingService<R> {
    sources: Arc<R>,
    calculator: Arc<dyn SectionScoreCalculator>,
}

impl<R> DepartmentRankingService<R>
where
    R: ReviewDataSource + 'static,
{
    pub fn new(sources: Arc<R>, rubric: ScoringRubric) -> Self {
        Self::with_calculator(sources, Arc::new(RubricCalculator::new(rubric)))
    }

    pub fn with_calculator(sources: Arc<R>, calculator: Arc<dyn SectionScoreCalculator>) -> Self {
        Self {
            sources,
            calculator,
        }
    }

    /// Ranked list for one category, with `rank` assigned.
    pub fn departments_with_scores(
        &self,
        category: Category,
        academic_year: &AcademicYear,
    ) -> Vec<DepartmentScoreRecord> {
        let mut resolver = self.resolver();
        let departments = self.list(
            self.sources.departments_in(category),
            "category listing",
        );
        let ranked = score_and_rank(
            &mut resolver,
            &departments,
            academic_year,
            RankScope::Category,
        );

        debug!(
            category = category.slug(),
            year = %academic_year,
            departments = ranked.len(),
            "category ranking computed"
        );
        ranked
    }

    /// Leaderboard across every category, with `overall_rank` assigned.
    pub fn overall_ranking(&self, academic_year: &AcademicYear) -> Vec<DepartmentScoreRecord> {
        let mut resolver = self.resolver();
        let departments = self.list(self.sources.all_departments(), "department listing");
        let ranked = score_and_rank(
            &mut resolver,
            &departments,
            academic_year,
            RankScope::Overall,
        );

        debug!(year = %academic_year, departments = ranked.len(), "overall ranking computed");
        ranked
    }

    /// Single-department page: both ranks plus the section breakdown.
    ///
    /// Returns `None` only when `key` names no department.
    pub fn department_standing(
        &self,
        key: &DepartmentKey,
        academic_year: &AcademicYear,
    ) -> Option<DepartmentStanding> {
        let department = match self.sources.find(key) {
            Ok(Some(department)) => department,
            Ok(None) => return None,
            Err(err) => {
                warn!(department = %key, error = %err, "department lookup failed");
                return None;
            }
        };

        let mut resolver = self.resolver();

        let category_listing = self.list(
            self.sources.departments_in(department.category),
            "category listing",
        );
        let category_ranked = score_and_rank(
            &mut resolver,
            &category_listing,
            academic_year,
            RankScope::Category,
        );

        let overall_listing = self.list(self.sources.all_departments(), "department listing");
        let overall_ranked = score_and_rank(
            &mut resolver,
            &overall_listing,
            academic_year,
            RankScope::Overall,
        );

        let category_rank = category_ranked
            .iter()
            .find(|record| record.department_id == department.id)
            .and_then(|record| record.rank);

        let mut record = overall_ranked
            .iter()
            .find(|record| record.department_id == department.id)
            .cloned()
            .unwrap_or_else(|| {
                warn!(department = %key, "department missing from listings; ranking unavailable");
                DepartmentScoreRecord::new(
                    &department,
                    resolver.resolve_department(&department, academic_year),
                )
            });
        record.rank = category_rank;

        let sections = resolver
            .section_totals(department.id, academic_year)
            .breakdown();

        Some(DepartmentStanding {
            academic_year: academic_year.clone(),
            category_label: department.category.label(),
            category_size: category_ranked.len(),
            overall_size: overall_ranked.len(),
            record,
            sections,
        })
    }

    fn resolver(&self) -> ScoreResolver<'_, R> {
        ScoreResolver::new(self.sources.as_ref(), self.calculator.as_ref())
    }

    fn list<E: std::fmt::Display>(
        &self,
        listing: Result<Vec<Department>, E>,
        what: &'static str,
    ) -> Vec<Department> {
        listing.unwrap_or_else(|err| {
            warn!(error = %err, "{what} unavailable; ranking nothing");
            Vec::new()
        })
    }
}

fn score_and_rank<R>(
    resolver: &mut ScoreResolver<'_, R>,
    departments: &[Department],
    academic_year: &AcademicYear,
    scope: RankScope,
) -> Vec<DepartmentScoreRecord>
where
    R: ReviewDataSource + ?Sized,
{
    let records = departments
        .iter()
        .map(|department| {
            let resolution = resolver.resolve_department(department, academic_year);
            DepartmentScoreRecord::new(department, resolution)
        })
        .collect();

    rank(records, scope)
}

/// Everything the single-department page shows.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentStanding {
    pub academic_year: AcademicYear,
    pub category_label: &'static str,
    pub category_size: usize,
    pub overall_size: usize,
    pub record: DepartmentScoreRecord,
    pub sections: Vec<SectionSubtotalView>,
}
