use std::collections::HashMap;

use tracing::{debug, warn};

use super::domain::{
    AcademicYear, Category, Department, DepartmentId, DepartmentKey, ExpertId, ScoreResolution,
};
use super::repository::ReviewDataSource;
use super::sections::{SectionScoreCalculator, SectionTotals};

/// Decides the authoritative score for departments within one ranking call.
///
/// Section totals and per-category expert lookups are memoised for the
/// lifetime of the resolver, so a single dashboard request runs the
/// calculator at most once per department. Build a fresh resolver per
/// request; nothing here is meant to outlive it.
pub struct ScoreResolver<'a, R: ?Sized> {
    sources: &'a R,
    calculator: &'a dyn SectionScoreCalculator,
    section_cache: HashMap<(DepartmentId, AcademicYear), SectionTotals>,
    expert_cache: HashMap<Category, Option<ExpertId>>,
}

impl<'a, R> ScoreResolver<'a, R>
where
    R: ReviewDataSource + ?Sized,
{
    pub fn new(sources: &'a R, calculator: &'a dyn SectionScoreCalculator) -> Self {
        Self {
            sources,
            calculator,
            section_cache: HashMap::new(),
            expert_cache: HashMap::new(),
        }
    }

    /// Resolve a department named by id or code. Never fails: every missing
    /// or failing lookup falls back to the automatic score.
    pub fn resolve(
        &mut self,
        key: &DepartmentKey,
        category: Category,
        academic_year: &AcademicYear,
    ) -> ScoreResolution {
        let auto_score = match self.department_id(key) {
            Some(id) => self.section_totals(id, academic_year).total,
            None => {
                warn!(department = %key, "department not found; automatic score defaults to zero");
                0.0
            }
        };

        let expert_score = self.expert_score(key, category, academic_year);
        ScoreResolution::from_scores(auto_score, expert_score)
    }

    pub fn resolve_department(
        &mut self,
        department: &Department,
        academic_year: &AcademicYear,
    ) -> ScoreResolution {
        self.resolve(&department.key(), department.category, academic_year)
    }

    /// Cached section breakdown for a department.
    pub fn section_totals(
        &mut self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
    ) -> SectionTotals {
        let cache_key = (department_id, academic_year.clone());
        if let Some(totals) = self.section_cache.get(&cache_key) {
            return *totals;
        }

        let rows = match self
            .sources
            .fetch_section_data(department_id, academic_year)
        {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    department = %department_id,
                    year = %academic_year,
                    error = %err,
                    "section data unavailable; treating as empty"
                );
                Vec::new()
            }
        };

        let totals = self
            .calculator
            .compute_section_totals(department_id, academic_year, &rows);
        self.section_cache.insert(cache_key, totals);
        totals
    }

    fn department_id(&self, key: &DepartmentKey) -> Option<DepartmentId> {
        match key {
            DepartmentKey::Id(id) => Some(*id),
            DepartmentKey::Code(_) | DepartmentKey::Numeric { .. } => {
                match self.sources.find(key) {
                    Ok(found) => found.map(|department| department.id),
                    Err(err) => {
                        warn!(department = %key, error = %err, "department lookup failed");
                        None
                    }
                }
            }
        }
    }

    fn expert_for(&mut self, category: Category) -> Option<ExpertId> {
        if let Some(cached) = self.expert_cache.get(&category) {
            return cached.clone();
        }

        let expert = match self.sources.find_expert_for_category(category) {
            Ok(expert) => expert,
            Err(err) => {
                warn!(category = category.slug(), error = %err, "expert lookup failed");
                None
            }
        };
        self.expert_cache.insert(category, expert.clone());
        expert
    }

    fn expert_score(
        &mut self,
        key: &DepartmentKey,
        category: Category,
        academic_year: &AcademicYear,
    ) -> Option<f64> {
        let Some(expert_id) = self.expert_for(category) else {
            debug!(category = category.slug(), "no expert assigned to category");
            return None;
        };

        match self
            .sources
            .find_expert_review(&expert_id, key, academic_year)
        {
            Ok(Some(review)) => review.present_total(),
            Ok(None) => {
                debug!(expert = %expert_id, department = %key, "expert review not yet submitted");
                None
            }
            Err(err) => {
                warn!(
                    expert = %expert_id,
                    department = %key,
                    error = %err,
                    "expert review lookup failed"
                );
                None
            }
        }
    }
}
