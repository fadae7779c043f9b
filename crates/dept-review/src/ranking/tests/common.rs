use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::ranking::domain::{
    AcademicYear, Category, Department, DepartmentCode, DepartmentId, DepartmentKey,
    DepartmentScoreRecord, ExpertId, ExpertReview, ScoreResolution,
};
use crate::ranking::repository::{
    DepartmentDirectory, ExpertDirectory, SectionDataSource, SourceError,
};
use crate::ranking::sections::{
    RubricCalculator, ScoringRubric, SectionKind, SectionRow, SectionScoreCalculator,
    SectionTotals,
};
use crate::ranking::service::DepartmentRankingService;

pub(super) fn year() -> AcademicYear {
    AcademicYear::starting(2024)
}

pub(super) fn department(id: i64, code: &str, name: &str, category: Category) -> Department {
    Department {
        id: DepartmentId(id),
        code: DepartmentCode(code.to_string()),
        name: name.to_string(),
        category,
    }
}

/// Rows that the default rubric sums to exactly `total`.
pub(super) fn rows_totalling(total: f64) -> Vec<SectionRow> {
    let rubric = ScoringRubric::default();
    let mut remaining = total;
    let mut rows = Vec::new();

    for section in SectionKind::ordered() {
        if remaining <= 0.0 {
            break;
        }
        let points = remaining.min(rubric.cap(section));
        rows.push(SectionRow {
            section,
            criterion: format!("section-{}", section.numeral()),
            points,
        });
        remaining -= points;
    }

    rows
}

pub(super) fn record(id: i64, auto_score: f64, expert_score: Option<f64>) -> DepartmentScoreRecord {
    let dept = department(id, &format!("D{id}"), &format!("Dept {id}"), Category::Sciences);
    DepartmentScoreRecord::new(&dept, ScoreResolution::from_scores(auto_score, expert_score))
}

/// In-memory collaborators with switchable failures and call counters.
#[derive(Default)]
pub(super) struct MemorySources {
    departments: Vec<Department>,
    rows: HashMap<(DepartmentId, AcademicYear), Vec<SectionRow>>,
    experts: HashMap<Category, ExpertId>,
    reviews: Vec<ExpertReview>,
    pub(super) fail_listing: bool,
    pub(super) fail_sections: bool,
    pub(super) fail_experts: bool,
    pub(super) fail_reviews: bool,
    section_fetches: AtomicUsize,
    expert_lookups: AtomicUsize,
}

impl MemorySources {
    /// Departments are listed in insertion order, standing in for the
    /// name-sorted order a real directory returns.
    pub(super) fn with_department(mut self, department: Department, auto_score: f64) -> Self {
        self.rows
            .insert((department.id, year()), rows_totalling(auto_score));
        self.departments.push(department);
        self
    }

    pub(super) fn with_expert(mut self, category: Category, expert: &str) -> Self {
        self.experts.insert(category, ExpertId(expert.to_string()));
        self
    }

    pub(super) fn with_review(mut self, expert: &str, id: i64, total: Option<f64>) -> Self {
        self.reviews.push(ExpertReview {
            expert_id: ExpertId(expert.to_string()),
            department_id: DepartmentId(id),
            academic_year: year(),
            total_score: total,
            remarks: None,
        });
        self
    }

    pub(super) fn section_fetches(&self) -> usize {
        self.section_fetches.load(Ordering::SeqCst)
    }

    pub(super) fn expert_lookups(&self) -> usize {
        self.expert_lookups.load(Ordering::SeqCst)
    }

    fn lookup(&self, key: &DepartmentKey) -> Option<&Department> {
        key.find_in(&self.departments)
    }
}

impl DepartmentDirectory for MemorySources {
    fn departments_in(&self, category: Category) -> Result<Vec<Department>, SourceError> {
        if self.fail_listing {
            return Err(SourceError::Unavailable("directory offline".to_string()));
        }
        Ok(self
            .departments
            .iter()
            .filter(|d| d.category == category)
            .cloned()
            .collect())
    }

    fn all_departments(&self) -> Result<Vec<Department>, SourceError> {
        if self.fail_listing {
            return Err(SourceError::Unavailable("directory offline".to_string()));
        }
        Ok(self.departments.clone())
    }

    fn find(&self, key: &DepartmentKey) -> Result<Option<Department>, SourceError> {
        Ok(self.lookup(key).cloned())
    }
}

impl SectionDataSource for MemorySources {
    fn fetch_section_data(
        &self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
    ) -> Result<Vec<SectionRow>, SourceError> {
        self.section_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_sections {
            return Err(SourceError::Unavailable("section tables locked".to_string()));
        }
        Ok(self
            .rows
            .get(&(department_id, academic_year.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

impl ExpertDirectory for MemorySources {
    fn find_expert_for_category(
        &self,
        category: Category,
    ) -> Result<Option<ExpertId>, SourceError> {
        self.expert_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_experts {
            return Err(SourceError::Unavailable("expert table missing".to_string()));
        }
        Ok(self.experts.get(&category).cloned())
    }

    fn find_expert_review(
        &self,
        expert_id: &ExpertId,
        department: &DepartmentKey,
        academic_year: &AcademicYear,
    ) -> Result<Option<ExpertReview>, SourceError> {
        if self.fail_reviews {
            return Err(SourceError::Inconsistent("review row unreadable".to_string()));
        }
        let Some(id) = self.lookup(department).map(|d| d.id) else {
            return Ok(None);
        };
        Ok(self
            .reviews
            .iter()
            .find(|r| {
                r.expert_id == *expert_id
                    && r.department_id == id
                    && r.academic_year == *academic_year
            })
            .cloned())
    }
}

/// Rubric calculator that counts how often it runs.
#[derive(Default)]
pub(super) struct CountingCalculator {
    inner: RubricCalculator,
    calls: AtomicUsize,
}

impl CountingCalculator {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SectionScoreCalculator for CountingCalculator {
    fn compute_section_totals(
        &self,
        department_id: DepartmentId,
        academic_year: &AcademicYear,
        rows: &[SectionRow],
    ) -> SectionTotals {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .compute_section_totals(department_id, academic_year, rows)
    }
}

/// Two sciences departments, two engineering departments and one humanities
/// department. Only sciences and engineering have experts; one engineering
/// review is still pending.
pub(super) fn campus_sources() -> MemorySources {
    MemorySources::default()
        .with_department(department(1, "CHEM", "Chemistry", Category::Sciences), 600.0)
        .with_department(department(2, "PHY", "Physics", Category::Sciences), 500.0)
        .with_department(
            department(3, "CIV", "Civil Engineering", Category::EngineeringAndTechnology),
            640.0,
        )
        .with_department(
            department(4, "CSE", "Computer Science", Category::EngineeringAndTechnology),
            420.0,
        )
        .with_department(department(5, "HIST", "History", Category::Humanities), 700.0)
        .with_expert(Category::Sciences, "exp-sci")
        .with_expert(Category::EngineeringAndTechnology, "exp-eng")
        .with_review("exp-sci", 2, Some(680.0))
        .with_review("exp-eng", 3, None)
        .with_review("exp-eng", 4, Some(50.0))
}

pub(super) fn build_service(
    sources: MemorySources,
) -> (
    DepartmentRankingService<MemorySources>,
    Arc<MemorySources>,
    Arc<CountingCalculator>,
) {
    let sources = Arc::new(sources);
    let calculator = Arc::new(CountingCalculator::default());
    let service = DepartmentRankingService::with_calculator(sources.clone(), calculator.clone());
    (service, sources, calculator)
}

pub(super) fn ranking_router_with_sources(sources: MemorySources) -> axum::Router {
    let (service, _, _) = build_service(sources);
    crate::ranking::router::ranking_router(Arc::new(service), year())
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
