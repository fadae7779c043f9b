//! Department score resolution and ranking for the review dashboards.
//!
//! Scores flow one way: raw section rows feed the section calculator, the
//! resolver picks the authoritative score for each department, and the
//! engine orders the results and assigns ranks. Every pass recomputes from
//! the injected data sources; nothing is cached between requests.

pub mod domain;
pub mod engine;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod sections;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AcademicYear, Category, Department, DepartmentCode, DepartmentId, DepartmentKey,
    DepartmentScoreRecord, DomainError, ExpertId, ExpertReview, ScoreResolution,
};
pub use engine::{rank, rank_json, RankScope, ScoreInput};
pub use repository::{
    DepartmentDirectory, ExpertDirectory, ReviewDataSource, SectionDataSource, SourceError,
};
pub use resolver::ScoreResolver;
pub use router::{ranking_router, RankingView};
pub use sections::{
    RubricCalculator, ScoringRubric, SectionKind, SectionRow, SectionScoreCalculator,
    SectionSubtotalView, SectionTotals,
};
pub use service::{DepartmentRankingService, DepartmentStanding};
