use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::domain::{
    Category, DepartmentCode, DepartmentId, DepartmentScoreRecord, ScoreResolution,
};

/// Which rank field a ranking pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankScope {
    /// Departments of one category; writes `rank`.
    #[default]
    Category,
    /// Departments across every category; writes `overall_rank`.
    Overall,
}

/// Order records and assign sequential ranks starting at 1.
///
/// Expert-scored records come before all others, then `resolved_score`
/// descending. The sort is stable, so equal scores keep their input order
/// and still receive distinct consecutive ranks.
pub fn rank(
    mut records: Vec<DepartmentScoreRecord>,
    scope: RankScope,
) -> Vec<DepartmentScoreRecord> {
    records.sort_by(compare_standing);

    for (position, record) in records.iter_mut().enumerate() {
        let assigned = Some(position as u32 + 1);
        match scope {
            RankScope::Category => record.rank = assigned,
            RankScope::Overall => record.overall_rank = assigned,
        }
    }

    records
}

fn compare_standing(a: &DepartmentScoreRecord, b: &DepartmentScoreRecord) -> Ordering {
    b.has_expert_score
        .cmp(&a.has_expert_score)
        .then_with(|| b.resolved_score.total_cmp(&a.resolved_score))
}

/// Externally supplied row, before derived fields are computed.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreInput {
    pub department_id: DepartmentId,
    pub department_code: DepartmentCode,
    pub department_name: String,
    pub category: Category,
    pub auto_score: f64,
    #[serde(default)]
    pub expert_score: Option<f64>,
}

impl ScoreInput {
    fn into_record(self) -> Option<DepartmentScoreRecord> {
        if !self.auto_score.is_finite() {
            return None;
        }
        if matches!(self.expert_score, Some(score) if !score.is_finite()) {
            return None;
        }

        let resolution = ScoreResolution::from_scores(self.auto_score, self.expert_score);
        Some(DepartmentScoreRecord {
            department_id: self.department_id,
            department_code: self.department_code,
            department_name: self.department_name,
            category: self.category,
            auto_score: resolution.auto_score,
            expert_score: resolution.expert_score,
            resolved_score: resolution.resolved_score,
            has_expert_score: resolution.has_expert_score,
            rank: None,
            overall_rank: None,
        })
    }
}

/// Rank an untyped JSON payload, skipping entries that are not usable records.
///
/// Anything other than an array ranks as empty. Derived fields in the
/// payload are ignored and recomputed from `auto_score`/`expert_score`.
pub fn rank_json(payload: &Value, scope: RankScope) -> Vec<DepartmentScoreRecord> {
    let Some(entries) = payload.as_array() else {
        warn!("ranking payload is not an array; returning empty ranking");
        return Vec::new();
    };

    let records = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let parsed = ScoreInput::deserialize(entry)
                .map_err(|err| err.to_string())
                .and_then(|input| {
                    input
                        .into_record()
                        .ok_or_else(|| "non-finite score".to_string())
                });
            match parsed {
                Ok(record) => Some(record),
                Err(reason) => {
                    warn!(index, %reason, "skipping malformed ranking entry");
                    None
                }
            }
        })
        .collect();

    rank(records, scope)
}
