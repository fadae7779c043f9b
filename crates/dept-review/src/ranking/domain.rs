use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Month in which a new academic year begins.
const ACADEMIC_YEAR_START_MONTH: u32 = 7;

/// Stable numeric identifier used by the department tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartmentId(pub i64);

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display code for a department, e.g. `PHY` or `CSE-01`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentCode(pub String);

impl fmt::Display for DepartmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Either identifier a source table may use for the same department.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepartmentKey {
    Id(DepartmentId),
    Code(DepartmentCode),
    /// All-digit text, which may be an id or a numeric code.
    Numeric {
        id: DepartmentId,
        code: DepartmentCode,
    },
}

impl DepartmentKey {
    /// Key for free text such as a URL segment or an import cell.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let code = DepartmentCode(trimmed.to_string());
        if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<i64>() {
                return Some(Self::Numeric {
                    id: DepartmentId(id),
                    code,
                });
            }
        }

        Some(Self::Code(code))
    }

    /// True when this key names `department` by id or by code.
    pub fn matches(&self, department: &Department) -> bool {
        match self {
            DepartmentKey::Id(id) => department.id == *id,
            DepartmentKey::Code(code) => department.code.0.eq_ignore_ascii_case(&code.0),
            DepartmentKey::Numeric { id, code } => {
                department.id == *id || department.code.0.eq_ignore_ascii_case(&code.0)
            }
        }
    }

    /// Department this key names; numeric text prefers the id match.
    pub fn find_in<'a>(&self, departments: &'a [Department]) -> Option<&'a Department> {
        match self {
            DepartmentKey::Numeric { id, .. } => departments
                .iter()
                .find(|department| department.id == *id)
                .or_else(|| departments.iter().find(|department| self.matches(department))),
            _ => departments.iter().find(|department| self.matches(department)),
        }
    }

    /// For numeric text that is one department's id and another's code,
    /// the `(by_id, by_code)` pair.
    pub fn conflict_in<'a>(
        &self,
        departments: &'a [Department],
    ) -> Option<(&'a Department, &'a Department)> {
        let DepartmentKey::Numeric { id, code } = self else {
            return None;
        };

        let by_id = departments.iter().find(|department| department.id == *id)?;
        let by_code = departments.iter().find(|department| {
            department.id != by_id.id && department.code.0.eq_ignore_ascii_case(&code.0)
        })?;
        Some((by_id, by_code))
    }
}

impl From<DepartmentId> for DepartmentKey {
    fn from(value: DepartmentId) -> Self {
        Self::Id(value)
    }
}

impl From<DepartmentCode> for DepartmentKey {
    fn from(value: DepartmentCode) -> Self {
        Self::Code(value)
    }
}

impl fmt::Display for DepartmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartmentKey::Id(id) => write!(f, "{id}"),
            DepartmentKey::Code(code) | DepartmentKey::Numeric { code, .. } => {
                write!(f, "{code}")
            }
        }
    }
}

/// The six fixed review categories a department belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "sciences")]
    Sciences,
    #[serde(rename = "engineering")]
    EngineeringAndTechnology,
    #[serde(rename = "humanities")]
    Humanities,
    #[serde(rename = "social-sciences")]
    SocialSciences,
    #[serde(rename = "commerce")]
    CommerceAndManagement,
    #[serde(rename = "professional")]
    ProfessionalStudies,
}

impl Category {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Sciences,
            Self::EngineeringAndTechnology,
            Self::Humanities,
            Self::SocialSciences,
            Self::CommerceAndManagement,
            Self::ProfessionalStudies,
        ]
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Sciences => "sciences",
            Self::EngineeringAndTechnology => "engineering",
            Self::Humanities => "humanities",
            Self::SocialSciences => "social-sciences",
            Self::CommerceAndManagement => "commerce",
            Self::ProfessionalStudies => "professional",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sciences => "Sciences",
            Self::EngineeringAndTechnology => "Engineering & Technology",
            Self::Humanities => "Humanities",
            Self::SocialSciences => "Social Sciences",
            Self::CommerceAndManagement => "Commerce & Management",
            Self::ProfessionalStudies => "Professional Studies",
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| {
                category.slug().eq_ignore_ascii_case(needle)
                    || category.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| DomainError::UnknownCategory(needle.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Academic session written as `YYYY-YY`, e.g. `2024-25`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcademicYear {
    start: i32,
}

impl AcademicYear {
    pub fn starting(start: i32) -> Self {
        Self { start }
    }

    /// Academic year in progress on `date`; sessions begin in July.
    pub fn containing(date: NaiveDate) -> Self {
        let start = if date.month() >= ACADEMIC_YEAR_START_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start }
    }

    pub fn start_year(&self) -> i32 {
        self.start
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let invalid = || DomainError::InvalidAcademicYear(trimmed.to_string());

        let (first, second) = trimmed.split_once('-').ok_or_else(invalid)?;
        if first.len() != 4 || second.len() != 2 {
            return Err(invalid());
        }

        let start: i32 = first.parse().map_err(|_| invalid())?;
        let end: i32 = second.parse().map_err(|_| invalid())?;
        if (start + 1).rem_euclid(100) != end {
            return Err(invalid());
        }

        Ok(Self { start })
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start, (self.start + 1).rem_euclid(100))
    }
}

impl FromStr for AcademicYear {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for AcademicYear {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AcademicYear> for String {
    fn from(value: AcademicYear) -> Self {
        value.to_string()
    }
}

/// Directory row describing one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub code: DepartmentCode,
    pub name: String,
    pub category: Category,
}

impl Department {
    pub fn key(&self) -> DepartmentKey {
        DepartmentKey::Id(self.id)
    }
}

/// Identifier of the subject-matter expert assigned to a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpertId(pub String);

impl fmt::Display for ExpertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Consolidated review recorded by an expert for one department and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertReview {
    pub expert_id: ExpertId,
    pub department_id: DepartmentId,
    pub academic_year: AcademicYear,
    pub total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ExpertReview {
    /// Consolidated total, only when one has actually been recorded.
    pub fn present_total(&self) -> Option<f64> {
        self.total_score.filter(|score| score.is_finite())
    }
}

/// Output row consumed by the dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentScoreRecord {
    pub department_id: DepartmentId,
    pub department_code: DepartmentCode,
    pub department_name: String,
    pub category: Category,
    pub auto_score: f64,
    pub expert_score: Option<f64>,
    pub resolved_score: f64,
    pub has_expert_score: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_rank: Option<u32>,
}

impl DepartmentScoreRecord {
    pub fn new(department: &Department, resolution: ScoreResolution) -> Self {
        Self {
            department_id: department.id,
            department_code: department.code.clone(),
            department_name: department.name.clone(),
            category: department.category,
            auto_score: resolution.auto_score,
            expert_score: resolution.expert_score,
            resolved_score: resolution.resolved_score,
            has_expert_score: resolution.has_expert_score,
            rank: None,
            overall_rank: None,
        }
    }
}

/// Score fragment produced by the resolver for a single department.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResolution {
    pub auto_score: f64,
    pub expert_score: Option<f64>,
    pub resolved_score: f64,
    pub has_expert_score: bool,
}

impl ScoreResolution {
    /// Expert total wins whenever one is present.
    pub fn from_scores(auto_score: f64, expert_score: Option<f64>) -> Self {
        match expert_score {
            Some(expert) => Self {
                auto_score,
                expert_score: Some(expert),
                resolved_score: expert,
                has_expert_score: true,
            },
            None => Self {
                auto_score,
                expert_score: None,
                resolved_score: auto_score,
                has_expert_score: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("unknown department category '{0}'")]
    UnknownCategory(String),
    #[error("academic year '{0}' must look like 2024-25")]
    InvalidAcademicYear(String),
    #[error("unknown scoring section '{0}'")]
    UnknownSection(String),
}
