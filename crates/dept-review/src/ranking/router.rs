use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{AcademicYear, Category, DepartmentKey, DepartmentScoreRecord};
use super::engine::{rank_json, RankScope};
use super::repository::ReviewDataSource;
use super::service::DepartmentRankingService;

/// Shared state behind the ranking routes.
pub struct RankingState<R> {
    pub service: Arc<DepartmentRankingService<R>>,
    pub default_year: AcademicYear,
}

impl<R> Clone for RankingState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            default_year: self.default_year.clone(),
        }
    }
}

/// Router builder exposing the dashboards' ranking endpoints.
pub fn ranking_router<R>(
    service: Arc<DepartmentRankingService<R>>,
    default_year: AcademicYear,
) -> Router
where
    R: ReviewDataSource + 'static,
{
    Router::new()
        .route("/api/v1/rankings/overall", get(overall_handler::<R>))
        .route(
            "/api/v1/rankings/categories/:category",
            get(category_handler::<R>),
        )
        .route("/api/v1/rankings/rank", post(rank_handler))
        .route("/api/v1/departments/:department", get(department_handler::<R>))
        .with_state(RankingState {
            service,
            default_year,
        })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct YearQuery {
    #[serde(default)]
    pub(crate) year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScopeQuery {
    #[serde(default)]
    pub(crate) scope: Option<RankScope>,
}

/// Ranked listing as returned by the ranking endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub academic_year: AcademicYear,
    pub scope: RankScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_label: Option<&'static str>,
    pub departments: Vec<DepartmentScoreRecord>,
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message }))).into_response()
}

fn requested_year(
    query: &YearQuery,
    default_year: &AcademicYear,
) -> Result<AcademicYear, Response> {
    match query.year.as_deref().map(str::trim) {
        None | Some("") => Ok(default_year.clone()),
        Some(raw) => AcademicYear::parse(raw).map_err(|err| bad_request(err.to_string())),
    }
}

pub(crate) async fn overall_handler<R>(
    State(state): State<RankingState<R>>,
    Query(query): Query<YearQuery>,
) -> Response
where
    R: ReviewDataSource + 'static,
{
    let academic_year = match requested_year(&query, &state.default_year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    let departments = state.service.overall_ranking(&academic_year);
    let view = RankingView {
        academic_year,
        scope: RankScope::Overall,
        category: None,
        category_label: None,
        departments,
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn category_handler<R>(
    State(state): State<RankingState<R>>,
    Path(category): Path<String>,
    Query(query): Query<YearQuery>,
) -> Response
where
    R: ReviewDataSource + 'static,
{
    let category: Category = match category.parse() {
        Ok(category) => category,
        Err(err) => return bad_request(err.to_string()),
    };
    let academic_year = match requested_year(&query, &state.default_year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    let departments = state
        .service
        .departments_with_scores(category, &academic_year);
    let view = RankingView {
        academic_year,
        scope: RankScope::Category,
        category: Some(category),
        category_label: Some(category.label()),
        departments,
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn department_handler<R>(
    State(state): State<RankingState<R>>,
    Path(department): Path<String>,
    Query(query): Query<YearQuery>,
) -> Response
where
    R: ReviewDataSource + 'static,
{
    let Some(key) = DepartmentKey::parse(&department) else {
        return bad_request("department identifier must not be empty".to_string());
    };
    let academic_year = match requested_year(&query, &state.default_year) {
        Ok(year) => year,
        Err(response) => return response,
    };

    match state.service.department_standing(&key, &academic_year) {
        Some(standing) => (StatusCode::OK, axum::Json(standing)).into_response(),
        None => {
            let payload = json!({
                "error": format!("department '{key}' not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn rank_handler(
    Query(query): Query<ScopeQuery>,
    axum::Json(payload): axum::Json<Value>,
) -> Response {
    let scope = query.scope.unwrap_or_default();
    let departments = rank_json(&payload, scope);
    (
        StatusCode::OK,
        axum::Json(json!({
            "scope": scope,
            "departments": departments,
        })),
    )
        .into_response()
}
