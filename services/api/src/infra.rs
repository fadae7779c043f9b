use crate::demo::demo_dataset;
use dept_review::config::PortalConfig;
use dept_review::dataset::PortalDataset;
use dept_review::error::AppError;
use dept_review::ranking::{AcademicYear, Category};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DataOrigin {
    Exports,
    Demo,
}

/// Load the CSV exports, or the built-in demo data when no directory is set.
pub(crate) fn load_dataset(
    data_dir: Option<PathBuf>,
    portal: &PortalConfig,
    academic_year: &AcademicYear,
) -> Result<(PortalDataset, DataOrigin), AppError> {
    match data_dir.or_else(|| portal.data_dir.clone()) {
        Some(dir) => Ok((PortalDataset::load_dir(dir)?, DataOrigin::Exports)),
        None => {
            info!(year = %academic_year, "no data directory configured; using demo dataset");
            Ok((demo_dataset(academic_year)?, DataOrigin::Demo))
        }
    }
}

pub(crate) fn parse_year(raw: &str) -> Result<AcademicYear, String> {
    AcademicYear::parse(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_category(raw: &str) -> Result<Category, String> {
    raw.parse::<Category>().map_err(|err| {
        let known: Vec<_> = Category::ordered().iter().map(|c| c.slug()).collect();
        format!("{err} (expected one of: {})", known.join(", "))
    })
}
