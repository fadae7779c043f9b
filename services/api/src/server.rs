use crate::cli::ServeArgs;
use crate::infra::{load_dataset, AppState};
use crate::routes::with_ranking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use dept_review::config::AppConfig;
use dept_review::error::AppError;
use dept_review::ranking::{DepartmentRankingService, ScoringRubric};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let default_year = config.portal.academic_year_on(Local::now().date_naive());
    let (dataset, origin) = load_dataset(args.data_dir.take(), &config.portal, &default_year)?;
    info!(
        departments = dataset.departments().len(),
        ?origin,
        year = %default_year,
        "review data loaded"
    );

    let ranking_service = Arc::new(DepartmentRankingService::new(
        Arc::new(dataset),
        ScoringRubric::default(),
    ));

    let app = with_ranking_routes(ranking_service, default_year)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "department ranking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
