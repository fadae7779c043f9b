use crate::infra::{load_dataset, parse_category, parse_year, DataOrigin};
use chrono::Local;
use clap::Args;
use dept_review::config::AppConfig;
use dept_review::dataset::PortalDataset;
use dept_review::error::AppError;
use dept_review::ranking::{
    AcademicYear, Category, DepartmentKey, DepartmentRankingService, DepartmentScoreRecord,
    DepartmentStanding, RankScope, RankingView, ScoringRubric,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Category slug (e.g. sciences, social-sciences); omit for the overall leaderboard
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Option<Category>,
    /// Academic year such as 2024-25 (defaults to APP_ACADEMIC_YEAR, then the current session)
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: Option<AcademicYear>,
    /// Directory holding the CSV review exports
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DepartmentArgs {
    /// Department id or code
    pub(crate) department: String,
    /// Academic year such as 2024-25
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: Option<AcademicYear>,
    /// Directory holding the CSV review exports
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Emit JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

fn build_service(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
    year: Option<AcademicYear>,
) -> Result<(DepartmentRankingService<PortalDataset>, AcademicYear, DataOrigin), AppError> {
    let academic_year =
        year.unwrap_or_else(|| config.portal.academic_year_on(Local::now().date_naive()));
    let (dataset, origin) = load_dataset(data_dir, &config.portal, &academic_year)?;
    let service = DepartmentRankingService::new(Arc::new(dataset), ScoringRubric::default());
    Ok((service, academic_year, origin))
}

pub(crate) fn run_ranking_report(config: &AppConfig, args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        category,
        year,
        data_dir,
        json,
    } = args;

    let (service, academic_year, origin) = build_service(config, data_dir, year)?;
    let view = match category {
        Some(category) => RankingView {
            departments: service.departments_with_scores(category, &academic_year),
            academic_year,
            scope: RankScope::Category,
            category: Some(category),
            category_label: Some(category.label()),
        },
        None => RankingView {
            departments: service.overall_ranking(&academic_year),
            academic_year,
            scope: RankScope::Overall,
            category: None,
            category_label: None,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let title = view.category_label.unwrap_or("Overall leaderboard");
    println!("{title} ({})", view.academic_year);
    if origin == DataOrigin::Demo {
        println!("(demo data)");
    }
    if view.departments.is_empty() {
        println!("  no departments to rank");
        return Ok(());
    }

    println!(
        "  {:>4}  {:<8} {:<34} {:>8} {:>8} {:>8}",
        "Rank", "Code", "Department", "Auto", "Expert", "Score"
    );
    for record in &view.departments {
        println!("  {}", render_row(record, view.scope));
    }

    Ok(())
}

pub(crate) fn run_department_report(
    config: &AppConfig,
    args: DepartmentArgs,
) -> Result<(), AppError> {
    let DepartmentArgs {
        department,
        year,
        data_dir,
        json,
    } = args;

    let (service, academic_year, _) = build_service(config, data_dir, year)?;
    let key = DepartmentKey::parse(&department)
        .ok_or_else(|| AppError::NotFound("empty department identifier".to_string()))?;

    let standing = service
        .department_standing(&key, &academic_year)
        .ok_or_else(|| AppError::NotFound(format!("department '{key}' for {academic_year}")))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&standing)?);
    } else {
        render_standing(&standing);
    }

    Ok(())
}

fn render_row(record: &DepartmentScoreRecord, scope: RankScope) -> String {
    let rank = match scope {
        RankScope::Category => record.rank,
        RankScope::Overall => record.overall_rank,
    };
    let expert = record
        .expert_score
        .map(|score| format!("{score:.1}"))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:>4}  {:<8} {:<34} {:>8.1} {:>8} {:>8.1}",
        rank.map(|r| r.to_string()).unwrap_or_default(),
        record.department_code.0,
        record.department_name,
        record.auto_score,
        expert,
        record.resolved_score,
    )
}

fn render_standing(standing: &DepartmentStanding) {
    let record = &standing.record;
    println!(
        "{} ({}) - {} {}",
        record.department_name,
        record.department_code,
        standing.category_label,
        standing.academic_year
    );

    let position = |rank: Option<u32>, of: usize| match rank {
        Some(rank) => format!("{rank} of {of}"),
        None => "unranked".to_string(),
    };
    println!(
        "  Category rank: {}",
        position(record.rank, standing.category_size)
    );
    println!(
        "  Overall rank:  {}",
        position(record.overall_rank, standing.overall_size)
    );

    let source = if record.has_expert_score {
        "expert review"
    } else {
        "automatic calculation"
    };
    println!("  Score: {:.1} ({source})", record.resolved_score);
    println!("  Automatic total: {:.1}", record.auto_score);

    for section in &standing.sections {
        println!("    {:<28} {:>7.1}", section.section_label, section.score);
    }
}
