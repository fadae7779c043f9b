use crate::report::{run_department_report, run_ranking_report, DepartmentArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dept_review::config::AppConfig;
use dept_review::error::AppError;
use dept_review::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Departmental Review Rankings",
    about = "Serve and inspect departmental review rankings from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a category ranking, or the overall leaderboard when no category is given
    Rank(RankArgs),
    /// Print the standing and section breakdown of one department
    Department(DepartmentArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding the CSV review exports (defaults to APP_DATA_DIR, then demo data)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Rank(args) => run_ranking_report(&config, args),
        Command::Department(args) => run_department_report(&config, args),
    }
}
