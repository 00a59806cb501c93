use crate::report::{
    run_evolution_report, run_monthly_report, run_ranking_report, EvolutionReportArgs,
    MonthlyReportArgs, RankingReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use commission_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Commission Engine",
    about = "Compute sales bonuses from logged transactions, or serve the calculators over HTTP",
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
    /// Print bonus reports from CSV exports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Bonus breakdown for one month, for one seller or everyone
    Monthly(MonthlyReportArgs),
    /// Month, quarter and year totals with month-over-month change for one seller
    Evolution(EvolutionReportArgs),
    /// Sellers ordered by bonus for a month, quarter or year
    Ranking(RankingReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report { command } => match command {
            ReportCommand::Monthly(args) => run_monthly_report(args),
            ReportCommand::Evolution(args) => run_evolution_report(args),
            ReportCommand::Ranking(args) => run_ranking_report(args),
        },
    }
}
