use crate::infra::{
    format_currency, format_percentage, load_default_settings, parse_month_arg,
    parse_period_arg, resolve_engine,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use commission_engine::bonus::period::first_day_of_month;
use commission_engine::bonus::{
    BonusEngine, MonthlyReport, PeriodBonus, RankingEntry, RankingPeriod, Scope,
    TransactionRecord, UserEvolution, UserId,
};
use commission_engine::config::AppConfig;
use commission_engine::error::AppError;
use commission_engine::import::TransactionImporter;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SourceArgs {
    /// Transactions CSV export
    #[arg(long)]
    pub(crate) transactions: PathBuf,
    /// Key/value settings CSV (defaults to APP_SETTINGS_CSV, then built-in rates)
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,
    /// Reference month (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = parse_month_arg)]
    pub(crate) month: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct MonthlyReportArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Restrict the report to one seller (everyone when omitted)
    #[arg(long)]
    pub(crate) user: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct EvolutionReportArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Seller to report on
    #[arg(long)]
    pub(crate) user: String,
}

#[derive(Args, Debug)]
pub(crate) struct RankingReportArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// month, quarter or year
    #[arg(long, value_parser = parse_period_arg, default_value = "month")]
    pub(crate) period: RankingPeriod,
}

struct LoadedSource {
    engine: BonusEngine,
    records: Vec<TransactionRecord>,
    month: NaiveDate,
}

fn load_source(args: SourceArgs) -> Result<LoadedSource, AppError> {
    let SourceArgs {
        transactions,
        settings,
        month,
    } = args;

    let settings_path = match settings {
        Some(path) => Some(path),
        None => AppConfig::load()?.rates.settings_csv,
    };
    let settings = load_default_settings(settings_path.as_deref())?;
    let engine = resolve_engine(&settings, &BTreeMap::new())?;
    let records = TransactionImporter::from_path(&transactions)?;
    let month = month.unwrap_or_else(|| first_day_of_month(Local::now().date_naive()));

    info!(
        records = records.len(),
        path = %transactions.display(),
        "transactions imported"
    );

    Ok(LoadedSource {
        engine,
        records,
        month,
    })
}

pub(crate) fn run_monthly_report(args: MonthlyReportArgs) -> Result<(), AppError> {
    let source = load_source(args.source)?;
    let scope = match args.user {
        Some(user) => Scope::User(UserId(user)),
        None => Scope::AllUsers,
    };

    let report = source
        .engine
        .monthly_report(&source.records, source.month, &scope);
    print!("{}", render_monthly_report(&report, &scope));
    Ok(())
}

pub(crate) fn run_evolution_report(args: EvolutionReportArgs) -> Result<(), AppError> {
    let source = load_source(args.source)?;
    let evolution = source
        .engine
        .evolution(&source.records, &UserId(args.user), source.month);
    print!("{}", render_evolution(&evolution));
    Ok(())
}

pub(crate) fn run_ranking_report(args: RankingReportArgs) -> Result<(), AppError> {
    let source = load_source(args.source)?;
    let entries = source
        .engine
        .ranking(&source.records, source.month, args.period);
    print!(
        "{}",
        render_ranking(args.period, source.month, &entries)
    );
    Ok(())
}

// Writes into a String are infallible.

pub(crate) fn render_monthly_report(report: &MonthlyReport, scope: &Scope) -> String {
    let mut out = String::new();
    let who = match scope {
        Scope::User(user) => user.to_string(),
        Scope::AllUsers => "all sellers".to_string(),
    };

    let _ = writeln!(
        out,
        "Monthly bonus for {} ({} -> {})",
        who, report.summary.range.start, report.summary.range.end
    );
    let _ = writeln!(out, "Records considered: {}", report.summary.record_count);

    let registration = &report.registration;
    let _ = writeln!(out, "\nRegistrations ({})", registration.multiplier_label);
    let _ = writeln!(
        out,
        "- Cash: {} x {} = {}",
        registration.quantities.cash,
        format_currency(registration.cash_rate),
        format_currency(registration.subtotals.cash)
    );
    let _ = writeln!(
        out,
        "- Installment: {} = {}",
        registration.quantities.installment,
        format_currency(registration.subtotals.installment)
    );
    let _ = writeln!(
        out,
        "- Promotional: {} = {}",
        registration.quantities.promotional,
        format_currency(registration.subtotals.promotional)
    );
    if registration.goal_reached {
        let _ = writeln!(out, "- Goal of {} reached", registration.goal_quantity);
    } else {
        let _ = writeln!(
            out,
            "- {} cash registrations missing for the goal of {}",
            registration.missing_for_goal, registration.goal_quantity
        );
    }
    let _ = writeln!(out, "- Subtotal: {}", format_currency(registration.total));

    let publication = &report.publication;
    let _ = writeln!(out, "\nPublications");
    let _ = writeln!(
        out,
        "- Cash: {} = {}",
        publication.quantities.cash,
        format_currency(publication.subtotals.cash)
    );
    let _ = writeln!(
        out,
        "- Installment: {} = {}",
        publication.quantities.installment,
        format_currency(publication.subtotals.installment)
    );
    let _ = writeln!(
        out,
        "- Promotional: {} = {}",
        publication.quantities.promotional,
        format_currency(publication.subtotals.promotional)
    );
    let _ = writeln!(out, "- Subtotal: {}", format_currency(publication.total));

    let debtor = &report.debtor;
    let _ = writeln!(out, "\nDebtor collections");
    let _ = writeln!(
        out,
        "- Resolved: {} over {} installments ({} each, tier {})",
        format_currency(debtor.resolved_amount),
        debtor.paid_installments,
        format_currency(debtor.per_installment),
        debtor.tier_label
    );
    let _ = writeln!(out, "- Subtotal: {}", format_currency(debtor.total));

    let _ = writeln!(out, "\nTotal bonus: {}", format_currency(report.total));
    out
}

fn period_line(label: &str, bonus: &PeriodBonus) -> String {
    format!(
        "- {}: {} (registrations {}, publications {})",
        label,
        format_currency(bonus.total),
        format_currency(bonus.registration),
        format_currency(bonus.publication)
    )
}

pub(crate) fn render_evolution(evolution: &UserEvolution) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Bonus evolution for {} (reference {})",
        evolution.user_id,
        evolution.reference_month.format("%Y-%m")
    );
    let _ = writeln!(out, "{}", period_line("Month", &evolution.month));
    let _ = writeln!(
        out,
        "{}",
        period_line("Previous month", &evolution.previous_month)
    );
    let _ = writeln!(out, "{}", period_line("Quarter", &evolution.quarter));
    let _ = writeln!(out, "{}", period_line("Year to date", &evolution.year));
    let _ = writeln!(
        out,
        "Change vs previous month: {}",
        format_percentage(evolution.evolution_pct)
    );

    if !evolution.history.is_empty() {
        let _ = writeln!(out, "\nHistory");
        for month in &evolution.history {
            let _ = writeln!(
                out,
                "- {}: {}",
                month.month.format("%Y-%m"),
                format_currency(month.total)
            );
        }
    }
    out
}

pub(crate) fn render_ranking(
    period: RankingPeriod,
    reference: NaiveDate,
    entries: &[RankingEntry],
) -> String {
    let mut out = String::new();
    let range = period.range(reference);
    let _ = writeln!(
        out,
        "Ranking by bonus, {} ({} -> {})",
        period.label(),
        range.start,
        range.end
    );

    if entries.is_empty() {
        let _ = writeln!(out, "No sellers found");
    }
    for entry in entries {
        let _ = writeln!(
            out,
            "{}. {}: {}",
            entry.position,
            entry.user_id,
            format_currency(entry.bonus.total)
        );
    }
    out
}
