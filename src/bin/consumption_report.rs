use chrono::NaiveDate;
use clap::Parser;
use fuel_dashboard_service::analysis::{self, FilterCriteria};
use fuel_dashboard_service::importers::load_dataset_from_path;
use fuel_dashboard_service::models::{
    CategoryChart, ConsumptionRanking, DashboardView, MonthlyChart, SourceView,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "consumption-report")]
#[command(about = "Print fuel consumption tables for a refueling workbook", long_about = None)]
struct Cli {
    /// Path to the workbook (needs an internal and an external sheet)
    #[arg(long, env = "WORKBOOK_PATH")]
    file: PathBuf,

    /// First day of the period (YYYY-MM-DD, inclusive)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the period (YYYY-MM-DD, inclusive)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Vehicle plate, or "all"
    #[arg(long, default_value = "all")]
    plate: String,

    /// Fuel type, or "all"
    #[arg(long, default_value = "all")]
    fuel_type: String,

    /// Number of vehicles in each consumption ranking
    #[arg(long, env = "RANKING_SIZE", default_value_t = analysis::DEFAULT_RANKING_SIZE)]
    top: usize,

    /// Print the dashboard as JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_bounds(self.start, self.end, &self.plate, &self.fuel_type)
    }
}

fn print_monthly(chart: &MonthlyChart) {
    println!("\n  By month");
    if let Some(notice) = &chart.notice {
        println!("    {notice}");
        return;
    }
    println!(
        "    {:<8} {:>12} {:>14} {:>12}",
        "Month", "Liters", "Value (R$)", "Avg R$/l"
    );
    for point in &chart.points {
        let unit = point
            .average_unit_value
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    {:<8} {:>12.2} {:>14.2} {:>12}",
            point.month, point.liters, point.total_value, unit
        );
    }
}

fn print_categories(title: &str, chart: &CategoryChart) {
    println!("\n  {title}");
    if let Some(notice) = &chart.notice {
        println!("    {notice}");
        return;
    }
    println!("    {:<16} {:>12} {:>14}", "", "Liters", "Value (R$)");
    for point in &chart.points {
        println!(
            "    {:<16} {:>12.2} {:>14.2}",
            point.label, point.liters, point.total_value
        );
    }
}

fn print_ranking(ranking: &ConsumptionRanking) {
    println!("\n  Best average consumption");
    if let Some(notice) = &ranking.notice {
        println!("    {notice}");
        return;
    }
    println!(
        "    {:<4} {:<12} {:<12} {:>8} {:>12} {:>10}",
        "#", "Plate", "Fuel", "km/l", "Distance", "Liters"
    );
    for (i, entry) in ranking.entries.iter().enumerate() {
        println!(
            "    {:<4} {:<12} {:<12} {:>8.2} {:>12.1} {:>10.2}",
            i + 1,
            entry.plate,
            entry.fuel_type,
            entry.average_km_per_liter,
            entry.total_distance_km,
            entry.total_liters
        );
    }
}

fn print_source(view: &SourceView) {
    println!("\n{}", "=".repeat(72));
    println!("{} refueling", view.source.as_str().to_uppercase());
    println!("{}", "=".repeat(72));
    print_monthly(&view.monthly);
    print_categories("By vehicle", &view.by_vehicle);
    print_categories("By fuel type", &view.by_fuel_type);
    print_ranking(&view.consumption_top);
}

fn print_dashboard(view: &DashboardView) {
    for warning in &view.warnings {
        println!("WARNING: {warning}");
    }

    let metrics = &view.metrics;
    println!("\nTotals");
    println!(
        "  Internal: {:>12.2} l   R$ {:>14.2}   ({} records)",
        metrics.internal.total_liters, metrics.internal.total_value, metrics.internal.records
    );
    println!(
        "  External: {:>12.2} l   R$ {:>14.2}   ({} records)",
        metrics.external.total_liters, metrics.external.total_value, metrics.external.records
    );

    print_source(&view.internal);
    print_source(&view.external);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let dataset = load_dataset_from_path(&cli.file)?;
    info!(
        "Loaded {} ({} internal, {} external records)",
        dataset.file_name,
        dataset.internal.len(),
        dataset.external.len()
    );

    let view = analysis::build_dashboard(&dataset, &cli.criteria(), cli.top);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("Workbook: {}", dataset.file_name);
        for stats in [&dataset.internal_stats, &dataset.external_stats] {
            println!(
                "  sheet '{}': {} rows read, {} kept, {} dropped",
                stats.sheet_name, stats.rows_read, stats.rows_kept, stats.rows_dropped
            );
        }
        print_dashboard(&view);
    }

    Ok(())
}
