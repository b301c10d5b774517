//! Cohort Projection CLI
//!
//! Loads the input tables, runs the three-period projection and writes the result

use anyhow::{bail, Context};
use clap::Parser;
use cohort_projection::economic::{economic_score, EconomicIndicators, EconomicWeights};
use cohort_projection::projection::{project_with, ProjectionConfig, ProjectionResult};
use cohort_projection::ProjectionInputs;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cohort_projection")]
#[command(about = "Project population by age group and sex across three reference years")]
struct Args {
    /// Directory holding population/fertility/survival/sex_ratio/migration/coefficient CSVs
    #[arg(short, long, default_value = "data/inputs")]
    input_dir: PathBuf,

    /// Start year (defaults to the first year of the sex ratio table)
    #[arg(long)]
    start_year: Option<u32>,

    /// Base year (defaults to the second year of the sex ratio table)
    #[arg(long)]
    base_year: Option<u32>,

    /// Target year (defaults to the third year of the sex ratio table)
    #[arg(long)]
    target_year: Option<u32>,

    /// Override the migration adjustment coefficient from coefficient.csv
    #[arg(short, long)]
    coefficient: Option<f64>,

    /// Accept a coefficient outside [0.0, 2.0] instead of rejecting it
    #[arg(long)]
    permissive: bool,

    /// Result CSV path
    #[arg(short, long, default_value = "population_projection.csv")]
    output: PathBuf,

    /// Print the full result as JSON instead of the summary table
    #[arg(long)]
    json: bool,

    /// Print a text bar chart of the rows tagged with this year
    #[arg(long)]
    chart_year: Option<u32>,

    /// Labour force ratio in percent, for the economic score
    #[arg(long, default_value_t = 60.0)]
    labor_ratio: f64,

    /// Annual income (millions), for the economic score
    #[arg(long, default_value_t = 200.0)]
    income: f64,

    /// Annual visitors (thousands), for the economic score
    #[arg(long, default_value_t = 50.0)]
    visitors: f64,

    /// Economic score weight A (labour force ratio)
    #[arg(long, default_value_t = 0.382)]
    weight_labor: f64,

    /// Economic score weight B (income)
    #[arg(long, default_value_t = 0.271)]
    weight_income: f64,

    /// Economic score weight C (visitors)
    #[arg(long, default_value_t = 0.271)]
    weight_visitors: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut inputs = ProjectionInputs::from_csv_path(&args.input_dir)
        .with_context(|| format!("loading tables from {}", args.input_dir.display()))?;
    if let Some(coefficient) = args.coefficient {
        inputs.coefficient = coefficient;
    }

    let years = resolve_years(&args, &inputs)?;
    let mut config = ProjectionConfig::new(years);
    if args.permissive {
        config = config.permissive();
    }

    let result = project_with(&inputs, &config).context("projection failed")?;

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    result.write_csv(BufWriter::new(file))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_summary(&result);
    println!("\nFull results written to: {}", args.output.display());

    if let Some(year) = args.chart_year {
        print_chart(&result, year);
    }

    let indicators = EconomicIndicators {
        labor_ratio_pct: args.labor_ratio,
        annual_income: args.income,
        annual_visitors: args.visitors,
    };
    let weights = EconomicWeights {
        labor_ratio: args.weight_labor,
        income: args.weight_income,
        visitors: args.weight_visitors,
    };
    let score = economic_score(&indicators, &weights)?;
    println!("\nEconomic effect score: {:.2}", score);

    Ok(())
}

/// Explicit year flags win; missing ones fall back to the sex ratio table order
fn resolve_years(args: &Args, inputs: &ProjectionInputs) -> anyhow::Result<[u32; 3]> {
    let defaults = inputs.default_years();
    let pick = |flag: Option<u32>, slot: usize, name: &str| -> anyhow::Result<u32> {
        match (flag, defaults) {
            (Some(year), _) => Ok(year),
            (None, Some(years)) => Ok(years[slot]),
            (None, None) => bail!(
                "--{} is required: sex ratio table lists fewer than three years",
                name
            ),
        }
    };

    Ok([
        pick(args.start_year, 0, "start-year")?,
        pick(args.base_year, 1, "base-year")?,
        pick(args.target_year, 2, "target-year")?,
    ])
}

fn print_summary(result: &ProjectionResult) {
    println!("Cohort Projection v0.1.0");
    println!("========================\n");
    println!(
        "Years: start {} / base {} / target {}   Coefficient: {:.2}\n",
        result.years[0], result.years[1], result.years[2], result.coefficient
    );

    println!(
        "{:>6} {:>6} {:>6} {:>12} {:>12} {:>12} {:>10} {:>10}",
        "Period", "Rates", "Tag", "Male", "Female", "Total", "Births", "AgedOut"
    );
    println!("{}", "-".repeat(82));
    for period in &result.periods {
        println!(
            "{:>6} {:>6} {:>6} {:>12} {:>12} {:>12} {:>10} {:>10}",
            period.period,
            period.rate_year,
            period.output_year,
            period.total_male,
            period.total_female,
            period.total(),
            period.male_births.saturating_add(period.female_births),
            period.aged_out_male.saturating_add(period.aged_out_female),
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Rows: {}", summary.total_rows);
    println!("  Total births: {}", summary.total_births);
    println!("  Total aged out: {}", summary.total_aged_out);
}

fn print_chart(result: &ProjectionResult, year: u32) {
    let rows = result.rows_for_year(year);
    if rows.is_empty() {
        println!("\nNo rows tagged {} (available: {:?})", year, result.years());
        return;
    }

    let max = rows
        .iter()
        .map(|r| r.male.max(r.female))
        .max()
        .unwrap_or(0)
        .max(1);
    let width = 40.0;

    println!("\nPopulation by age group, {}:", year);
    for row in rows {
        let male_bar = "#".repeat((row.male.max(0) as f64 / max as f64 * width) as usize);
        let female_bar = "*".repeat((row.female.max(0) as f64 / max as f64 * width) as usize);
        println!("{:>8} M {:>8} {}", row.age_group, row.male, male_bar);
        println!("{:>8} F {:>8} {}", "", row.female, female_bar);
    }
}
