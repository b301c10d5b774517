//! Sweep the migration adjustment coefficient over its valid range
//!
//! Outputs one row per coefficient and period with population totals

use anyhow::Context;
use clap::Parser;
use cohort_projection::tables::{COEFFICIENT_MAX, COEFFICIENT_MIN};
use cohort_projection::ScenarioRunner;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "sweep_coefficient")]
#[command(about = "Run the projection for evenly spaced migration coefficients")]
struct Args {
    /// Input table directory
    #[arg(short, long, default_value = "data/inputs")]
    input_dir: PathBuf,

    /// Coefficient step between runs
    #[arg(long, default_value_t = 0.25)]
    step: f64,

    /// Output CSV path
    #[arg(short, long, default_value = "coefficient_sweep.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !(args.step > 0.0) {
        anyhow::bail!("--step must be positive, got {}", args.step);
    }

    let start = Instant::now();
    let runner = ScenarioRunner::from_csv_path(&args.input_dir)
        .with_context(|| format!("loading tables from {}", args.input_dir.display()))?;
    let years = runner
        .inputs()
        .default_years()
        .context("sex ratio table lists fewer than three years")?;

    let steps = ((COEFFICIENT_MAX - COEFFICIENT_MIN) / args.step).floor() as usize;
    let coefficients: Vec<f64> = (0..=steps)
        .map(|i| (COEFFICIENT_MIN + i as f64 * args.step).min(COEFFICIENT_MAX))
        .collect();

    println!("Running {} projections for years {:?}...", coefficients.len(), years);
    let results = runner.run_coefficients(&coefficients, years)?;
    println!("Projections complete in {:?}", start.elapsed());

    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writeln!(file, "Coefficient,Period,Year,Male,Female,Total")?;

    for result in &results {
        for period in &result.periods {
            writeln!(
                file,
                "{:.2},{},{},{},{},{}",
                result.coefficient,
                period.period,
                period.output_year,
                period.total_male,
                period.total_female,
                period.total(),
            )?;
        }
    }

    println!("Output written to {}", args.output.display());

    if let (Some(low), Some(high)) = (results.first(), results.last()) {
        println!("\nTarget-year total (period 2):");
        println!("  coefficient {:.2}: {}", low.coefficient, low.periods[2].total());
        println!("  coefficient {:.2}: {}", high.coefficient, high.periods[2].total());
    }

    Ok(())
}
