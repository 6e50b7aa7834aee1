use std::path::PathBuf;

use clap::Parser;

use teller_report_service::comparison::compare_periods;
use teller_report_service::parser::parse_csv;

#[derive(Parser)]
#[command(name = "report-from-file")]
#[command(about = "Summarize a teller sheet export from a local CSV file", long_about = None)]
struct Cli {
    /// Path to the CSV export
    path: PathBuf,

    /// Also print the trailing 7-day period comparison
    #[arg(long)]
    comparison: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.path)?;
    let model = parse_csv(&text)?;

    println!(
        "Parsed {} units, {} tellers, {} dates\n",
        model.units.len(),
        model.total_tellers,
        model.dates.len()
    );
    println!("{}", serde_json::to_string_pretty(&model)?);

    if cli.comparison {
        match compare_periods(&model) {
            Some(report) => println!("\n{}", serde_json::to_string_pretty(&report)?),
            None => println!("\nComparison unavailable: fewer than 2 date columns"),
        }
    }

    Ok(())
}
