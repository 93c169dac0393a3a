//! `rams matrix` command - risk matrix inspection

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{client, load_catalog};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::matrix::{score, Rating, RiskMatrix};

#[derive(Subcommand, Debug)]
pub enum MatrixCommands {
    /// Show the configured bands and the 5x5 score grid
    Show,
}

pub fn run(cmd: MatrixCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MatrixCommands::Show => run_show(global),
    }
}

#[derive(Tabled)]
struct BandRow {
    #[tabled(rename = "LABEL")]
    label: String,
    #[tabled(rename = "SCORES")]
    scores: String,
    #[tabled(rename = "COLOR")]
    color: String,
    #[tabled(rename = "GUIDANCE")]
    guidance: String,
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let catalog = load_catalog(&client)?;
    let matrix = catalog.matrix();

    match effective_format(global.output, true) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(matrix.bands()).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yml::to_string(&matrix.bands()).into_diagnostic()?);
        }
        _ => {
            let rows: Vec<BandRow> = matrix
                .bands()
                .iter()
                .map(|band| BandRow {
                    label: band.label.clone(),
                    scores: format!("{}-{}", band.min_score, band.max_score),
                    color: band.color.clone(),
                    guidance: band.guidance.clone().unwrap_or_default(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
            println!();
            print_grid(matrix);
        }
    }
    Ok(())
}

/// Print the 5x5 likelihood x severity grid with each cell's score and
/// band label.
pub fn print_grid(matrix: &RiskMatrix) {
    print!("{:>14}", "");
    for severity in Rating::all() {
        print!("{:>12}", format!("S{}", severity));
    }
    println!();
    for likelihood in Rating::all() {
        print!("{:>14}", format!("Likelihood {}", likelihood));
        for severity in Rating::all() {
            let cell_score = score(likelihood, severity);
            let label = matrix
                .band_for_score(cell_score)
                .map(|band| band.label.as_str())
                .unwrap_or("N/A");
            print!("{:>12}", format!("{} {}", cell_score, label));
        }
        println!();
    }
    println!(
        "{}",
        style("Score = likelihood x severity, both 1-5").dim()
    );
}
