//! `rams wo` command - load and import work orders

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{client, load_workspace, resolve_work_order, risk_cell, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::workspace::Workspace;
use crate::entities::task::RiskPhase;

/// Filename of the sample method statement shipped with the backend.
const SAMPLE_METHOD_STATEMENT: &str = "wo1001_pump_overhaul.csv";

#[derive(Subcommand, Debug)]
pub enum WoCommands {
    /// Load a work order and list its tasks
    Show(ShowArgs),

    /// Import a method statement CSV into a work order
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Work order number (falls back to --work-order / config)
    pub number: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Work order number (falls back to --work-order / config)
    pub number: Option<String>,

    /// Upload a local CSV file
    #[arg(long, conflicts_with_all = ["filename", "sample"])]
    pub file: Option<std::path::PathBuf>,

    /// Import a CSV already in the server's data directory
    #[arg(long, conflicts_with = "sample")]
    pub filename: Option<String>,

    /// Import the bundled sample method statement
    #[arg(long)]
    pub sample: bool,

    /// Method statement title
    #[arg(long)]
    pub title: Option<String>,

    /// Keep the work order's existing tasks instead of replacing them
    #[arg(long)]
    pub no_replace: bool,
}

pub fn run(cmd: WoCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WoCommands::Show(args) => run_show(args, global),
        WoCommands::Import(args) => run_import(args, global),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let number = match args.number {
        Some(number) => number,
        None => resolve_work_order(global, &config)?,
    };

    let workspace = load_workspace(&client, &number)?;
    print_workspace(&workspace, global.output)
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let number = match args.number {
        Some(number) => number,
        None => resolve_work_order(global, &config)?,
    };
    let replace = !args.no_replace;
    let title = args.title.as_deref();

    let workspace = if let Some(path) = &args.file {
        Workspace::import_upload(&client, &number, path, title, replace).into_diagnostic()?
    } else if let Some(filename) = &args.filename {
        Workspace::import_named(&client, &number, filename, title, replace).into_diagnostic()?
    } else if args.sample {
        Workspace::import_named(&client, &number, SAMPLE_METHOD_STATEMENT, title, replace)
            .into_diagnostic()?
    } else {
        return Err(miette::miette!(
            "Nothing to import: pass --file, --filename, or --sample"
        ));
    };

    println!(
        "Imported method statement into {} ({} tasks)",
        style(&number).cyan(),
        workspace.tasks().len()
    );
    print_workspace(&workspace, global.output)
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "SEQ")]
    sequence: i64,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "ACTIVITY")]
    activity: String,
    #[tabled(rename = "HAZARDS")]
    hazards: String,
    #[tabled(rename = "PERSONNEL")]
    personnel: String,
    #[tabled(rename = "INITIAL RISK")]
    initial: String,
    #[tabled(rename = "TARGET")]
    target: String,
    #[tabled(rename = "RESIDUAL RISK")]
    residual: String,
}

/// Render the workspace in the selected format. Shared by every command
/// that ends with a refreshed task list.
pub fn print_workspace(workspace: &Workspace, format: OutputFormat) -> Result<()> {
    match effective_format(format, true) {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "work_order": workspace.work_order(),
                "tasks": workspace.ordered_tasks(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&body).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            let body = serde_json::json!({
                "work_order": workspace.work_order(),
                "tasks": workspace.ordered_tasks(),
            });
            println!("{}", serde_yml::to_string(&body).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for task in workspace.ordered_tasks() {
                println!("{}", task.id);
            }
        }
        _ => {
            let work_order = workspace.work_order();
            println!(
                "{} {} - {}",
                style("Work order").bold(),
                style(&work_order.number).cyan(),
                work_order.title
            );
            if workspace.tasks().is_empty() {
                println!("No tasks yet. Import a method statement or add tasks.");
                return Ok(());
            }
            let rows: Vec<TaskRow> = workspace
                .ordered_tasks()
                .into_iter()
                .map(|task| TaskRow {
                    sequence: task.sequence,
                    id: task.id,
                    activity: truncate_str(&task.activity, 40),
                    hazards: if task.hazards.is_empty() {
                        "-".to_string()
                    } else {
                        task.hazards
                            .iter()
                            .map(|h| h.display_label())
                            .collect::<Vec<_>>()
                            .join(", ")
                    },
                    personnel: task.personnel().join(", "),
                    initial: risk_cell(task, RiskPhase::Initial),
                    target: task
                        .target_completion_date
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    residual: risk_cell(task, RiskPhase::Residual),
                })
                .collect();
            let count = rows.len();
            println!("{}", Table::new(rows).with(Style::sharp()));
            println!("{} task(s)", count);
        }
    }
    Ok(())
}
