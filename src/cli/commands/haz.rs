//! `rams haz` command - hazard catalog management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{client, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::matrix::Rating;
use crate::entities::hazard::{Hazard, HazardDraft};

#[derive(Subcommand, Debug)]
pub enum HazCommands {
    /// List catalog hazards
    List(ListArgs),

    /// Create a catalog hazard
    New(NewArgs),

    /// Update a catalog hazard
    Edit(EditArgs),

    /// Delete a catalog hazard
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Substring match on name or description
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Hazard name
    #[arg(long)]
    pub name: String,

    /// Hazard category
    #[arg(long, short = 'c')]
    pub category: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Default likelihood, 1-5
    #[arg(long, short = 'l')]
    pub likelihood: Option<Rating>,

    /// Default severity, 1-5
    #[arg(long, short = 's')]
    pub severity: Option<Rating>,

    /// The hazard needs a parameter value when attached to a task
    #[arg(long)]
    pub requires_parameter: bool,

    /// Parameter field label, e.g. "Load weight"
    #[arg(long)]
    pub parameter_label: Option<String>,

    /// Parameter unit, e.g. "kg"
    #[arg(long)]
    pub parameter_unit: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Hazard id
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'l')]
    pub likelihood: Option<Rating>,

    #[arg(long, short = 's')]
    pub severity: Option<Rating>,

    #[arg(long)]
    pub requires_parameter: Option<bool>,

    #[arg(long)]
    pub parameter_label: Option<String>,

    #[arg(long)]
    pub parameter_unit: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Hazard id
    pub id: i64,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: HazCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        HazCommands::List(args) => run_list(args, global),
        HazCommands::New(args) => run_new(args, global),
        HazCommands::Edit(args) => run_edit(args, global),
        HazCommands::Delete(args) => run_delete(args, global),
    }
}

#[derive(Tabled)]
struct HazardRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DEFAULT RISK")]
    default_risk: String,
    #[tabled(rename = "PARAMETER")]
    parameter: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let hazards = client.list_hazards().into_diagnostic()?;

    let filtered: Vec<&Hazard> = hazards
        .iter()
        .filter(|hazard| {
            args.category
                .as_deref()
                .map(|category| hazard.category.eq_ignore_ascii_case(category))
                .unwrap_or(true)
        })
        .filter(|hazard| {
            args.search
                .as_deref()
                .map(|term| {
                    let term = term.to_lowercase();
                    hazard.name.to_lowercase().contains(&term)
                        || hazard.description.to_lowercase().contains(&term)
                })
                .unwrap_or(true)
        })
        .collect();

    match effective_format(global.output, true) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&filtered).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yml::to_string(&filtered).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for hazard in &filtered {
                println!("{}", hazard.id);
            }
        }
        _ => {
            if filtered.is_empty() {
                println!("No hazards found.");
                return Ok(());
            }
            let rows: Vec<HazardRow> = filtered
                .iter()
                .map(|hazard| HazardRow {
                    id: hazard.id,
                    category: hazard.category.clone(),
                    name: hazard.name.clone(),
                    default_risk: format!(
                        "L{} x S{} = {}",
                        hazard.default_likelihood,
                        hazard.default_severity,
                        hazard.default_score()
                    ),
                    parameter: if hazard.requires_parameter {
                        hazard.parameter_prompt()
                    } else {
                        "-".to_string()
                    },
                    description: truncate_str(&hazard.description, 40),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
            println!("{} hazard(s) found", filtered.len());
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let draft = HazardDraft {
        name: args.name,
        category: args.category,
        description: args.description,
        default_likelihood: args.likelihood,
        default_severity: args.severity,
        requires_parameter: Some(args.requires_parameter),
        parameter_label: args.parameter_label,
        parameter_unit: args.parameter_unit,
    };
    let hazard = client.create_hazard(&draft).into_diagnostic()?;
    println!(
        "Created hazard {} ({})",
        style(hazard.id).cyan(),
        hazard.name
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    // The backend keeps stored values for fields the payload omits, but
    // name and category are always sent; fill them from the current
    // record when the flags were not given.
    let current = client
        .list_hazards()
        .into_diagnostic()?
        .into_iter()
        .find(|hazard| hazard.id == args.id)
        .ok_or_else(|| miette::miette!("Hazard {} not found in catalog", args.id))?;

    let draft = HazardDraft {
        name: args.name.unwrap_or(current.name),
        category: args.category.unwrap_or(current.category),
        description: args.description,
        default_likelihood: args.likelihood,
        default_severity: args.severity,
        requires_parameter: args.requires_parameter,
        parameter_label: args.parameter_label,
        parameter_unit: args.parameter_unit,
    };
    let hazard = client.update_hazard(args.id, &draft).into_diagnostic()?;
    println!(
        "Updated hazard {} ({})",
        style(hazard.id).cyan(),
        hazard.name
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete hazard {}?", args.id))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            return Ok(());
        }
    }
    client.delete_hazard(args.id).into_diagnostic()?;
    println!("Deleted hazard {}", style(args.id).cyan());
    Ok(())
}
