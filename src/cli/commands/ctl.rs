//! `rams ctl` command - control catalog management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{client, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::hierarchy::Tier;
use crate::entities::control::{Control, ControlDraft};

#[derive(Subcommand, Debug)]
pub enum CtlCommands {
    /// List catalog controls grouped by hierarchy tier
    List(ListArgs),

    /// Create a catalog control
    New(NewArgs),

    /// Update a catalog control
    Edit(EditArgs),

    /// Delete a catalog control
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by raw category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Substring match on name or description
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Control name
    #[arg(long)]
    pub name: String,

    /// Control category (folded into the hierarchy for display)
    #[arg(long, short = 'c')]
    pub category: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Effectiveness, 1 (least) to 5 (most)
    #[arg(long, short = 'e')]
    pub effectiveness: Option<u8>,

    /// The control needs a parameter value when attached
    #[arg(long)]
    pub requires_parameter: bool,

    /// Parameter field label, e.g. "Hoist capacity"
    #[arg(long)]
    pub parameter_label: Option<String>,

    /// Parameter unit, e.g. "kg"
    #[arg(long)]
    pub parameter_unit: Option<String>,

    /// External reference (standard, procedure number)
    #[arg(long)]
    pub reference: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Control id
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'e')]
    pub effectiveness: Option<u8>,

    #[arg(long)]
    pub requires_parameter: Option<bool>,

    #[arg(long)]
    pub parameter_label: Option<String>,

    #[arg(long)]
    pub parameter_unit: Option<String>,

    #[arg(long)]
    pub reference: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Control id
    pub id: i64,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: CtlCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CtlCommands::List(args) => run_list(args, global),
        CtlCommands::New(args) => run_new(args, global),
        CtlCommands::Edit(args) => run_edit(args, global),
        CtlCommands::Delete(args) => run_delete(args, global),
    }
}

#[derive(Tabled)]
struct ControlRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "TIER")]
    tier: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EFF")]
    effectiveness: u8,
    #[tabled(rename = "PARAMETER")]
    parameter: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let controls = client.list_controls().into_diagnostic()?;

    let mut filtered: Vec<&Control> = controls
        .iter()
        .filter(|control| {
            args.category
                .as_deref()
                .map(|category| control.category.eq_ignore_ascii_case(category))
                .unwrap_or(true)
        })
        .filter(|control| {
            args.search
                .as_deref()
                .map(|term| {
                    let term = term.to_lowercase();
                    control.name.to_lowercase().contains(&term)
                        || control.description.to_lowercase().contains(&term)
                })
                .unwrap_or(true)
        })
        .collect();
    // Hierarchy order, most effective tier first.
    filtered.sort_by(|a, b| {
        Tier::for_category(&a.category)
            .cmp(&Tier::for_category(&b.category))
            .then_with(|| a.name.cmp(&b.name))
    });

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
            for control in &filtered {
                println!("{}", control.id);
            }
        }
        _ => {
            if filtered.is_empty() {
                println!("No controls found.");
                return Ok(());
            }
            let rows: Vec<ControlRow> = filtered
                .iter()
                .map(|control| {
                    let tier = Tier::for_category(&control.category);
                    ControlRow {
                        id: control.id,
                        tier: match tier.effectiveness_caption() {
                            Some(caption) => format!("{} ({})", tier.label(), caption),
                            None => tier.label().to_string(),
                        },
                        name: control.name.clone(),
                        effectiveness: control.effectiveness,
                        parameter: if control.requires_parameter {
                            control.parameter_prompt()
                        } else {
                            "-".to_string()
                        },
                        description: truncate_str(&control.description, 40),
                    }
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
            println!("{} control(s) found", filtered.len());
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let draft = ControlDraft {
        name: args.name,
        category: args.category,
        description: args.description,
        effectiveness: args.effectiveness,
        requires_parameter: Some(args.requires_parameter),
        parameter_label: args.parameter_label,
        parameter_unit: args.parameter_unit,
        reference: args.reference,
    };
    let control = client.create_control(&draft).into_diagnostic()?;
    println!(
        "Created control {} ({})",
        style(control.id).cyan(),
        control.name
    );
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let current = client
        .list_controls()
        .into_diagnostic()?
        .into_iter()
        .find(|control| control.id == args.id)
        .ok_or_else(|| miette::miette!("Control {} not found in catalog", args.id))?;

    let draft = ControlDraft {
        name: args.name.unwrap_or(current.name),
        category: args.category.unwrap_or(current.category),
        description: args.description,
        effectiveness: args.effectiveness,
        requires_parameter: args.requires_parameter,
        parameter_label: args.parameter_label,
        parameter_unit: args.parameter_unit,
        reference: args.reference,
    };
    let control = client.update_control(args.id, &draft).into_diagnostic()?;
    println!(
        "Updated control {} ({})",
        style(control.id).cyan(),
        control.name
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete control {}?", args.id))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            return Ok(());
        }
    }
    client.delete_control(args.id).into_diagnostic()?;
    println!("Deleted control {}", style(args.id).cyan());
    Ok(())
}
