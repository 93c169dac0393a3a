//! `rams per` command - personnel catalog management
//!
//! Task assignments reference personnel by display name, so renaming or
//! deleting an entry here does not touch names already stored on tasks.

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::client;
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::entities::person::PersonDraft;

#[derive(Subcommand, Debug)]
pub enum PerCommands {
    /// List personnel roles
    List,

    /// Create a personnel role
    New(NewArgs),

    /// Update a personnel role
    Edit(EditArgs),

    /// Delete a personnel role
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Role name, e.g. "Electrician"
    #[arg(long)]
    pub name: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Person id
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Person id
    pub id: i64,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: PerCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PerCommands::List => run_list(global),
        PerCommands::New(args) => run_new(args, global),
        PerCommands::Edit(args) => run_edit(args, global),
        PerCommands::Delete(args) => run_delete(args, global),
    }
}

#[derive(Tabled)]
struct PersonRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let personnel = client.list_personnel().into_diagnostic()?;

    match effective_format(global.output, true) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&personnel).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yml::to_string(&personnel).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for person in &personnel {
                println!("{}", person.id);
            }
        }
        _ => {
            if personnel.is_empty() {
                println!("No personnel found.");
                return Ok(());
            }
            let rows: Vec<PersonRow> = personnel
                .iter()
                .map(|person| PersonRow {
                    id: person.id,
                    name: person.name.clone(),
                    description: person.description.clone(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::sharp()));
            println!("{} person(s) found", personnel.len());
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let draft = PersonDraft {
        name: args.name,
        description: args.description,
    };
    let person = client.create_person(&draft).into_diagnostic()?;
    println!("Created person {} ({})", style(person.id).cyan(), person.name);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    let current = client
        .list_personnel()
        .into_diagnostic()?
        .into_iter()
        .find(|person| person.id == args.id)
        .ok_or_else(|| miette::miette!("Person {} not found in catalog", args.id))?;

    let draft = PersonDraft {
        name: args.name.unwrap_or(current.name),
        description: args.description,
    };
    let person = client.update_person(args.id, &draft).into_diagnostic()?;
    println!("Updated person {} ({})", style(person.id).cyan(), person.name);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let client = client(global, &config);
    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete person {}? Existing task assignments keep the name.",
                args.id
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            return Ok(());
        }
    }
    client.delete_person(args.id).into_diagnostic()?;
    println!("Deleted person {}", style(args.id).cyan());
    Ok(())
}
