//! `rams task` command - method statement task editing
//!
//! The selection subcommands (hazards, controls, personnel) mirror the
//! web client's modal dialogs: seed a session from the task's current
//! attachments, edit it locally, then commit the whole selection as a
//! replacement. Cancelling an interactive prompt discards the session.

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use miette::{IntoDiagnostic, Result};

use crate::api::ApiClient;
use crate::cli::commands::matrix::print_grid;
use crate::cli::commands::wo::print_workspace;
use crate::cli::helpers::{
    client, load_catalog, load_workspace, parse_id_list, parse_param_flags, resolve_work_order,
    risk_cell,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::Catalog;
use crate::core::config::Config;
use crate::core::matrix::Rating;
use crate::core::selection::{ControlScope, ControlSession, HazardSession, PersonnelSession};
use crate::core::workspace::{TaskPatch, Workspace};
use crate::entities::control::ControlPhase;
use crate::entities::person::Person;
use crate::entities::task::RiskPhase;

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task to the work order
    Add,

    /// Show a task's details
    Show(ShowArgs),

    /// Edit a task's fields
    Edit(EditArgs),

    /// Delete a task
    Rm(RmArgs),

    /// Set a task's risk rating (initial or residual)
    Risk(RiskArgs),

    /// Select the hazards attached to a task
    Hazards(HazardsArgs),

    /// Select controls for a task hazard (or the legacy task-level lists)
    Controls(ControlsArgs),

    /// Select the personnel at risk for a task
    Personnel(PersonnelArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Task id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Task id
    pub id: i64,

    /// Work activity text
    #[arg(long)]
    pub activity: Option<String>,

    /// Free-text hazard description
    #[arg(long)]
    pub hazard_description: Option<String>,

    /// Existing controls summary
    #[arg(long)]
    pub existing_summary: Option<String>,

    /// Additional controls summary
    #[arg(long)]
    pub additional_summary: Option<String>,

    /// Notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Target completion date (ISO, empty string clears)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Task id
    pub id: i64,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct RiskArgs {
    /// Task id
    pub id: i64,

    /// Set the residual (after controls) rating instead of the initial one
    #[arg(long)]
    pub residual: bool,

    /// Likelihood, 1-5
    #[arg(long, short = 'l')]
    pub likelihood: Option<Rating>,

    /// Severity, 1-5
    #[arg(long, short = 's')]
    pub severity: Option<Rating>,
}

#[derive(clap::Args, Debug)]
pub struct HazardsArgs {
    /// Task id
    pub id: i64,

    /// Replace the selection with this comma-separated hazard id list
    #[arg(long)]
    pub ids: Option<String>,

    /// Parameter value for a hazard, as id=value (repeatable)
    #[arg(long = "param")]
    pub params: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ControlsArgs {
    /// Task id
    pub id: i64,

    /// Control phase
    #[arg(long, short = 'p', default_value = "existing")]
    pub phase: ControlPhase,

    /// Scope to one of the task's hazards; omit for the legacy task-level lists
    #[arg(long)]
    pub hazard: Option<i64>,

    /// Replace the selection with this comma-separated control id list
    #[arg(long)]
    pub ids: Option<String>,

    /// Parameter value for a control, as id=value (repeatable)
    #[arg(long = "param")]
    pub params: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct PersonnelArgs {
    /// Task id
    pub id: i64,

    /// Replace the selection with this comma-separated name list
    #[arg(long)]
    pub names: Option<String>,
}

pub fn run(cmd: TaskCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TaskCommands::Add => run_add(global),
        TaskCommands::Show(args) => run_show(args, global),
        TaskCommands::Edit(args) => run_edit(args, global),
        TaskCommands::Rm(args) => run_rm(args, global),
        TaskCommands::Risk(args) => run_risk(args, global),
        TaskCommands::Hazards(args) => run_hazards(args, global),
        TaskCommands::Controls(args) => run_controls(args, global),
        TaskCommands::Personnel(args) => run_personnel(args, global),
    }
}

struct Context {
    client: ApiClient,
    workspace: Workspace,
    number: String,
}

fn context(global: &GlobalOpts) -> Result<Context> {
    let config = Config::load();
    let client = client(global, &config);
    let number = resolve_work_order(global, &config)?;
    let workspace = load_workspace(&client, &number)?;
    Ok(Context {
        client,
        workspace,
        number,
    })
}

/// A task id the work order no longer carries is a notice, not an error.
fn notice_missing(ctx: &Context, task_id: i64) {
    println!(
        "Task {} is not in work order {}.",
        task_id,
        style(&ctx.number).cyan()
    );
}

fn run_add(global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    let task = ctx.workspace.add_task(&ctx.client).into_diagnostic()?;
    println!("Created task {}", style(task.id).cyan());
    print_workspace(&ctx.workspace, global.output)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = context(global)?;
    let Some(task) = ctx.workspace.task(args.id) else {
        notice_missing(&ctx, args.id);
        return Ok(());
    };
    match global.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(task).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", task.id),
        _ => {
            println!("{}", serde_yml::to_string(task).into_diagnostic()?);
        }
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    if ctx.workspace.task(args.id).is_none() {
        notice_missing(&ctx, args.id);
        return Ok(());
    }
    let patch = TaskPatch {
        activity: args.activity,
        hazard_description: args.hazard_description,
        existing_controls_summary: args.existing_summary,
        additional_controls_summary: args.additional_summary,
        notes: args.notes,
        target_completion_date: args.date,
        ..TaskPatch::default()
    };
    if patch.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    ctx.workspace
        .update_task(&ctx.client, args.id, &patch)
        .into_diagnostic()?;
    println!("Updated task {}", style(args.id).cyan());
    print_workspace(&ctx.workspace, global.output)
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    let Some(task) = ctx.workspace.task(args.id) else {
        notice_missing(&ctx, args.id);
        return Ok(());
    };
    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove task \"{}\"?", task.activity))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            return Ok(());
        }
    }
    ctx.workspace
        .delete_task(&ctx.client, args.id)
        .into_diagnostic()?;
    println!("Deleted task {}", style(args.id).cyan());
    Ok(())
}

fn run_risk(args: RiskArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    let Some(task) = ctx.workspace.task(args.id) else {
        notice_missing(&ctx, args.id);
        return Ok(());
    };
    let phase = if args.residual {
        RiskPhase::Residual
    } else {
        RiskPhase::Initial
    };
    let (current_likelihood, current_severity) = task.ratings(phase);

    let (likelihood, severity) = match (args.likelihood, args.severity) {
        (Some(likelihood), Some(severity)) => (likelihood, severity),
        _ => {
            // Interactive: show the grid, then prompt for the pair.
            let catalog = load_catalog(&ctx.client)?;
            println!(
                "Select {} risk for \"{}\"",
                phase,
                style(&task.activity).bold()
            );
            print_grid(catalog.matrix());
            let likelihood = prompt_rating("Likelihood", current_likelihood)?;
            let severity = prompt_rating("Severity", current_severity)?;
            (likelihood, severity)
        }
    };

    ctx.workspace
        .set_risk(&ctx.client, args.id, phase, likelihood, severity)
        .into_diagnostic()?;

    let task = ctx.workspace.task(args.id).expect("task just updated");
    println!(
        "{} risk for task {}: {}",
        phase,
        style(args.id).cyan(),
        risk_cell(task, phase)
    );
    Ok(())
}

fn prompt_rating(prompt: &str, current: Rating) -> Result<Rating> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} (1-5)", prompt))
        .with_initial_text(current.to_string())
        .validate_with(|input: &String| {
            input
                .parse::<Rating>()
                .map(|_| ())
                .map_err(|err| err.to_string())
        })
        .interact_text()
        .into_diagnostic()?;
    value.parse().into_diagnostic()
}

fn run_hazards(args: HazardsArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    let catalog = load_catalog(&ctx.client)?;
    let Some(task) = ctx.workspace.task(args.id) else {
        notice_missing(&ctx, args.id);
        return Ok(());
    };
    let mut session = HazardSession::begin(task);

    if let Some(ids) = &args.ids {
        let wanted = parse_id_list(ids)?;
        for pick in session.selected().to_vec() {
            if !wanted.contains(&pick.id) {
                session.uncheck(pick.id);
            }
        }
        for id in wanted {
            session.check(id);
        }
        for (id, value) in parse_param_flags(&args.params)? {
            session.set_parameter(id, &value);
        }
    } else {
        edit_hazards_interactively(&catalog, &mut session)?;
    }

    ctx.workspace
        .commit_hazards(&ctx.client, &catalog, &session)
        .into_diagnostic()?;

    let task = ctx.workspace.task(args.id).expect("task just updated");
    println!(
        "Task {} hazards: {}",
        style(args.id).cyan(),
        if task.hazards.is_empty() {
            "none".to_string()
        } else {
            task.hazards
                .iter()
                .map(|h| h.display_label())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    Ok(())
}

fn edit_hazards_interactively(catalog: &Catalog, session: &mut HazardSession) -> Result<()> {
    let mut items = Vec::new();
    let mut defaults = Vec::new();
    let mut ids = Vec::new();
    for (category, hazards) in catalog.hazards_by_category() {
        for hazard in hazards {
            let marker = if hazard.requires_parameter {
                format!("  [{}]", hazard.parameter_prompt())
            } else {
                String::new()
            };
            items.push(format!("{}: {}{}", category, hazard.name, marker));
            defaults.push(session.is_selected(hazard.id));
            ids.push(hazard.id);
        }
    }

    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select hazards")
        .items(&items)
        .defaults(&defaults)
        .interact()
        .into_diagnostic()?;

    for (index, &id) in ids.iter().enumerate() {
        if picked.contains(&index) {
            session.check(id);
        } else {
            session.uncheck(id);
        }
    }

    // Parameter prompts for the selected hazards that need one.
    for &id in &ids {
        if !session.is_selected(id) {
            continue;
        }
        let hazard = catalog.hazard(id).expect("id came from the catalog");
        if !hazard.requires_parameter {
            continue;
        }
        let value: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} for {}", hazard.parameter_prompt(), hazard.name))
            .with_initial_text(session.parameter_value(id).unwrap_or_default().to_string())
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        session.set_parameter(id, &value);
    }
    Ok(())
}

fn run_controls(args: ControlsArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    let catalog = load_catalog(&ctx.client)?;
    let Some(task) = ctx.workspace.task(args.id) else {
        notice_missing(&ctx, args.id);
        return Ok(());
    };
    let scope = match args.hazard {
        Some(hazard_id) => ControlScope::PerHazard(hazard_id),
        None => ControlScope::Legacy,
    };
    let mut session = ControlSession::begin(task, args.phase, scope);

    if let Some(ids) = &args.ids {
        let wanted = parse_id_list(ids)?;
        for id in session.selected_ids().to_vec() {
            if !wanted.contains(&id) {
                session.uncheck(id);
            }
        }
        for id in wanted {
            session.check(id);
        }
        for (id, value) in parse_param_flags(&args.params)? {
            session.set_parameter(id, &value);
        }
    } else {
        edit_controls_interactively(&catalog, &mut session)?;
    }

    ctx.workspace
        .commit_controls(&ctx.client, &catalog, &session)
        .into_diagnostic()?;

    let task = ctx.workspace.task(args.id).expect("task just updated");
    let attached = match scope {
        ControlScope::PerHazard(hazard_id) => task
            .hazard(hazard_id)
            .map(|h| h.controls.phase(args.phase))
            .unwrap_or(&[]),
        ControlScope::Legacy => task.controls.phase(args.phase),
    };
    println!(
        "Task {} {} controls: {}",
        style(args.id).cyan(),
        args.phase,
        if attached.is_empty() {
            "none".to_string()
        } else {
            attached
                .iter()
                .map(|c| c.display_label())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    Ok(())
}

fn edit_controls_interactively(catalog: &Catalog, session: &mut ControlSession) -> Result<()> {
    let mut items = Vec::new();
    let mut defaults = Vec::new();
    let mut ids = Vec::new();
    for (tier, controls) in catalog.controls_by_tier() {
        let caption = tier
            .effectiveness_caption()
            .map(|caption| format!(" ({})", caption))
            .unwrap_or_default();
        for control in controls {
            items.push(format!("{}{}: {}", tier.label(), caption, control.name));
            defaults.push(session.is_selected(control.id));
            ids.push(control.id);
        }
    }

    let prompt = match session.phase() {
        ControlPhase::Existing => "Select existing controls",
        ControlPhase::Additional => "Select additional controls",
    };
    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .defaults(&defaults)
        .interact()
        .into_diagnostic()?;

    for (index, &id) in ids.iter().enumerate() {
        if picked.contains(&index) {
            session.check(id);
        } else {
            session.uncheck(id);
        }
    }

    // Optional parameters; controls never block on an empty value.
    for &id in &ids {
        if !session.is_selected(id) {
            continue;
        }
        let control = catalog.control(id).expect("id came from the catalog");
        if !control.requires_parameter || control.parameter_label.is_none() {
            continue;
        }
        let value: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "{} for {}",
                control.parameter_prompt(),
                control.name
            ))
            .with_initial_text(session.parameter_value(id).unwrap_or_default().to_string())
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        session.set_parameter(id, &value);
    }
    Ok(())
}

fn run_personnel(args: PersonnelArgs, global: &GlobalOpts) -> Result<()> {
    let mut ctx = context(global)?;
    let Some(task) = ctx.workspace.task(args.id) else {
        notice_missing(&ctx, args.id);
        return Ok(());
    };
    let mut session = PersonnelSession::begin(task);

    if let Some(names) = &args.names {
        for name in session.selected().to_vec() {
            session.uncheck(&name);
        }
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            session.check(name);
        }
    } else {
        let catalog = load_catalog(&ctx.client)?;
        let people: Vec<&Person> = catalog.personnel().iter().collect();
        let items: Vec<String> = people
            .iter()
            .map(|person| {
                if person.description.is_empty() {
                    person.name.clone()
                } else {
                    format!("{} - {}", person.name, person.description)
                }
            })
            .collect();
        let defaults: Vec<bool> = people
            .iter()
            .map(|person| session.is_selected(&person.name))
            .collect();

        let picked = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Select personnel at risk")
            .items(&items)
            .defaults(&defaults)
            .interact()
            .into_diagnostic()?;

        // Names assigned to the task but absent from the catalog stay
        // selected; only catalog entries are toggled here.
        for (index, person) in people.iter().enumerate() {
            if picked.contains(&index) {
                session.check(&person.name);
            } else {
                session.uncheck(&person.name);
            }
        }
    }

    ctx.workspace
        .commit_personnel(&ctx.client, &session)
        .into_diagnostic()?;

    let task = ctx.workspace.task(args.id).expect("task just updated");
    let names = task.personnel();
    println!(
        "Task {} personnel at risk: {}",
        style(args.id).cyan(),
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    );
    Ok(())
}
