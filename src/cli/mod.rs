//! CLI module - argument parsing and command dispatch

pub mod commands;
pub mod helpers;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};

use commands::{
    ctl::CtlCommands, haz::HazCommands, matrix::MatrixCommands, per::PerCommands,
    task::TaskCommands, wo::WoCommands,
};

#[derive(Parser, Debug)]
#[command(
    name = "rams",
    version,
    about = "Build risk assessment method statements against the RAMS service"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Backend base URL (overrides config)
    #[arg(long, global = true, env = "RAMS_API_URL")]
    pub api_url: Option<String>,

    /// Work order number (overrides config)
    #[arg(long, short = 'w', global = true, env = "RAMS_WORK_ORDER")]
    pub work_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Auto,
    Table,
    Json,
    Yaml,
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work order operations (load, import)
    #[command(subcommand)]
    Wo(WoCommands),

    /// Method statement task operations
    #[command(subcommand)]
    Task(TaskCommands),

    /// Hazard catalog management
    #[command(subcommand)]
    Haz(HazCommands),

    /// Control catalog management
    #[command(subcommand)]
    Ctl(CtlCommands),

    /// Personnel catalog management
    #[command(subcommand)]
    Per(PerCommands),

    /// Risk matrix
    #[command(subcommand)]
    Matrix(MatrixCommands),
}
