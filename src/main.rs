use clap::Parser;
use miette::Result;
use rams::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Wo(cmd) => rams::cli::commands::wo::run(cmd, &cli.global),
        Commands::Task(cmd) => rams::cli::commands::task::run(cmd, &cli.global),
        Commands::Haz(cmd) => rams::cli::commands::haz::run(cmd, &cli.global),
        Commands::Ctl(cmd) => rams::cli::commands::ctl::run(cmd, &cli.global),
        Commands::Per(cmd) => rams::cli::commands::per::run(cmd, &cli.global),
        Commands::Matrix(cmd) => rams::cli::commands::matrix::run(cmd, &cli.global),
    }
}
