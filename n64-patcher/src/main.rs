//! Main entry point for the n64-patcher CLI

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;
use std::process::ExitCode;

use n64_patcher::cli::{Cli, Commands};
use n64_patcher::commands::{self, CheckFailed};

/// Exit code for failures that fit no verification category
const EXIT_INTERNAL: u8 = 99;

fn main() -> ExitCode {
    // Parse command line arguments; usage errors are not verification failures
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_INTERNAL),
            };
        }
    };

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;

    // Execute command
    match cli.command {
        None => commands::apply::execute(cli.apply, quiet),
        Some(Commands::Apply(args)) => commands::apply::execute(args, quiet),
        Some(Commands::Info(args)) => commands::info::execute(args),
        Some(Commands::Verify(args)) => commands::verify::execute(args, quiet),
        Some(Commands::Create(args)) => commands::create::execute(args, quiet),
        Some(Commands::Convert(args)) => commands::convert::execute(args, quiet),
        Some(Commands::Completions { shell }) => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

/// Map an error chain onto the documented exit codes
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<n64_patch::Error>() {
            return err.exit_code();
        }
        if cause.downcast_ref::<CheckFailed>().is_some() {
            return 2;
        }
        if let Some(err) = cause.downcast_ref::<io::Error>() {
            return if err.kind() == io::ErrorKind::NotFound {
                1
            } else {
                EXIT_INTERNAL
            };
        }
    }
    EXIT_INTERNAL
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
