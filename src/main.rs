mod cli;
mod css;
mod deps;
mod generator;
mod manifest;
mod options;
mod pm;
mod reconcile;
mod runner;
mod session;
mod sync;
mod templates;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;

use cli::Cli;
use options::Options;
use runner::CommandFailed;
use session::{Session, TermPrompter};

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Err(err) = run(&cli) {
        ui::error(&format!("{err:#}"));

        // a failing external command's own exit code is propagated
        let code = err
            .downcast_ref::<CommandFailed>()
            .map_or(1, |failed| failed.code);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let appdir = match &cli.appdir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Could not determine current directory")?,
    };

    let opts = Options::resolve(cli);
    log::debug!("resolved options: {opts:?}");

    let mut session = Session::new(opts.force);
    let mut prompter = TermPrompter;

    // quit at a prompt is a normal completion (exit 0)
    generator::run(&opts, &appdir, &mut session, &mut prompter)?;
    Ok(())
}
