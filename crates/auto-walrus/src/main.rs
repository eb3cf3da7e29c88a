use std::{io, process::ExitCode};

use auto_walrus::cli::{Cli, run};
use clap::Parser;
use log::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let stdout = io::stdout();
    match run(&cli, &mut stdout.lock()) {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
