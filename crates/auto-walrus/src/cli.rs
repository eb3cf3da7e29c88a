//! Command-line driver
//!
//! Resolves configuration, expands the input paths and rewrites each selected
//! file in place. Reporting goes to a caller-supplied writer so the driver can
//! run inside tests as well as behind `main`.

use std::{
    fs,
    io::Write,
    path::{self, Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{LevelFilter, debug, info, trace, warn};

use crate::{
    config::{Config, Settings},
    files::FileSelector,
    orchestrator::{Outcome, rewrite},
};

/// Fold assignments into the following `if`/`while` test as assignment expressions
#[derive(Debug, Default, Parser)]
#[command(name = "auto-walrus", version, about)]
pub struct Cli {
    /// Files or directories to rewrite
    pub paths: Vec<PathBuf>,

    /// Regex pattern with which to match files to include
    #[arg(long, value_name = "REGEX")]
    pub files: Option<String>,

    /// Regex pattern with which to match files to exclude
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Maximum length of a rewritten line
    #[arg(long, value_name = "N")]
    pub line_length: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Settings given on the command line
    pub fn overrides(&self) -> Config {
        Config {
            line_length: self.line_length,
            files: self.files.clone(),
            exclude: self.exclude.clone(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// What a run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files written back, in processing order
    pub rewritten: Vec<PathBuf>,
    pub unchanged: usize,
    pub parse_failures: usize,
    /// Files that are not valid UTF-8
    pub skipped: usize,
}

impl RunSummary {
    /// 1 if any file was rewritten, 0 otherwise
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.rewritten.is_empty())
    }
}

/// Run the tool over every path in `cli`, reporting rewritten files to `out`
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<RunSummary> {
    let paths = cli
        .paths
        .iter()
        .map(|path| {
            path::absolute(path).with_context(|| format!("Failed to resolve {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let file_config = match Config::discover(&paths)? {
        Some((source, config)) => {
            info!("Loaded configuration from {}", source.display());
            config
        }
        None => Config::default(),
    };
    let settings = file_config.merged(cli.overrides()).settings()?;
    debug!("Using line length {}", settings.line_length);

    let selector = FileSelector::new(&settings)?;
    let mut summary = RunSummary::default();
    for path in &paths {
        for file in selector.select(path) {
            process_file(&file, &settings, &mut summary, out)?;
        }
    }

    info!(
        "{} rewritten, {} unchanged, {} failed to parse, {} skipped",
        summary.rewritten.len(),
        summary.unchanged,
        summary.parse_failures,
        summary.skipped
    );
    Ok(summary)
}

fn process_file(
    path: &Path,
    settings: &Settings,
    summary: &mut RunSummary,
    out: &mut impl Write,
) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let Ok(content) = String::from_utf8(bytes) else {
        debug!("Skipping {}: not valid UTF-8", path.display());
        summary.skipped += 1;
        return Ok(());
    };

    match rewrite(&content, settings.line_length) {
        Outcome::Changed(new_content) => {
            writeln!(out, "Rewriting {}", path.display())?;
            fs::write(path, new_content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            summary.rewritten.push(path.to_path_buf());
        }
        Outcome::Unchanged => {
            trace!("No changes for {}", path.display());
            summary.unchanged += 1;
        }
        Outcome::ParseFailed(message) => {
            warn!("Failed to parse {}: {message}", path.display());
            summary.parse_failures += 1;
        }
    }
    Ok(())
}
