use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Context;
use statectl_diff::{JsonSink, TextSink};
use statectl_project::{load_project_config, DiffOutcome, Project};
use statectl_repo::CancelToken;

use crate::cli::{Cli, Command, DiffArgs, OutputFormat};
use crate::output::ColorSink;

const CACHE_SUBDIR: &str = "statectl";
const FALLBACK_CACHE_DIR: &str = "./.statectl-cache";

pub fn run_command(cli: Cli, cancel: CancelToken) -> anyhow::Result<()> {
    let cfg_path = &cli.config_file;
    let raw = fs::read(cfg_path).with_context(|| format!("read file {}", cfg_path.display()))?;
    let (config, codec) = load_project_config(&raw)
        .with_context(|| format!("load project from {}", cfg_path.display()))?;

    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let mut project = Project::open(config, codec, &cache_dir, cancel)
        .with_context(|| format!("open project from {}", cfg_path.display()))?;

    match cli.command {
        Command::Diff(args) => cmd_diff(&mut project, args, cli.format),
        Command::Propose(_) => Ok(project.propose()?),
    }
}

fn cmd_diff(project: &mut Project, args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let outcome: DiffOutcome = match format {
        OutputFormat::Json => {
            project.diff_state(&mut JsonSink::new(stdout.lock()), &args.base, &args.new)?
        }
        OutputFormat::Text if stdout.is_terminal() => {
            project.diff_state(&mut ColorSink::new(stdout.lock()), &args.base, &args.new)?
        }
        OutputFormat::Text => {
            project.diff_state(&mut TextSink::new(stdout.lock()), &args.base, &args.new)?
        }
    };
    outcome.into_result()?;
    Ok(())
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(CACHE_SUBDIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}
