use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use statectl_project::DEFAULT_CONFIG_FILE;
use statectl_types::Ref;

#[derive(Parser)]
#[command(name = "statectl", about = "Control state of your deployments.", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log filtering level.
    #[arg(long = "log.level", global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format to use.
    #[arg(long = "log.format", global = true, value_enum, default_value = "logfmt")]
    pub log_format: LogFormat,

    /// Path for cache (e.g git repo checkouts). Defaults to the user cache
    /// directory.
    #[arg(long = "cache.dir", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Path for the YAML project configuration. All commands relate to one
    /// project.
    #[arg(long = "project.config-file", global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Diff output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Logfmt,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print diff between states.
    Diff(DiffArgs),
    /// Propose change of cluster state.
    Propose(ProposeArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Diff(_) => "diff",
            Command::Propose(_) => "propose",
        }
    }
}

#[derive(Args)]
pub struct DiffArgs {
    /// Git commit or tag of state git repository to use as base.
    #[arg(value_name = "base-state-sha", value_parser = parse_ref)]
    pub base: Ref,
    /// Git commit or tag of state git repository to compare with.
    #[arg(value_name = "new-state-sha", value_parser = parse_ref)]
    pub new: Ref,
}

#[derive(Args)]
pub struct ProposeArgs {}

fn parse_ref(raw: &str) -> Result<Ref, statectl_types::TypeError> {
    Ref::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["statectl", "diff", "v1.0", "main"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.base, Ref::new("v1.0"));
            assert_eq!(args.new, Ref::new("main"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn diff_requires_both_refs() {
        assert!(Cli::try_parse_from(["statectl", "diff", "v1.0"]).is_err());
        assert!(Cli::try_parse_from(["statectl", "diff"]).is_err());
    }

    #[test]
    fn diff_rejects_blank_ref() {
        assert!(Cli::try_parse_from(["statectl", "diff", "", "main"]).is_err());
    }

    #[test]
    fn parse_propose() {
        let cli = Cli::try_parse_from(["statectl", "propose"]).unwrap();
        assert!(matches!(cli.command, Command::Propose(_)));
        assert_eq!(cli.command.name(), "propose");
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["statectl", "propose"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.log_format, LogFormat::Logfmt);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.config_file, PathBuf::from("./.statectl.yaml"));
        assert!(cli.cache_dir.is_none());
    }

    #[test]
    fn dotted_flags() {
        let cli = Cli::try_parse_from([
            "statectl",
            "--log.level",
            "debug",
            "--log.format",
            "json",
            "--cache.dir",
            "/tmp/cache",
            "--project.config-file",
            "proj.yaml",
            "diff",
            "a",
            "b",
        ])
        .unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/cache")));
        assert_eq!(cli.config_file, PathBuf::from("proj.yaml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["statectl", "diff", "a", "b", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_log_level_rejected() {
        assert!(Cli::try_parse_from(["statectl", "--log.level", "trace", "propose"]).is_err());
    }
}
