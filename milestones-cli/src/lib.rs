//! `milestones` command surface.
//!
//! ## Commands
//!
//! - `milestones activate --milestone <N> --branch <BRANCH>`
//! - `milestones deactivate --milestone <N>`
//!
//! Each command loads the registry, applies one edit, and writes the file
//! back. Nothing is written when the edit fails.

#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use dawn_milestones::{MilestoneNumber, read_registry, write_registry};

/// Environment variable that overrides the registry location.
pub const REGISTRY_PATH_ENV: &str = "DAWN_MILESTONES_JSON";

/// Update the active milestones for the project.
#[derive(Debug, Parser)]
#[command(name = "milestones", version)]
pub struct MilestonesCli {
    /// Path to the milestones.json file to modify.
    #[arg(long = "milestones-json", env = REGISTRY_PATH_ENV, global = true)]
    pub milestones_json: Option<PathBuf>,

    /// Repository root used to locate the default milestones.json
    /// (defaults to current directory).
    #[arg(long = "cwd", short = 'C', global = true)]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: MilestonesSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum MilestonesSubcommand {
    /// Add an additional active milestone.
    Activate(ActivateArgs),
    /// Remove an active milestone.
    Deactivate(DeactivateArgs),
}

#[derive(Debug, Parser)]
pub struct ActivateArgs {
    /// The milestone identifier/release channel number.
    #[arg(long = "milestone")]
    pub milestone: MilestoneNumber,

    /// The branch name, which should correspond to a ref in refs/heads.
    #[arg(long = "branch", value_parser = NonEmptyStringValueParser::new())]
    pub branch: String,
}

#[derive(Debug, Parser)]
pub struct DeactivateArgs {
    /// The milestone identifier/release channel number.
    #[arg(long = "milestone")]
    pub milestone: MilestoneNumber,
}

/// Where the registry lives for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestonesConfig {
    pub registry_path: PathBuf,
}

impl MilestonesConfig {
    /// Resolve the registry path: an explicit path (flag or environment)
    /// wins, otherwise the default location under the repository root.
    pub fn resolve(explicit: Option<PathBuf>, repo_root: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(registry_path) = explicit {
            return Ok(Self { registry_path });
        }
        let repo_root = match repo_root {
            Some(root) => root,
            None => std::env::current_dir().context("resolving current directory")?,
        };
        Ok(Self {
            registry_path: dawn_milestones::default_registry_path(&repo_root),
        })
    }
}

/// Run a parsed command line.
pub fn run(cli: MilestonesCli) -> anyhow::Result<()> {
    let config = MilestonesConfig::resolve(cli.milestones_json, cli.cwd)?;
    match cli.command {
        MilestonesSubcommand::Activate(args) => activate(&config, args.milestone, &args.branch),
        MilestonesSubcommand::Deactivate(args) => deactivate(&config, args.milestone),
    }
}

/// Add `milestone` (cut from `branch`) to the registry file.
pub fn activate(
    config: &MilestonesConfig,
    milestone: MilestoneNumber,
    branch: &str,
) -> anyhow::Result<()> {
    let path = &config.registry_path;
    let mut registry = read_registry(path)?;
    let git_ref = registry
        .add(milestone, branch)
        .with_context(|| format!("activating milestone {milestone}"))?
        .git_ref
        .clone();
    write_registry(path, &registry)?;

    tracing::info!(
        "Activated milestone {milestone} ({git_ref}) in {}",
        path.display()
    );
    Ok(())
}

/// Remove `milestone` from the registry file.
pub fn deactivate(config: &MilestonesConfig, milestone: MilestoneNumber) -> anyhow::Result<()> {
    let path = &config.registry_path;
    let mut registry = read_registry(path)?;
    let removed = registry
        .remove(milestone)
        .with_context(|| format!("deactivating milestone {milestone}"))?;
    write_registry(path, &registry)?;

    tracing::info!(
        "Deactivated milestone {milestone} (branch {}) in {}; {} still active",
        removed.branch().unwrap_or(removed.git_ref.as_str()),
        path.display(),
        registry.len()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_path_wins_over_repo_root() {
        let config = MilestonesConfig::resolve(
            Some(PathBuf::from("/tmp/custom.json")),
            Some(PathBuf::from("/repo")),
        )
        .expect("resolve");
        assert_eq!(config.registry_path, PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn default_path_is_under_repo_root() {
        let config =
            MilestonesConfig::resolve(None, Some(PathBuf::from("/repo"))).expect("resolve");
        assert_eq!(
            config.registry_path,
            PathBuf::from("/repo/infra/config/global/milestones.json")
        );
    }

    #[test]
    fn parses_activate() {
        let cli = MilestonesCli::try_parse_from([
            "milestones",
            "--milestones-json",
            "m.json",
            "activate",
            "--milestone",
            "110",
            "--branch",
            "4678",
        ])
        .expect("parse");
        assert_eq!(cli.milestones_json, Some(PathBuf::from("m.json")));
        match cli.command {
            MilestonesSubcommand::Activate(args) => {
                assert_eq!(args.milestone.to_string(), "110");
                assert_eq!(args.branch, "4678");
            }
            other => panic!("expected activate, got {other:?}"),
        }
    }

    #[test]
    fn global_options_are_accepted_after_the_subcommand() {
        let cli = MilestonesCli::try_parse_from([
            "milestones",
            "deactivate",
            "--milestone",
            "9",
            "-C",
            "/repo",
        ])
        .expect("parse");
        assert_eq!(cli.cwd, Some(PathBuf::from("/repo")));
        assert!(matches!(cli.command, MilestonesSubcommand::Deactivate(_)));
    }

    #[test]
    fn rejects_bad_arguments() {
        let cases: &[&[&str]] = &[
            &["milestones"],
            &["milestones", "activate", "--milestone", "110"],
            &["milestones", "activate", "--branch", "4678"],
            &["milestones", "activate", "--milestone", "0", "--branch", "4678"],
            &["milestones", "activate", "--milestone", "m110", "--branch", "4678"],
            &["milestones", "activate", "--milestone", "110", "--branch", ""],
            &["milestones", "deactivate"],
        ];
        for args in cases {
            assert!(
                MilestonesCli::try_parse_from(args.iter().copied()).is_err(),
                "{args:?} should be rejected"
            );
        }
    }
}
