//! `ensemble init` — first deployment into the current project.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use inquire::{Confirm, MultiSelect, Select};
use tabled::{settings::Style, Table, Tabled};

use ensemble_core::{
    config,
    types::{Component, DeployMode},
};
use ensemble_deploy::{deploy, SourceTree};

use super::print_deploy_summary;

/// Deploy a bundle into the current project for the first time.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Source repository URL or local path.
    #[arg(long, short = 's', default_value = config::DEFAULT_SOURCE)]
    pub source: String,

    /// Source repository branch.
    #[arg(long, short = 'b', default_value = config::DEFAULT_BRANCH)]
    pub branch: String,

    /// Back up an existing .claude directory, then deploy fresh.
    #[arg(long, conflicts_with_all = ["merge", "force"])]
    pub backup: bool,

    /// Merge with an existing .claude directory, preserving user additions.
    #[arg(long, conflicts_with = "force")]
    pub merge: bool,

    /// Force overwrite without any confirmation.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Preview operations without executing.
    #[arg(long)]
    pub dry_run: bool,

    /// Only deploy agents.
    #[arg(long, conflicts_with_all = ["commands_only", "skills_only", "select"])]
    pub agents_only: bool,

    /// Only deploy commands.
    #[arg(long, conflicts_with_all = ["skills_only", "select"])]
    pub commands_only: bool,

    /// Only deploy skills.
    #[arg(long, conflicts_with = "select")]
    pub skills_only: bool,

    /// Interactively select components to deploy.
    #[arg(long)]
    pub select: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let claude_dir = config::claude_dir(&cwd);
        let interactive = !(self.backup || self.merge || self.force || self.dry_run);

        if interactive && !cwd.join(".git").exists() {
            let proceed = Confirm::new("Current directory is not a git repository. Continue?")
                .with_default(false)
                .prompt()
                .context("confirmation prompt failed")?;
            if !proceed {
                bail!("aborted");
            }
        }

        let components = self.pick_components()?;
        if components.is_empty() {
            bail!("no components selected");
        }

        let mut mode = DeployMode::Overwrite;
        let mut backup_path: Option<PathBuf> = None;
        if claude_dir.exists() {
            if self.dry_run {
                println!("{}", "Existing .claude directory found".yellow());
                if self.merge {
                    println!("  Would merge with the existing directory");
                    mode = DeployMode::Merge;
                } else if self.backup {
                    println!("  Would back up the existing directory before deploying");
                } else if self.force {
                    println!("  Would overwrite the existing directory");
                } else {
                    println!("  Would prompt for a handling strategy");
                }
            } else {
                match self.existing_strategy()? {
                    Strategy::Abort => bail!("aborted"),
                    Strategy::Merge => mode = DeployMode::Merge,
                    Strategy::Backup => backup_path = Some(backup_and_remove(&claude_dir)?),
                    Strategy::Overwrite => {
                        std::fs::remove_dir_all(&claude_dir).with_context(|| {
                            format!("failed to remove {}", claude_dir.display())
                        })?;
                        println!("  {}", "Removed existing .claude directory".yellow());
                    }
                }
            }
        }

        println!(
            "\n{} {} ({})",
            "Fetching configuration from:".blue(),
            self.source,
            self.branch
        );
        let tree = SourceTree::acquire(&self.source, &self.branch)
            .context("failed to acquire source tree")?;

        if self.dry_run {
            println!("\n{}", "Dry run mode - no changes will be made".yellow());
            preview_deployment(&tree, &components, mode)?;
            return Ok(());
        }

        let outcome = deploy(&tree, &cwd, &components, mode).context("deployment failed")?;

        println!("\n{}", "Deployment complete".green().bold());
        println!("Mode: {}", outcome.mode);
        if let Some(backup) = &backup_path {
            println!("Backup: {}", backup.display());
        }
        print_deploy_summary(&outcome);

        println!("\n{}", "Next steps:".bold());
        println!("  1. Review deployed configurations in .claude/");
        println!("  2. Run 'ensemble status' to verify the deployment");
        Ok(())
    }

    fn pick_components(&self) -> Result<Vec<Component>> {
        let all = config::components();
        if self.agents_only {
            return Ok(all.into_iter().filter(|c| c.name.0 == "agents").collect());
        }
        if self.commands_only {
            return Ok(all.into_iter().filter(|c| c.name.0 == "commands").collect());
        }
        if self.skills_only {
            return Ok(all.into_iter().filter(|c| c.name.0 == "skills").collect());
        }
        if self.select {
            let names: Vec<String> = all.iter().map(|c| c.name.0.clone()).collect();
            let picked = MultiSelect::new("Select components to deploy:", names)
                .prompt()
                .context("component selection failed")?;
            return Ok(all
                .into_iter()
                .filter(|c| picked.contains(&c.name.0))
                .collect());
        }
        Ok(all)
    }

    fn existing_strategy(&self) -> Result<Strategy> {
        if self.force {
            return Ok(Strategy::Overwrite);
        }
        if self.backup {
            return Ok(Strategy::Backup);
        }
        if self.merge {
            println!("  {}", "Will merge with the existing configuration".blue());
            return Ok(Strategy::Merge);
        }

        println!("\n{}", "Existing .claude directory found".yellow());
        println!("  {} - keep your additions, update source files", "merge".cyan());
        println!(
            "  {} - save the existing .claude aside, then deploy fresh",
            "backup".cyan()
        );
        println!(
            "  {} - remove the existing directory and deploy fresh",
            "overwrite".cyan()
        );
        println!("  {} - cancel the operation", "abort".cyan());
        let choice = Select::new(
            "How should the existing configuration be handled?",
            vec!["merge", "backup", "overwrite", "abort"],
        )
        .prompt()
        .context("strategy prompt failed")?;

        Ok(match choice {
            "merge" => Strategy::Merge,
            "backup" => Strategy::Backup,
            "overwrite" => Strategy::Overwrite,
            _ => Strategy::Abort,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Merge,
    Backup,
    Overwrite,
    Abort,
}

/// Move the existing `.claude` aside to `.claude-backup-<timestamp>`.
fn backup_and_remove(claude_dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup = claude_dir.with_file_name(format!(".claude-backup-{timestamp}"));
    std::fs::rename(claude_dir, &backup)
        .with_context(|| format!("failed to back up {}", claude_dir.display()))?;
    println!("  {} {}", "Backed up to:".green(), backup.display());
    Ok(backup)
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "component")]
    component: String,
    #[tabled(rename = "children")]
    children: String,
}

/// Shallow manifest preview for `--dry-run`.
fn preview_deployment(
    tree: &SourceTree,
    components: &[Component],
    mode: DeployMode,
) -> Result<()> {
    println!("\nDeploy mode: {mode}");
    let manifest = tree.manifest().context("failed to scan source manifest")?;

    let rows: Vec<PreviewRow> = components
        .iter()
        .map(|component| {
            let children = manifest.children(&component.name.0);
            let mut shown: Vec<&str> = children.iter().take(5).map(String::as_str).collect();
            if children.len() > shown.len() {
                shown.push("...");
            }
            PreviewRow {
                component: component.name.0.clone(),
                children: shown.join(", "),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if mode == DeployMode::Merge {
        println!("{}", "Merge mode will preserve your custom additions".dimmed());
    }
    Ok(())
}
