//! `ensemble update` — re-deploy from the previously recorded source.
//!
//! Updates always run in merge mode: preserving user additions is the
//! tool's core guarantee, and `init --force` remains the explicit
//! destructive path.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use inquire::Confirm;
use tabled::{settings::Style, Table, Tabled};

use ensemble_core::{config, types::DeployMode};
use ensemble_deploy::{deploy, metadata, SourceTree};

use super::print_deploy_summary;

/// Re-deploy from the previously recorded source.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Specific component to update (e.g. "agents"); all when omitted.
    pub component: Option<String>,

    /// Preview the update without applying it.
    #[arg(long)]
    pub dry_run: bool,

    /// Apply without a confirmation prompt.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Override the recorded source repository.
    #[arg(long, short = 's')]
    pub source: Option<String>,

    /// Override the recorded source branch.
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

#[derive(Tabled)]
struct CompareRow {
    #[tabled(rename = "component")]
    component: String,
    #[tabled(rename = "local")]
    local: usize,
    #[tabled(rename = "remote")]
    remote: usize,
    #[tabled(rename = "status")]
    status: String,
}

impl UpdateArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let claude_dir = config::claude_dir(&cwd);

        let Some(meta) = metadata::load(&claude_dir).context("failed to read metadata")? else {
            bail!("no deployment found; run 'ensemble init' first");
        };

        let source = self.source.clone().unwrap_or_else(|| meta.source.clone());
        let branch = self.branch.clone().unwrap_or_else(|| meta.branch.clone());

        let components = match &self.component {
            Some(name) => {
                let Some(component) = config::component(name) else {
                    let available: Vec<String> = config::components()
                        .iter()
                        .map(|c| c.name.0.clone())
                        .collect();
                    bail!(
                        "unknown component '{name}'; available: {}",
                        available.join(", ")
                    );
                };
                vec![component]
            }
            None => config::components(),
        };

        println!("{} {source} ({branch})", "Checking for updates from:".blue());
        let tree = SourceTree::acquire(&source, &branch)
            .context("failed to fetch remote configuration")?;
        let manifest = tree.manifest().context("failed to scan source manifest")?;

        let mut updates_available = false;
        let rows: Vec<CompareRow> = components
            .iter()
            .map(|component| {
                let name = &component.name.0;
                let local = meta
                    .components
                    .get(name)
                    .map(|record| record.files.len())
                    .unwrap_or(0);
                let remote = manifest.count(name);
                let status = if remote != local {
                    updates_available = true;
                    "update available".yellow().to_string()
                } else {
                    "up to date".green().to_string()
                };
                CompareRow {
                    component: name.clone(),
                    local,
                    remote,
                    status,
                }
            })
            .collect();

        println!("\n{}", "Component status:".bold());
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        if !updates_available {
            println!("\n{}", "All components are up to date.".green());
            return Ok(());
        }

        if self.dry_run {
            println!("\n{}", "Dry run - no changes applied".yellow());
            return Ok(());
        }

        if !self.force {
            let proceed = Confirm::new("Proceed with update?")
                .with_default(true)
                .prompt()
                .context("confirmation prompt failed")?;
            if !proceed {
                bail!("aborted");
            }
        }

        let outcome =
            deploy(&tree, &cwd, &components, DeployMode::Merge).context("update failed")?;

        println!("\n{}", "Update complete".green().bold());
        print_deploy_summary(&outcome);
        Ok(())
    }
}
