//! `ensemble status` — show the persisted deployment record.
//!
//! Status never aborts: absence of a deployment is a normal outcome, not an
//! error.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use ensemble_core::{config, types::Metadata};
use ensemble_deploy::{checksum, metadata};

use super::short_commit;

/// Show the persisted deployment record.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// List deployed files with abbreviated checksums.
    #[arg(long)]
    pub files: bool,
}

#[derive(Serialize)]
struct NotDeployedJson {
    status: &'static str,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "component")]
    component: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "files")]
    files: usize,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let claude_dir = config::claude_dir(&cwd);

        // A corrupt record is reported, not fatal.
        let meta = match metadata::load(&claude_dir) {
            Ok(meta) => meta,
            Err(err) => {
                println!("{} {err}", "Warning:".yellow());
                None
            }
        };

        if self.json {
            match meta {
                Some(meta) => println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("failed to serialize metadata")?
                ),
                None => println!(
                    "{}",
                    serde_json::to_string(&NotDeployedJson {
                        status: "not_deployed"
                    })?
                ),
            }
            return Ok(());
        }

        if !claude_dir.exists() {
            println!("{}", "No .claude directory found.".yellow());
            println!("Run 'ensemble init' to deploy configurations.");
            return Ok(());
        }

        let Some(meta) = meta else {
            println!(
                "{}",
                ".claude directory exists but no ensemble metadata found.".yellow()
            );
            println!("This may be a manually created configuration.");
            show_directory_contents(&claude_dir)?;
            return Ok(());
        };

        print_record(&meta, self.files);
        Ok(())
    }
}

fn print_record(meta: &Metadata, with_files: bool) {
    println!("{}", "Ensemble deployment".green().bold());
    println!(
        "Version: {} | Commit: {}",
        meta.version,
        short_commit(&meta.commit)
    );
    println!(
        "Installed: {} | Updated: {}",
        meta.installed_at.format("%Y-%m-%d"),
        meta.updated_at.format("%Y-%m-%d")
    );

    println!("\n{}", "Deployed components:".bold());
    let rows: Vec<StatusRow> = config::components()
        .iter()
        .map(|component| {
            let name = &component.name.0;
            match meta.components.get(name) {
                Some(record) => StatusRow {
                    component: name.clone(),
                    status: "installed".green().to_string(),
                    files: record.files.len(),
                },
                None => StatusRow {
                    component: name.clone(),
                    status: "not installed".dimmed().to_string(),
                    files: 0,
                },
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if with_files {
        println!("\n{}", "Deployed files:".bold());
        for record in meta.components.values() {
            for file in &record.files {
                let digest = meta
                    .checksums
                    .get(file)
                    .map(|d| checksum::short(d))
                    .unwrap_or_else(|| "-".to_string());
                println!("  {digest}  {file}");
            }
        }
    }

    println!("\n{}", format!("Source: {}", meta.source).dimmed());
    println!("{}", format!("Branch: {}", meta.branch).dimmed());
}

fn show_directory_contents(claude_dir: &Path) -> Result<()> {
    println!("\n{}", "Directory contents:".bold());
    let mut entries: Vec<_> = std::fs::read_dir(claude_dir)
        .with_context(|| format!("failed to read {}", claude_dir.display()))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            let count = count_entries(&path);
            println!("  {}/ ({count} files)", name.blue());
        } else {
            println!("  {name}");
        }
    }
    Ok(())
}

fn count_entries(dir: &Path) -> usize {
    let mut count = 0;
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            count += count_entries(&path);
        } else {
            count += 1;
        }
    }
    count
}
