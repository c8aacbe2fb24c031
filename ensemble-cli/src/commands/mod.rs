pub mod init;
pub mod status;
pub mod update;

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use ensemble_core::types::DeployOutcome;

/// Row of the per-component deployment summary table.
#[derive(Tabled)]
pub struct ComponentRow {
    #[tabled(rename = "component")]
    pub component: String,
    #[tabled(rename = "status")]
    pub status: String,
    #[tabled(rename = "files")]
    pub files: usize,
}

/// Shared summary printing for `init` and `update`.
pub fn print_deploy_summary(outcome: &DeployOutcome) {
    let rows: Vec<ComponentRow> = outcome
        .components
        .iter()
        .map(|(name, info)| ComponentRow {
            component: name.clone(),
            status: if info.success {
                "OK".green().bold().to_string()
            } else {
                format!(
                    "{} ({})",
                    "FAILED".red().bold(),
                    info.error.as_deref().unwrap_or("unknown error")
                )
            },
            files: info.count,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !outcome.merge_stats.is_empty() {
        println!("\n{}", "Merge details:".bold());
        for (component, stats) in &outcome.merge_stats {
            println!("  {}:", component.cyan());
            if !stats.updated.is_empty() {
                println!("    updated: {} item(s)", stats.updated.len());
            }
            if !stats.added.is_empty() {
                println!("    added: {} item(s)", stats.added.len());
            }
            if !stats.preserved.is_empty() {
                println!(
                    "    {} {} item(s)",
                    "preserved (your additions):".green(),
                    stats.preserved.len()
                );
                for item in &stats.preserved {
                    println!("      - {item}");
                }
            }
        }
    }

    println!("\nVersion: {}", outcome.version.dimmed());
    println!("Commit:  {}", short_commit(&outcome.commit).dimmed());
}

/// Abbreviate a commit identifier for display.
pub fn short_commit(commit: &str) -> &str {
    &commit[..commit.len().min(8)]
}
