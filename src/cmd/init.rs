//! Initialize concept-lint in a project directory

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use concept_lint::config::DEFAULT_CONFIG;
use concept_lint::paths::{CONFIG_DIR, CONFIG_FILE};

/// Write the default configuration into `root`. Never overwrites without `force`.
pub fn cmd_init(root: &Path, force: bool) -> Result<()> {
    let path = root.join(CONFIG_FILE);

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    fs::create_dir_all(root.join(CONFIG_DIR))
        .with_context(|| format!("Failed to create {}", root.join(CONFIG_DIR).display()))?;
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} Created {}", "✓".green(), path.display());
    println!(
        "{} Edit paths.specs and paths.implementations, then run {}",
        "→".cyan(),
        "concept-lint validate".bold()
    );
    Ok(())
}
