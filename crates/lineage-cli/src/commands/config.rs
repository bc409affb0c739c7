//! Config command implementations

use std::path::Path;

use colored::Colorize;

use lineage_core::{ConfigResolver, Error as CoreError, Manifest};

use super::open;
use crate::error::Result;

/// Print the resolved configuration as TOML.
pub fn run_config_show(path: &Path) -> Result<()> {
    let ctx = open(path)?;
    print!("{}", toml::to_string_pretty(ctx.config())?);
    Ok(())
}

/// Write the main branch into `.lineage/config.toml`, keeping other settings.
pub fn run_config_main(path: &Path, name: &str) -> Result<()> {
    let ctx = open(path)?;
    let resolver = ConfigResolver::new(ctx.root());

    let mut manifest = match resolver.load_repo_manifest() {
        Ok(manifest) => manifest,
        Err(CoreError::ConfigNotFound { .. }) => Manifest::default(),
        Err(e) => return Err(e.into()),
    };
    manifest.branches.main = Some(name.to_string());
    resolver.save_repo_manifest(&manifest)?;

    println!(
        "{} Main branch set to {} in {}.",
        "OK".green().bold(),
        name.cyan(),
        resolver.config_path().display()
    );
    Ok(())
}
