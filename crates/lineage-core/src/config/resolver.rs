//! Configuration resolution with hierarchical merge
//!
//! The `ConfigResolver` loads and merges configuration from multiple sources
//! in a defined hierarchy, with later sources overriding earlier ones.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::manifest::{Manifest, SyncStrategy};
use super::roles::BranchRoles;

/// Repository config file, relative to the working copy root
pub const CONFIG_PATH: &str = ".lineage/config.toml";

/// Git-ignored local override, relative to the working copy root
pub const LOCAL_CONFIG_PATH: &str = ".lineage/config.local.toml";

/// The final resolved configuration after merging all sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Name of the main branch
    pub main_branch: String,

    /// Configured perennial branches
    pub perennials: Vec<String>,

    /// Regex for perennial branch names
    pub perennial_regex: Option<String>,

    /// Remote used for publishing and status
    pub remote: String,

    /// Publish local-only branches when syncing
    pub push_new_branches: bool,

    /// Skip fetching and pushing during sync
    pub offline: bool,

    /// How feature branches take in remote and parent commits
    pub feature_strategy: SyncStrategy,

    /// How the main and perennial branches take in remote commits
    pub perennial_strategy: SyncStrategy,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            perennials: Vec::new(),
            perennial_regex: None,
            remote: "origin".to_string(),
            push_new_branches: false,
            offline: false,
            feature_strategy: SyncStrategy::Merge,
            perennial_strategy: SyncStrategy::Merge,
        }
    }
}

impl From<Manifest> for ResolvedConfig {
    fn from(manifest: Manifest) -> Self {
        let defaults = Self::default();
        Self {
            main_branch: manifest.branches.main.unwrap_or(defaults.main_branch),
            perennials: manifest.branches.perennials,
            perennial_regex: manifest.branches.perennial_regex,
            remote: manifest.sync.remote.unwrap_or(defaults.remote),
            push_new_branches: manifest
                .sync
                .push_new_branches
                .unwrap_or(defaults.push_new_branches),
            offline: manifest.sync.offline.unwrap_or(defaults.offline),
            feature_strategy: manifest
                .sync
                .feature_strategy
                .unwrap_or(defaults.feature_strategy),
            perennial_strategy: manifest
                .sync
                .perennial_strategy
                .unwrap_or(defaults.perennial_strategy),
        }
    }
}

impl ResolvedConfig {
    /// Build the root/perennial classification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `perennial_regex` does not compile.
    pub fn roles(&self) -> Result<BranchRoles> {
        let mut roles =
            BranchRoles::new(self.main_branch.clone()).with_perennials(self.perennials.clone());
        if let Some(pattern) = &self.perennial_regex {
            let regex = Regex::new(pattern).map_err(|e| Error::InvalidConfig {
                message: format!("perennial_regex {pattern:?}: {e}"),
            })?;
            roles = roles.with_perennial_regex(regex);
        }
        Ok(roles)
    }
}

/// Resolves configuration by merging multiple sources
///
/// Configuration is loaded from a hierarchy of sources:
/// 1. Global defaults (`<config_dir>/lineage/config.toml`)
/// 2. Repository config (`.lineage/config.toml`)
/// 3. Local overrides (`.lineage/config.local.toml`) - git-ignored
///
/// Later sources override earlier ones.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    /// Working copy root directory
    root: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform-appropriate directory is used via `dirs::config_dir()`.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create a new configuration resolver for the given working copy root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    ///
    /// This is primarily useful for testing, where you need to control
    /// the global config path without affecting the real user config.
    pub fn with_global_config_dir(root: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("lineage"))
    }

    /// Resolve the configuration by merging all sources
    ///
    /// Missing layers are silently skipped. Invalid TOML in any layer
    /// produces an error.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut manifest = Manifest::default();

        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join("config.toml");
            if global_config_path.is_file() {
                tracing::debug!(?global_config_path, "Loading global config (layer 1)");
                merge_file(&mut manifest, &global_config_path)?;
            } else {
                tracing::debug!(
                    ?global_config_path,
                    "No global config found (layer 1), skipping"
                );
            }
        }

        let repo_config_path = self.config_path();
        if repo_config_path.is_file() {
            tracing::debug!(?repo_config_path, "Loading repo config (layer 2)");
            merge_file(&mut manifest, &repo_config_path)?;
        }

        let local_config_path = self.local_config_path();
        if local_config_path.is_file() {
            tracing::debug!(?local_config_path, "Loading local config (layer 3)");
            merge_file(&mut manifest, &local_config_path)?;
        }

        Ok(ResolvedConfig::from(manifest))
    }

    /// Load only the repository layer, for editing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when the file does not exist.
    pub fn load_repo_manifest(&self) -> Result<Manifest> {
        let path = self.config_path();
        if !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }
        Manifest::parse(&fs::read_to_string(&path)?)
    }

    /// Write the repository layer, creating `.lineage/` if needed.
    pub fn save_repo_manifest(&self, manifest: &Manifest) -> Result<()> {
        let path = self.config_path();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, manifest.to_toml()?)?;
        Ok(())
    }

    /// Get the working copy root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the repository config file
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_PATH)
    }

    /// Path of the local override file
    pub fn local_config_path(&self) -> PathBuf {
        self.root.join(LOCAL_CONFIG_PATH)
    }

    /// Check if a repository configuration exists
    pub fn has_config(&self) -> bool {
        self.config_path().is_file()
    }
}

fn merge_file(manifest: &mut Manifest, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    manifest.merge(&Manifest::parse(&content)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver(root: &Path, global: &Path) -> ConfigResolver {
        ConfigResolver::with_global_config_dir(root, global.to_path_buf())
    }

    #[test]
    fn resolve_returns_defaults_when_no_config_exists() {
        let temp_dir = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let config = resolver(temp_dir.path(), global.path()).resolve().unwrap();

        assert_eq!(config, ResolvedConfig::default());
        assert_eq!(config.main_branch, "main");
        assert_eq!(config.remote, "origin");
    }

    #[test]
    fn local_overrides_repo_and_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            global.path().join("config.toml"),
            "[branches]\nmain = \"master\"\n",
        )
        .unwrap();
        fs::create_dir_all(temp_dir.path().join(".lineage")).unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_PATH),
            "[branches]\nmain = \"trunk\"\nperennials = [\"qa\"]\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join(LOCAL_CONFIG_PATH),
            "[sync]\nremote = \"upstream\"\n",
        )
        .unwrap();

        let config = resolver(temp_dir.path(), global.path()).resolve().unwrap();

        assert_eq!(config.main_branch, "trunk");
        assert_eq!(config.perennials, vec!["qa"]);
        assert_eq!(config.remote, "upstream");
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let config = ResolvedConfig {
            perennial_regex: Some("(".to_string()),
            ..ResolvedConfig::default()
        };
        let err = config.roles().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn save_then_load_repo_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let resolver = resolver(temp_dir.path(), global.path());
        assert!(matches!(
            resolver.load_repo_manifest(),
            Err(Error::ConfigNotFound { .. })
        ));

        let mut manifest = Manifest::default();
        manifest.branches.perennials.push("release".to_string());
        resolver.save_repo_manifest(&manifest).unwrap();

        assert!(resolver.has_config());
        assert_eq!(resolver.load_repo_manifest().unwrap(), manifest);
    }
}
