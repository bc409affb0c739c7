//! Manifest parsing for config.toml files
//!
//! The manifest represents the parsed configuration from a single config.toml
//! file. Every value is optional so that layers can be merged: a value set in a
//! later layer wins, an absent one leaves the earlier value alone.

use crate::Result;
use serde::{Deserialize, Serialize};

/// `[branches]` section: which branches are roots of the hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchesSection {
    /// Name of the main branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Explicitly perennial branches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perennials: Vec<String>,

    /// Branches whose name matches this regex are perennial
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perennial_regex: Option<String>,
}

/// How a branch takes in commits from its remote-tracking branch or parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStrategy {
    #[default]
    Merge,
    Rebase,
}

/// `[sync]` section: how branches are updated and published
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Remote used for publishing and status (defaults to "origin")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Publish local-only branches when syncing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_new_branches: Option<bool>,

    /// Never fetch or push; sync against the remote-tracking refs already
    /// present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,

    /// Strategy for feature branches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_strategy: Option<SyncStrategy>,

    /// Strategy for the main and perennial branches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perennial_strategy: Option<SyncStrategy>,
}

/// Configuration manifest parsed from one config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub branches: BranchesSection,

    #[serde(default)]
    pub sync: SyncSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use lineage_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [branches]
    /// main = "trunk"
    /// perennials = ["release"]
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.branches.main.as_deref(), Some("trunk"));
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another manifest into this one
    ///
    /// `other` takes precedence for scalar values; perennial lists are
    /// extended with values not already present.
    pub fn merge(&mut self, other: &Manifest) {
        if other.branches.main.is_some() {
            self.branches.main = other.branches.main.clone();
        }
        for perennial in &other.branches.perennials {
            if !self.branches.perennials.contains(perennial) {
                self.branches.perennials.push(perennial.clone());
            }
        }
        if other.branches.perennial_regex.is_some() {
            self.branches.perennial_regex = other.branches.perennial_regex.clone();
        }

        if other.sync.remote.is_some() {
            self.sync.remote = other.sync.remote.clone();
        }
        if other.sync.push_new_branches.is_some() {
            self.sync.push_new_branches = other.sync.push_new_branches;
        }
        if other.sync.offline.is_some() {
            self.sync.offline = other.sync.offline;
        }
        if other.sync.feature_strategy.is_some() {
            self.sync.feature_strategy = other.sync.feature_strategy;
        }
        if other.sync.perennial_strategy.is_some() {
            self.sync.perennial_strategy = other.sync.perennial_strategy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_manifest_uses_defaults() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn merge_overrides_scalars_and_extends_perennials() {
        let mut base = Manifest::parse(
            r#"
[branches]
main = "main"
perennials = ["release"]

[sync]
push_new_branches = true
"#,
        )
        .unwrap();
        let overlay = Manifest::parse(
            r#"
[branches]
main = "trunk"
perennials = ["release", "staging"]
"#,
        )
        .unwrap();

        base.merge(&overlay);

        assert_eq!(base.branches.main.as_deref(), Some("trunk"));
        assert_eq!(base.branches.perennials, vec!["release", "staging"]);
        assert_eq!(base.sync.push_new_branches, Some(true));
    }

    #[test]
    fn parse_sync_strategies_and_offline() {
        let manifest = Manifest::parse(
            r#"
[sync]
offline = true
feature_strategy = "rebase"
"#,
        )
        .unwrap();

        assert_eq!(manifest.sync.offline, Some(true));
        assert_eq!(manifest.sync.feature_strategy, Some(SyncStrategy::Rebase));
        assert_eq!(manifest.sync.perennial_strategy, None);

        let mut base = Manifest::default();
        base.sync.perennial_strategy = Some(SyncStrategy::Rebase);
        base.merge(&manifest);
        assert_eq!(base.sync.perennial_strategy, Some(SyncStrategy::Rebase));
        assert_eq!(base.sync.feature_strategy, Some(SyncStrategy::Rebase));
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Manifest::parse("[sync]\nfeature_strategy = \"squash\"\n").is_err());
    }
}
