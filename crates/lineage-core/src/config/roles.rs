//! Root and perennial branch classification derived from configuration

use std::collections::BTreeSet;

use regex::Regex;

/// Which branches are roots of the hierarchy according to configuration.
///
/// The main branch and configured perennials are roots. Branches marked
/// perennial in the lineage file are added on top by
/// [`Hierarchy`](crate::lineage::Hierarchy).
#[derive(Debug, Clone)]
pub struct BranchRoles {
    main: String,
    perennials: BTreeSet<String>,
    perennial_regex: Option<Regex>,
}

impl BranchRoles {
    pub fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            perennials: BTreeSet::new(),
            perennial_regex: None,
        }
    }

    pub fn with_perennials<I, S>(mut self, perennials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.perennials.extend(perennials.into_iter().map(Into::into));
        self
    }

    pub fn with_perennial_regex(mut self, regex: Regex) -> Self {
        self.perennial_regex = Some(regex);
        self
    }

    /// Name of the main branch.
    pub fn main(&self) -> &str {
        &self.main
    }

    /// Configured perennial names (the regex is not expanded).
    pub fn perennials(&self) -> &BTreeSet<String> {
        &self.perennials
    }

    /// Whether configuration makes `name` perennial.
    pub fn is_perennial(&self, name: &str) -> bool {
        self.perennials.contains(name)
            || self
                .perennial_regex
                .as_ref()
                .is_some_and(|re| re.is_match(name))
    }

    /// Main or configured perennial.
    pub fn is_root(&self, name: &str) -> bool {
        name == self.main || self.is_perennial(name)
    }
}

impl Default for BranchRoles {
    fn default() -> Self {
        Self::new("main")
    }
}
