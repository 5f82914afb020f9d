//! Tool catalog entries and the closed set of directory categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An id that names no known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid category: {0:?} (expected one of: all, ide, agent, cli, builder, model)")]
pub struct InvalidCategory(pub String);

/// Directory categories. `All` is a pseudo-category used only for filtering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Ide,
    Agent,
    Cli,
    Builder,
    Model,
}

impl Category {
    /// Every category in tab order.
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Ide,
        Category::Agent,
        Category::Cli,
        Category::Builder,
        Category::Model,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Ide => "ide",
            Category::Agent => "agent",
            Category::Cli => "cli",
            Category::Builder => "builder",
            Category::Model => "model",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All Tools",
            Category::Ide => "AI IDEs",
            Category::Agent => "Agents",
            Category::Cli => "CLI Tools",
            Category::Builder => "App Builders",
            Category::Model => "Models",
        }
    }

    pub fn is_pseudo(&self) -> bool {
        matches!(self, Category::All)
    }

    /// Whether an entry tagged `other` passes this category's filter.
    pub fn admits(&self, other: Category) -> bool {
        self.is_pseudo() || *self == other
    }
}

impl FromStr for Category {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A tool listed in the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            url: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Case-insensitive substring match on name or description.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}
