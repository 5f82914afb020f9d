//! The tool directory: built-in catalog and the category/search filter.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use dy_protocol::{CatalogEntry, Category, InvalidCategory};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Shown when no entry passes the filter.
pub const EMPTY_RESULT_MESSAGE: &str = "No tools found matching your search.";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate catalog entry: {0}")]
    DuplicateName(String),
    #[error("entry {0} is tagged with the pseudo-category \"all\"")]
    PseudoCategory(String),
}

/// The tools listed on the directory page, in display order.
pub fn builtin() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            "Cursor",
            "The AI-native code editor. Built on VS Code, it features advanced code completion and natural language editing.",
            Category::Ide,
        )
        .with_url("https://cursor.com")
        .with_tags(&["Popular", "VS Code"]),
        CatalogEntry::new(
            "Windsurf",
            "The first agentic IDE. Combines deep context with agentic capabilities for seamless development.",
            Category::Ide,
        )
        .with_url("https://codeium.com/windsurf")
        .with_tags(&["Agentic", "Context-Aware"]),
        CatalogEntry::new(
            "Cline",
            "An open-source AI assistant for VS Code that can use your CLI, read/write files, and more.",
            Category::Agent,
        )
        .with_url("https://github.com/cline/cline")
        .with_tags(&["Open Source", "VS Code"]),
        CatalogEntry::new(
            "GitHub Copilot",
            "The world's most widely used AI developer tool, integrated directly into your editor.",
            Category::Agent,
        )
        .with_url("https://github.com/features/copilot")
        .with_tags(&["Enterprise", "Cloud"]),
        CatalogEntry::new(
            "Claude Code",
            "An agentic CLI tool that lives in your terminal and helps you build, test, and ship code.",
            Category::Cli,
        )
        .with_url("https://claude.ai")
        .with_tags(&["CLI", "Anthropic"]),
        CatalogEntry::new(
            "v0.dev",
            "Generative UI system by Vercel. Build high-quality React components from natural language.",
            Category::Builder,
        )
        .with_url("https://v0.dev")
        .with_tags(&["UI", "Vercel"]),
        CatalogEntry::new(
            "Lovable",
            "A full-stack app builder that creates production-ready apps from your descriptions.",
            Category::Builder,
        )
        .with_url("https://lovable.dev")
        .with_tags(&["Fullstack", "No-code"]),
        CatalogEntry::new(
            "Devin",
            "The first AI software engineer. Capable of planning and executing complex engineering tasks autonomously.",
            Category::Agent,
        )
        .with_url("https://cognition.ai")
        .with_tags(&["Autonomous", "Async"]),
        CatalogEntry::new(
            "Trae",
            "An adaptive AI IDE from ByteDance that transforms the way developers build software.",
            Category::Ide,
        )
        .with_url("https://trae.sh")
        .with_tags(&["Adaptive", "New"]),
        CatalogEntry::new(
            "Roo Code",
            "A fork of Cline focusing on community-driven features and advanced agentic capabilities.",
            Category::Agent,
        )
        .with_url("https://github.com/RooCode/Roo-Code")
        .with_tags(&["Open Source", "Community"]),
        CatalogEntry::new(
            "Bolt.new",
            "A full-stack web development agent in the browser, powered by StackBlitz.",
            Category::Builder,
        )
        .with_url("https://bolt.new")
        .with_tags(&["Browser-based", "Fast"]),
    ]
}

/// Check catalog invariants: unique names, no entry tagged `all`.
pub fn validate(entries: &[CatalogEntry]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.category.is_pseudo() {
            return Err(CatalogError::PseudoCategory(entry.name.clone()));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(CatalogError::DuplicateName(entry.name.clone()));
        }
    }
    Ok(())
}

/// Load a catalog from a JSON array of entries.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&contents)?;
    validate(&entries)?;
    debug!(path = %path.display(), count = entries.len(), "loaded catalog");
    Ok(entries)
}

/// Sent after every filter change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChanged {
    pub category: Category,
    pub query: String,
    /// Names of the visible entries, in catalog order.
    pub visible: Vec<String>,
}

/// Category and free-text filter over an immutable catalog.
pub struct CatalogFilter {
    entries: Vec<CatalogEntry>,
    active_category: Category,
    search_query: String,
    /// Indices into `entries`, recomputed on every change.
    visible: Vec<usize>,
    subscribers: Vec<mpsc::Sender<FilterChanged>>,
}

impl CatalogFilter {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut filter = Self {
            entries,
            active_category: Category::All,
            search_query: String::new(),
            visible: Vec::new(),
            subscribers: Vec::new(),
        };
        filter.recompute();
        filter
    }

    pub fn builtin() -> Self {
        Self::new(builtin())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn active_category(&self) -> Category {
        self.active_category
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Category tabs in display order.
    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    /// Select a category by id. Unknown ids leave the filter untouched.
    pub fn set_category(&mut self, id: &str) -> Result<(), InvalidCategory> {
        let category: Category = id.parse()?;
        self.active_category = category;
        self.recompute();
        Ok(())
    }

    /// Set the search text verbatim; matching is case-insensitive.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.recompute();
    }

    /// Reset category and search to their defaults with a single notification.
    pub fn clear_filters(&mut self) {
        self.active_category = Category::All;
        self.search_query.clear();
        self.recompute();
    }

    pub fn visible_entries(&self) -> Vec<&CatalogEntry> {
        self.visible.iter().map(|&i| &self.entries[i]).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Whether the empty-state message should be shown.
    pub fn is_empty_result(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<FilterChanged> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn recompute(&mut self) {
        let category = self.active_category;
        let query = self.search_query.as_str();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| category.admits(e.category) && e.matches_query(query))
            .map(|(i, _)| i)
            .collect();

        debug!(
            category = %category,
            query,
            visible = self.visible.len(),
            "catalog filter recomputed"
        );

        if self.subscribers.is_empty() {
            return;
        }
        let event = FilterChanged {
            category,
            query: self.search_query.clone(),
            visible: self
                .visible
                .iter()
                .map(|&i| self.entries[i].name.clone())
                .collect(),
        };
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(filter: &CatalogFilter) -> Vec<&str> {
        filter
            .visible_entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let entries = builtin();
        assert_eq!(entries.len(), 11);
        validate(&entries).unwrap();
    }

    #[test]
    fn defaults_show_everything() {
        let filter = CatalogFilter::builtin();
        assert_eq!(filter.active_category(), Category::All);
        assert_eq!(filter.search_query(), "");
        assert_eq!(filter.visible_count(), 11);
        assert_eq!(names(&filter)[0], "Cursor");
        assert_eq!(names(&filter)[10], "Bolt.new");
    }

    #[test]
    fn category_keeps_catalog_order() {
        let mut filter = CatalogFilter::builtin();
        filter.set_category("ide").unwrap();
        assert_eq!(names(&filter), vec!["Cursor", "Windsurf", "Trae"]);

        filter.set_category("agent").unwrap();
        assert_eq!(
            names(&filter),
            vec!["Cline", "GitHub Copilot", "Devin", "Roo Code"]
        );
    }

    #[test]
    fn model_category_is_empty() {
        let mut filter = CatalogFilter::builtin();
        filter.set_category("model").unwrap();
        assert!(filter.is_empty_result());
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut filter = CatalogFilter::builtin();
        filter.set_search_query("cursor");
        let lower = names(&filter)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert_eq!(lower, vec!["Cursor"]);

        filter.set_search_query("CURSOR");
        assert_eq!(names(&filter), lower);
    }

    #[test]
    fn search_matches_description() {
        let mut filter = CatalogFilter::builtin();
        filter.set_search_query("vs code");
        assert_eq!(names(&filter), vec!["Cursor", "Cline"]);
    }

    #[test]
    fn search_does_not_match_tags() {
        let mut filter = CatalogFilter::builtin();
        filter.set_search_query("Enterprise");
        assert!(filter.is_empty_result());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let mut filter = CatalogFilter::builtin();
        filter.set_category("builder").unwrap();
        filter.set_search_query("full-stack");
        assert_eq!(names(&filter), vec!["Lovable", "Bolt.new"]);
    }

    #[test]
    fn clear_filters_restores_full_catalog() {
        let mut filter = CatalogFilter::builtin();
        filter.set_category("ide").unwrap();
        filter.set_search_query("zzz-no-match");
        assert!(filter.is_empty_result());

        filter.clear_filters();
        let all: Vec<_> = builtin().into_iter().map(|e| e.name).collect();
        assert_eq!(names(&filter), all);
    }

    #[test]
    fn invalid_category_leaves_state_unchanged() {
        let mut filter = CatalogFilter::builtin();
        filter.set_category("cli").unwrap();
        filter.set_search_query("agentic");

        let err = filter.set_category("not-a-real-category").unwrap_err();
        assert_eq!(err, InvalidCategory("not-a-real-category".to_string()));
        assert_eq!(filter.active_category(), Category::Cli);
        assert_eq!(filter.search_query(), "agentic");
        assert_eq!(names(&filter), vec!["Claude Code"]);
    }

    #[test]
    fn query_stored_verbatim() {
        let mut filter = CatalogFilter::builtin();
        filter.set_search_query("  cursor ");
        assert_eq!(filter.search_query(), "  cursor ");
        assert!(filter.is_empty_result());
    }

    #[test]
    fn subscribers_see_each_change_once() {
        let mut filter = CatalogFilter::builtin();
        let events = filter.subscribe();

        filter.set_category("ide").unwrap();
        let _ = filter.set_category("bogus");
        filter.set_search_query("trae");
        filter.clear_filters();

        let got: Vec<_> = events.try_iter().collect();
        assert_eq!(got.len(), 3);
        assert_eq!(got[1].visible, vec!["Trae".to_string()]);
        assert_eq!(got[2].category, Category::All);
        assert_eq!(got[2].query, "");
        assert_eq!(got[2].visible.len(), 11);
    }

    #[test]
    fn validate_rejects_duplicates() {
        let entries = vec![
            CatalogEntry::new("Same", "a", Category::Ide),
            CatalogEntry::new("Same", "b", Category::Cli),
        ];
        assert!(matches!(
            validate(&entries),
            Err(CatalogError::DuplicateName(name)) if name == "Same"
        ));
    }

    #[test]
    fn validate_rejects_pseudo_category() {
        let entries = vec![CatalogEntry::new("Everything", "a", Category::All)];
        assert!(matches!(
            validate(&entries),
            Err(CatalogError::PseudoCategory(_))
        ));
    }
}
