//! Cosmetic state of the agent workspace screen: header facts, the file
//! explorer, the preview/editor tabs, and the console panel.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub const PRODUCT_NAME: &str = "Dyad";
pub const VERSION_LABEL: &str = "v0.1.0";
pub const BRANCH_LABEL: &str = "Main";
pub const CONNECTION_STATUS: &str = "Connected";

pub const CONSOLE_HOST: &str = "dyad@workspace:";
pub const CONSOLE_CWD: &str = "~/app";

/// Shown in the preview pane until a real build exists, which is never.
pub const PREVIEW_PLACEHOLDER: &str = "Awaiting project build";

pub const EDITOR_SAMPLE: &str = r#"import React from 'react';

export default function App() {
  return (
    <div className="min-h-screen bg-black text-white p-8">
      <h1 className="text-2xl font-bold">Hello World</h1>
    </div>
  );
}"#;

const MOCK_FILES: &[&str] = &[
    "package.json",
    "src/app/page.tsx",
    "src/components/ui/button.tsx",
    "public/logo.svg",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tab: {0:?} (expected preview or code)")]
pub struct InvalidTab(pub String);

/// Tabs of the right-hand panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelTab {
    #[default]
    Preview,
    Code,
}

impl PanelTab {
    pub fn id(&self) -> &'static str {
        match self {
            PanelTab::Preview => "preview",
            PanelTab::Code => "code",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PanelTab::Preview => "Preview",
            PanelTab::Code => "Editor",
        }
    }

    /// What the pane shows under this tab.
    pub fn body(&self) -> &'static str {
        match self {
            PanelTab::Preview => PREVIEW_PLACEHOLDER,
            PanelTab::Code => EDITOR_SAMPLE,
        }
    }
}

impl FromStr for PanelTab {
    type Err = InvalidTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preview" => Ok(PanelTab::Preview),
            "code" => Ok(PanelTab::Code),
            other => Err(InvalidTab(other.to_string())),
        }
    }
}

impl fmt::Display for PanelTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Info,
    Done,
}

impl ConsoleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleLevel::Info => "info",
            ConsoleLevel::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleLine {
    pub level: ConsoleLevel,
    pub text: &'static str,
}

/// Console lines for the current build flag. The prompt line
/// (`CONSOLE_HOST` + `CONSOLE_CWD`) is always shown above these.
pub fn console_lines(is_building: bool) -> Vec<ConsoleLine> {
    if !is_building {
        return Vec::new();
    }
    vec![
        ConsoleLine {
            level: ConsoleLevel::Info,
            text: "Processing request...",
        },
        ConsoleLine {
            level: ConsoleLevel::Done,
            text: "Files synchronized.",
        },
    ]
}

#[derive(Debug, Clone)]
pub struct Workspace {
    tab: PanelTab,
    sidebar_visible: bool,
    file_query: String,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            tab: PanelTab::Preview,
            sidebar_visible: true,
            file_query: String::new(),
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> PanelTab {
        self.tab
    }

    /// Switch the right-hand panel by tab id. Unknown ids change nothing.
    pub fn set_tab(&mut self, id: &str) -> Result<(), InvalidTab> {
        self.tab = id.parse()?;
        Ok(())
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    /// Show or hide the explorer sidebar; returns the new visibility.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_visible = !self.sidebar_visible;
        self.sidebar_visible
    }

    pub fn set_file_query(&mut self, query: impl Into<String>) {
        self.file_query = query.into();
    }

    /// Explorer files matching the query, case-insensitive, in listing order.
    pub fn visible_files(&self) -> Vec<&'static str> {
        let needle = self.file_query.to_lowercase();
        MOCK_FILES
            .iter()
            .copied()
            .filter(|path| needle.is_empty() || path.to_lowercase().contains(&needle))
            .collect()
    }
}
