//! Subcommand bodies for the `dyad` binary, kept out of `main.rs` so they
//! can be driven from tests with an in-memory writer.

use std::io::{self, Write};
use std::path::PathBuf;

use dy_agent::SimulatorConfig;
use dy_protocol::{ConversationEvent, InvalidCategory};
use futures::StreamExt;
use thiserror::Error;
use tracing::info;

use crate::catalog::{self, CatalogError, CatalogFilter};
use crate::config::Config;
use crate::renderer::TextRenderer;
use crate::workspace::{InvalidTab, Workspace};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Category(#[from] InvalidCategory),
    #[error(transparent)]
    Tab(#[from] InvalidTab),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("no prompt given")]
    NoPrompt,
    #[error("output error: {0}")]
    Io(#[from] io::Error),
    #[error("output error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// 2 for bad user input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Category(_) | CommandError::Tab(_) | CommandError::NoPrompt => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct ToolsArgs {
    pub category: Option<String>,
    pub search: Option<String>,
    pub catalog: Option<PathBuf>,
    pub json: bool,
}

/// Build the directory filter from config, flags overriding config.
pub fn build_filter(config: &Config, args: &ToolsArgs) -> Result<CatalogFilter, CommandError> {
    let path = args
        .catalog
        .clone()
        .or_else(|| config.catalog.path.clone());
    let entries = match path {
        Some(path) => catalog::load_catalog(&path)?,
        None => catalog::builtin(),
    };

    let mut filter = CatalogFilter::new(entries);
    match &args.category {
        Some(id) => filter.set_category(id)?,
        None => filter.set_category(config.catalog.default_category.id())?,
    }
    if let Some(query) = &args.search {
        filter.set_search_query(query.clone());
    }
    Ok(filter)
}

pub fn run_tools<W: Write>(
    config: &Config,
    args: &ToolsArgs,
    out: &mut TextRenderer<W>,
) -> Result<(), CommandError> {
    let filter = build_filter(config, args)?;
    info!(
        category = %filter.active_category(),
        visible = filter.visible_count(),
        "listing tools"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut out.writer, &filter.visible_entries())?;
        writeln!(out.writer)?;
        return Ok(());
    }
    out.emit_tools(&filter.visible_entries())?;
    Ok(())
}

pub fn run_categories<W: Write>(
    config: &Config,
    out: &mut TextRenderer<W>,
) -> Result<(), CommandError> {
    let mut filter = CatalogFilter::builtin();
    filter.set_category(config.catalog.default_category.id())?;
    out.emit_categories(&filter)?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct ChatArgs {
    pub prompts: Vec<String>,
    pub initial_delay_ms: Option<u64>,
    pub completion_delay_ms: Option<u64>,
    pub json: bool,
}

pub fn simulator_config(config: &Config, args: &ChatArgs) -> SimulatorConfig {
    let mut sim = config.simulator.to_simulator_config();
    if let Some(ms) = args.initial_delay_ms {
        sim.initial_delay_ms = ms;
    }
    if let Some(ms) = args.completion_delay_ms {
        sim.completion_delay_ms = ms;
    }
    sim
}

/// Play the prompts through the simulated agent in real time.
pub async fn run_chat<W: Write>(
    config: &Config,
    args: ChatArgs,
    out: &mut TextRenderer<W>,
) -> Result<(), CommandError> {
    if args.prompts.iter().all(|p| p.trim().is_empty()) {
        return Err(CommandError::NoPrompt);
    }
    let sim = simulator_config(config, &args);
    info!(
        prompts = args.prompts.len(),
        initial_delay_ms = sim.initial_delay_ms,
        completion_delay_ms = sim.completion_delay_ms,
        "starting simulated session"
    );

    if args.json {
        let opening = ConversationEvent::Reset {
            messages: sim.initial_transcript(),
        };
        serde_json::to_writer(&mut out.writer, &opening)?;
        writeln!(out.writer)?;
    } else {
        out.emit_header()?;
        out.emit_transcript(&sim.initial_transcript())?;
    }

    let events = dy_agent::simulate(sim, args.prompts);
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        if args.json {
            serde_json::to_writer(&mut out.writer, &event)?;
            writeln!(out.writer)?;
        } else {
            out.emit_event(&event)?;
        }
        out.writer.flush()?;
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct WorkspaceArgs {
    pub files: Option<String>,
    pub tab: Option<String>,
    pub hide_sidebar: bool,
}

pub fn run_workspace<W: Write>(
    args: &WorkspaceArgs,
    out: &mut TextRenderer<W>,
) -> Result<(), CommandError> {
    let mut workspace = Workspace::new();
    if let Some(tab) = &args.tab {
        workspace.set_tab(tab)?;
    }
    if let Some(query) = &args.files {
        workspace.set_file_query(query.clone());
    }
    if args.hide_sidebar {
        workspace.toggle_sidebar();
    }
    out.emit_workspace(&workspace, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;
    use dy_protocol::Category;

    fn renderer() -> TextRenderer<Vec<u8>> {
        TextRenderer::new_with_width(Vec::new(), Style::disabled(), 100)
    }

    #[test]
    fn flags_override_config_category() {
        let mut config = Config::default();
        config.catalog.default_category = Category::Cli;

        let filter = build_filter(&config, &ToolsArgs::default()).unwrap();
        assert_eq!(filter.active_category(), Category::Cli);

        let args = ToolsArgs {
            category: Some("ide".to_string()),
            ..Default::default()
        };
        let filter = build_filter(&config, &args).unwrap();
        assert_eq!(filter.active_category(), Category::Ide);
    }

    #[test]
    fn categories_mark_configured_default() {
        let mut config = Config::default();
        config.catalog.default_category = Category::Model;
        let mut out = renderer();
        run_categories(&config, &mut out).unwrap();

        let text = String::from_utf8(out.writer).unwrap();
        assert_eq!(text.lines().count(), Category::ALL.len());
        assert!(text.contains("* model"));
        assert!(text.contains("  all "));
    }

    #[test]
    fn catalog_path_from_config() {
        let mut config = Config::default();
        config.catalog.path = Some(PathBuf::from("/nonexistent/dyad/from-config.json"));

        let Err(err) = build_filter(&config, &ToolsArgs::default()) else {
            panic!("configured catalog path was not used");
        };
        assert!(matches!(err, CommandError::Catalog(CatalogError::Io { path, .. })
            if path.ends_with("from-config.json")));
    }

    #[test]
    fn bad_category_is_user_error() {
        let args = ToolsArgs {
            category: Some("editors".to_string()),
            ..Default::default()
        };
        let err = run_tools(&Config::default(), &args, &mut renderer()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_catalog_file_is_runtime_error() {
        let args = ToolsArgs {
            catalog: Some(PathBuf::from("/nonexistent/dyad/catalog.json")),
            ..Default::default()
        };
        let err = run_tools(&Config::default(), &args, &mut renderer()).unwrap_err();
        assert!(matches!(err, CommandError::Catalog(CatalogError::Io { .. })));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn tools_json_lists_visible_entries() {
        let args = ToolsArgs {
            search: Some("bolt".to_string()),
            json: true,
            ..Default::default()
        };
        let mut out = renderer();
        run_tools(&Config::default(), &args, &mut out).unwrap();

        let parsed: Vec<dy_protocol::CatalogEntry> = serde_json::from_slice(&out.writer).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Bolt.new");
    }

    #[test]
    fn delay_flags_override_config() {
        let args = ChatArgs {
            initial_delay_ms: Some(5),
            ..Default::default()
        };
        let sim = simulator_config(&Config::default(), &args);
        assert_eq!(sim.initial_delay_ms, 5);
        assert_eq!(sim.completion_delay_ms, 2000);
    }

    #[test]
    fn workspace_rejects_unknown_tab() {
        let args = WorkspaceArgs {
            tab: Some("terminal".to_string()),
            ..Default::default()
        };
        let err = run_workspace(&args, &mut renderer()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn chat_requires_a_prompt() {
        let args = ChatArgs {
            prompts: vec!["   ".to_string()],
            ..Default::default()
        };
        let err = run_chat(&Config::default(), args, &mut renderer())
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NoPrompt));
    }
}
