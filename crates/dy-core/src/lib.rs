//! dy-core: Screen models and the `dyad` command-line front end.
//!
//! Holds the tool directory filter, the agent workspace screen state,
//! configuration, and a plain-text renderer. Exposed as a library for
//! integration testing.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod renderer;
pub mod style;
pub mod workspace;

pub use catalog::{CatalogError, CatalogFilter, FilterChanged};
pub use config::{Config, ConfigError};
pub use workspace::{InvalidTab, PanelTab, Workspace};
