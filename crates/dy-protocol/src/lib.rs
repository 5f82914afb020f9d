//! dy-protocol: Shared types for the Dyad workspace view models.
//!
//! This crate defines the transcript and catalog types passed between the
//! conversation simulator, the catalog filter, and any frontend that renders
//! them.

pub mod catalog;
pub mod message;

pub use catalog::{CatalogEntry, Category, InvalidCategory};
pub use message::{ConversationEvent, Message, Role};
