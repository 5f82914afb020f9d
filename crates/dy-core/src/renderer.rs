//! Plain-text rendering of the view models for the `dyad` binary.
//!
//! `TextRenderer<W: Write>` owns all stdout formatting so the view models
//! never know how they are shown. Tests render into a `Vec<u8>`.

use std::io::{self, Write};

use dy_protocol::{CatalogEntry, ConversationEvent, Message, Role};

use crate::catalog::{CatalogFilter, EMPTY_RESULT_MESSAGE};
use crate::style::{truncate, Style};
use crate::workspace::{
    console_lines, Workspace, BRANCH_LABEL, CONNECTION_STATUS, CONSOLE_CWD, CONSOLE_HOST,
    PRODUCT_NAME, VERSION_LABEL,
};

pub struct TextRenderer<W: Write> {
    pub writer: W,
    style: Style,
    width: u16,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(writer: W, style: Style) -> Self {
        let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);
        Self::new_with_width(writer, style, width)
    }

    pub fn new_with_width(writer: W, style: Style, width: u16) -> Self {
        Self {
            writer,
            style,
            width,
        }
    }

    pub fn emit_header(&mut self) -> io::Result<()> {
        let s = self.style;
        writeln!(
            self.writer,
            "{}{PRODUCT_NAME}{}  {VERSION_LABEL} > {BRANCH_LABEL}  {}{CONNECTION_STATUS}{}",
            s.bold_start(),
            s.reset(),
            s.green_start(),
            s.reset(),
        )
    }

    // ── Conversation ────────────────────────────────────────────────────

    pub fn emit_message(&mut self, message: &Message) -> io::Result<()> {
        let s = self.style;
        let (who, color) = match message.role {
            Role::User => ("you", s.cyan_start()),
            Role::Assistant => ("dyad", s.bold_start()),
        };
        let ellipsis = if message.is_generating { " ..." } else { "" };
        writeln!(
            self.writer,
            "{color}{who:>4}{} > {}{}{ellipsis}{}",
            s.reset(),
            message.content,
            s.dim_start(),
            s.reset(),
        )
    }

    pub fn emit_transcript(&mut self, messages: &[Message]) -> io::Result<()> {
        for message in messages {
            self.emit_message(message)?;
        }
        Ok(())
    }

    pub fn emit_event(&mut self, event: &ConversationEvent) -> io::Result<()> {
        match event {
            ConversationEvent::MessageAppended { message, .. } => self.emit_message(message),
            ConversationEvent::MessageUpdated { message, .. } => self.emit_message(message),
            ConversationEvent::BuildingChanged { building } => self.emit_console(*building),
            ConversationEvent::Reset { messages } => self.emit_transcript(messages),
        }
    }

    pub fn emit_console(&mut self, is_building: bool) -> io::Result<()> {
        let s = self.style;
        writeln!(
            self.writer,
            "{}{CONSOLE_HOST}{} {}{CONSOLE_CWD}{}",
            s.dim_start(),
            s.reset(),
            s.cyan_start(),
            s.reset(),
        )?;
        for line in console_lines(is_building) {
            writeln!(
                self.writer,
                "  {}{}{} {}",
                s.yellow_start(),
                line.level.as_str(),
                s.reset(),
                line.text
            )?;
        }
        Ok(())
    }

    // ── Catalog ─────────────────────────────────────────────────────────

    pub fn emit_categories(&mut self, filter: &CatalogFilter) -> io::Result<()> {
        let active = filter.active_category();
        for &category in filter.categories() {
            let marker = if category == active { "*" } else { " " };
            writeln!(
                self.writer,
                "{marker} {:<8} {}",
                category.id(),
                category.label()
            )?;
        }
        Ok(())
    }

    pub fn emit_tools(&mut self, entries: &[&CatalogEntry]) -> io::Result<()> {
        let s = self.style;
        if entries.is_empty() {
            writeln!(self.writer, "{}{EMPTY_RESULT_MESSAGE}{}", s.dim_start(), s.reset())?;
            return writeln!(
                self.writer,
                "{}Clear all filters by dropping --category and --search.{}",
                s.dim_start(),
                s.reset()
            );
        }

        let desc_width = (self.width as usize).saturating_sub(4).max(20);
        for entry in entries {
            writeln!(
                self.writer,
                "{}{}{} {}[{}]{}",
                s.bold_start(),
                entry.name,
                s.reset(),
                s.dim_start(),
                entry.category.label(),
                s.reset()
            )?;
            writeln!(self.writer, "    {}", truncate(&entry.description, desc_width))?;
            if !entry.tags.is_empty() || !entry.url.is_empty() {
                writeln!(
                    self.writer,
                    "    {}{}{}  {}",
                    s.cyan_start(),
                    entry.tags.join(", "),
                    s.reset(),
                    entry.url
                )?;
            }
        }
        Ok(())
    }

    // ── Workspace ───────────────────────────────────────────────────────

    pub fn emit_workspace(&mut self, workspace: &Workspace, is_building: bool) -> io::Result<()> {
        let s = self.style;
        self.emit_header()?;
        writeln!(self.writer)?;

        if workspace.sidebar_visible() {
            writeln!(self.writer, "{}EXPLORER{}", s.dim_start(), s.reset())?;
            let files = workspace.visible_files();
            if files.is_empty() {
                writeln!(self.writer, "  (no matching files)")?;
            }
            for file in files {
                writeln!(self.writer, "  {file}")?;
            }
            writeln!(self.writer)?;
        }

        let tab = workspace.tab();
        writeln!(self.writer, "{}[{}]{}", s.bold_start(), tab.label(), s.reset())?;
        for line in tab.body().lines() {
            writeln!(self.writer, "  {line}")?;
        }
        writeln!(self.writer)?;

        self.emit_console(is_building)
    }
}
