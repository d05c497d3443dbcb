//! Line-oriented field editor
//!
//! Plays the part of the page around the field tree: it prints the outline,
//! turns numbered commands into tree operations, and keeps the last
//! generated schema around for export.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use schema_forge::{
    render_schema, Config, Field, FieldId, FieldPatch, FieldTree, FieldType, Slot,
};

use crate::commands::{parse_command, Command, Handle, HELP};

const APP_NAME: &str = "Schema Forge";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = "> ";
const EMPTY_MESSAGE: &str = "No fields yet. Use `add` to create one.";

/// Whether the loop keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One visible line of the outline
struct OutlineRow<'a> {
    depth: usize,
    field: &'a Field,
    is_item: bool,
}

pub struct App {
    config: Config,
    tree: FieldTree,
    /// Field ids in outline order; handle `n` is `handles[n - 1]`
    handles: Vec<FieldId>,
    last_schema: Option<String>,
    interactive: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tree: FieldTree::new(),
            handles: Vec::new(),
            last_schema: None,
            interactive: false,
        }
    }

    #[cfg(test)]
    pub fn tree(&self) -> &FieldTree {
        &self.tree
    }

    /// Read commands until end of input or `quit`.
    ///
    /// Interactive sessions report errors and keep going; scripted runs stop
    /// at the first failing line.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W, interactive: bool) -> Result<()> {
        self.interactive = interactive;
        if interactive {
            writeln!(out, "{} {} - type `help` for commands", APP_NAME, APP_VERSION)?;
            writeln!(out, "{}", self.render_outline())?;
        }

        let mut lines = input.lines().enumerate();
        loop {
            if interactive {
                write!(out, "{}", PROMPT)?;
                out.flush()?;
            }

            let Some((number, line)) = lines.next() else {
                break;
            };
            let line = line.context("Failed to read input")?;

            let result = match parse_command(&line) {
                Ok(Some(command)) => self.execute(command, out),
                Ok(None) => Ok(Flow::Continue),
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) if interactive => {
                    tracing::warn!("Command failed: {:#}", e);
                    writeln!(out, "Error: {:#}", e)?;
                }
                Err(e) => return Err(e.context(format!("line {}: {}", number + 1, line.trim()))),
            }
        }

        tracing::info!(fields = self.tree.len(), "editor session finished");
        Ok(())
    }

    /// Apply a single command
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        tracing::debug!(?command, "executing command");

        match command {
            Command::Add => {
                self.tree.add_root();
            }
            Command::AddProperty(handle) => {
                let id = self.resolve(handle)?;
                let field = self.lookup(id)?;
                if !field.can_add_property() {
                    bail!(
                        "Field {} is {}; only object fields take properties",
                        handle,
                        field.field_type
                    );
                }
                self.tree.add_child(id, Slot::Properties);
            }
            Command::AddItem(handle) => {
                let id = self.resolve(handle)?;
                let field = self.lookup(id)?;
                if field.field_type != FieldType::Array {
                    bail!(
                        "Field {} is {}; only array fields take an item type",
                        handle,
                        field.field_type
                    );
                }
                if !field.can_add_item() {
                    bail!("Field {} already has an item type; remove it first", handle);
                }
                self.tree.add_child(id, Slot::Items);
            }
            Command::Rename(handle, name) => {
                let id = self.resolve(handle)?;
                self.tree.update(id, FieldPatch::new().name(name));
            }
            Command::Retype(handle, field_type) => {
                let id = self.resolve(handle)?;
                let patch = if self.config.editor.clear_on_retype {
                    FieldPatch::retype(self.lookup(id)?, field_type)
                } else {
                    FieldPatch::new().field_type(field_type)
                };
                self.tree.update(id, patch);
            }
            Command::Describe(handle, text) => {
                let id = self.resolve(handle)?;
                let patch = if text.is_empty() {
                    FieldPatch::new().clear_description()
                } else {
                    FieldPatch::new().description(text)
                };
                self.tree.update(id, patch);
            }
            Command::Require(handle, toggle) => {
                let id = self.resolve(handle)?;
                let required = match toggle {
                    Some(required) => required,
                    None => !self.lookup(id)?.required,
                };
                self.tree.update(id, FieldPatch::new().required(required));
            }
            Command::Remove(handle) => {
                let id = self.resolve(handle)?;
                self.tree.remove(id);
            }
            Command::List => {
                writeln!(out, "{}", self.render_outline())?;
                return Ok(Flow::Continue);
            }
            Command::Schema => {
                let schema = self.tree.compile();
                let text = render_schema(&schema, &self.config.output.render_options())
                    .context("Failed to serialize schema")?;
                writeln!(out, "{}", text)?;
                self.last_schema = Some(text);
                return Ok(Flow::Continue);
            }
            Command::Export(path) => {
                let path = self.export(path)?;
                writeln!(out, "Wrote schema to {}", path.display())?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        // The tree changed, so the outline and its numbering are redrawn
        let outline = self.render_outline();
        if self.interactive {
            writeln!(out, "{}", outline)?;
        }
        Ok(Flow::Continue)
    }

    fn resolve(&self, handle: Handle) -> Result<FieldId> {
        handle
            .checked_sub(1)
            .and_then(|i| self.handles.get(i))
            .copied()
            .ok_or_else(|| anyhow!("No field {}; run `ls` to see field numbers", handle))
    }

    fn lookup(&self, id: FieldId) -> Result<&Field> {
        self.tree
            .find(id)
            .ok_or_else(|| anyhow!("Field {} no longer exists; run `ls`", id))
    }

    fn export(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        let text = self
            .last_schema
            .as_ref()
            .ok_or_else(|| anyhow!("Nothing to export yet; run `schema` first"))?;
        let path = path
            .or_else(|| self.config.output.export_path.clone())
            .ok_or_else(|| anyhow!("No export path given and none configured"))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, format!("{}\n", text))
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        tracing::info!(path = %path.display(), "exported schema");
        Ok(path)
    }

    /// Visible rows: properties only under objects, the item only under arrays
    fn outline(&self) -> Vec<OutlineRow<'_>> {
        fn collect<'a>(field: &'a Field, depth: usize, is_item: bool, rows: &mut Vec<OutlineRow<'a>>) {
            rows.push(OutlineRow {
                depth,
                field,
                is_item,
            });
            match field.field_type {
                FieldType::Object => {
                    for child in &field.properties {
                        collect(child, depth + 1, false, rows);
                    }
                }
                FieldType::Array => {
                    if let Some(item) = field.item.as_deref() {
                        collect(item, depth + 1, true, rows);
                    }
                }
                _ => {}
            }
        }

        let mut rows = Vec::new();
        for field in self.tree.roots() {
            collect(field, 0, false, &mut rows);
        }
        rows
    }

    /// Render the outline and renumber the handles to match it
    fn render_outline(&mut self) -> String {
        let (handles, text) = {
            let rows = self.outline();
            let handles: Vec<FieldId> = rows.iter().map(|row| row.field.id).collect();
            let lines: Vec<String> = rows
                .iter()
                .enumerate()
                .flat_map(|(i, row)| self.render_row(i + 1, row))
                .collect();
            (handles, lines.join("\n"))
        };
        self.handles = handles;

        if text.is_empty() {
            EMPTY_MESSAGE.to_string()
        } else {
            text
        }
    }

    fn render_row(&self, handle: Handle, row: &OutlineRow<'_>) -> Vec<String> {
        let field = row.field;
        let indent = "  ".repeat(row.depth);
        let label = if row.is_item {
            "(item)"
        } else if field.name.is_empty() {
            "<unnamed>"
        } else {
            field.name.as_str()
        };

        let mut line = format!("{}{}. {}: {}", indent, handle, label, field.field_type);
        if field.required {
            line.push_str(" [required]");
        }
        if let Some(description) = field.description() {
            line.push_str(&format!(" - {}", description));
        }
        if self.config.editor.show_ids {
            line.push_str(&format!("  #{}", field.id));
        }

        let mut lines = vec![line];
        let child_indent = "  ".repeat(row.depth + 1);
        match field.field_type {
            FieldType::Object => {
                lines.push(format!("{}properties:", child_indent));
                if field.properties.is_empty() {
                    lines.push(format!("{}(no properties yet, use `prop {}`)", child_indent, handle));
                }
            }
            FieldType::Array => {
                lines.push(format!("{}items:", child_indent));
                if field.can_add_item() {
                    lines.push(format!("{}(no item type yet, use `item {}`)", child_indent, handle));
                }
            }
            _ => {}
        }
        lines
    }
}
