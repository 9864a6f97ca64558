//! Document nodes: one logical Nix file

use crate::document::OptionBlock;
use crate::nix::{NixWriter, WriterOptions};
use std::collections::BTreeSet;

/// Entry of a file's `imports` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Import {
    /// Literal path expression, emitted verbatim (`./hardware-configuration.nix`).
    Path(String),
    /// Child node, written out by the persistence engine.
    File(NixFile),
}

impl From<NixFile> for Import {
    fn from(file: NixFile) -> Self {
        Import::File(file)
    }
}

impl From<&str> for Import {
    fn from(path: &str) -> Self {
        Import::Path(path.to_string())
    }
}

impl From<String> for Import {
    fn from(path: String) -> Self {
        Import::Path(path)
    }
}

/// A named Nix file made of option blocks and imports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NixFile {
    pub name: String,
    pub description: String,
    pub imports: Vec<Import>,
    pub blocks: Vec<OptionBlock>,
}

impl NixFile {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn add_import(&mut self, import: impl Into<Import>) -> &mut Self {
        self.imports.push(import.into());
        self
    }

    pub fn add_block(&mut self, block: OptionBlock) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Union of the arguments of every block, sorted.
    pub fn required_arguments(&self) -> BTreeSet<&str> {
        self.blocks
            .iter()
            .flat_map(|b| b.arguments().iter().map(String::as_str))
            .collect()
    }

    /// Whether any import is a child node rather than a literal path.
    pub fn has_file_imports(&self) -> bool {
        self.imports.iter().any(|i| matches!(i, Import::File(_)))
    }

    /// Render the whole file.
    ///
    /// Child nodes still present in `imports` are rendered as `./<name>.nix`;
    /// the persistence engine replaces them with their real location before
    /// rendering.
    pub fn render(&self, writer: &mut NixWriter) {
        if !self.description.is_empty() {
            writer.write_comment(&self.description);
        }

        let arguments = self.required_arguments();
        if !arguments.is_empty() {
            let list: Vec<&str> = arguments.into_iter().collect();
            writer.writeln(&format!("{{{}, ...}}:", list.join(", ")));
        }

        writer.write_raw("{\n");
        writer.writeln("");
        writer.block_body(|w| {
            if !self.imports.is_empty() {
                w.write("imports = [\n");
                w.block_body(|w| {
                    for import in &self.imports {
                        match import {
                            Import::Path(path) => w.writeln(path),
                            Import::File(file) => w.writeln(&format!("./{}.nix", file.name)),
                        }
                    }
                });
                w.writeln("];");
                w.writeln("");
            }
            for block in &self.blocks {
                block.render(w);
            }
        });
        writer.write_raw("}");
    }

    /// Render with default writer options.
    pub fn text(&self) -> String {
        self.text_with(WriterOptions::default())
    }

    pub fn text_with(&self, options: WriterOptions) -> String {
        let mut writer = NixWriter::with_options(options);
        self.render(&mut writer);
        writer.into_text()
    }
}
