//! Nix text writer
//!
//! Single-pass writer over a `String` buffer. The only state besides the buffer
//! is the current indentation level, so a writer can be reused after
//! [`NixWriter::clear`].

use crate::nix::quote::{escape_indented, quote_key, quote_string};
use crate::nix::value::{AttrSet, Value};
use std::collections::HashSet;

/// Writer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Emit `# ...` comments for descriptions.
    pub comments: bool,
    /// One level of indentation.
    pub indent: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            comments: true,
            indent: "  ".to_string(),
        }
    }
}

impl WriterOptions {
    /// Default options with comments switched off.
    pub fn without_comments() -> Self {
        Self {
            comments: false,
            ..Self::default()
        }
    }
}

/// Renders [`Value`]s as Nix source text.
#[derive(Debug, Default)]
pub struct NixWriter {
    options: WriterOptions,
    buffer: String,
    level: usize,
}

impl NixWriter {
    /// Writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self {
            options,
            buffer: String::new(),
            level: 0,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    fn write_indent(&mut self) {
        for _ in 0..self.level {
            self.buffer.push_str(&self.options.indent);
        }
    }

    /// Append text as-is.
    pub fn write_raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Append indented text without a newline.
    pub fn write(&mut self, text: &str) {
        self.write_indent();
        self.buffer.push_str(text);
    }

    /// Append an indented line. An empty line gets no indentation.
    pub fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            self.write(line);
        }
        self.buffer.push('\n');
    }

    /// Open a bracketed block: writes `open` and a newline, then indents.
    fn open_block(&mut self, open: &str) {
        self.write_raw(open);
        self.buffer.push('\n');
        self.level += 1;
    }

    /// Close a block opened with [`Self::open_block`], writing `close` indented.
    fn close_block(&mut self, close: &str) {
        self.level = self.level.saturating_sub(1);
        self.write(close);
    }

    /// Write `{`, run `body` one level deeper, then write `}`.
    pub fn block(&mut self, body: impl FnOnce(&mut Self)) {
        self.open_block("{");
        body(self);
        self.close_block("}");
    }

    /// Run `body` one indentation level deeper.
    pub fn block_body(&mut self, body: impl FnOnce(&mut Self)) {
        self.level += 1;
        body(self);
        self.level = self.level.saturating_sub(1);
    }

    /// Render a value at the current position.
    ///
    /// A string containing a newline becomes an indented (`''`) block, one
    /// output line per line of text. A single trailing newline is not kept and
    /// `\r\n` endings are written as plain line breaks, so `"a\nb"`,
    /// `"a\nb\n"` and `"a\r\nb"` render identically.
    pub fn write_value(&mut self, value: &Value) {
        match value {
            Value::Bool(b) => self.write_raw(if *b { "true" } else { "false" }),
            Value::Null => self.write_raw("null"),
            Value::Int(i) => self.write_raw(&i.to_string()),
            Value::Float(f) => self.write_raw(&format_float(*f)),
            Value::Literal(text) => self.write_raw(text),
            Value::Asset(asset) => self.write_raw(&format!("./{}", asset.target_filename())),
            Value::Composition(parts) => {
                for part in parts {
                    self.write_value(part);
                }
            }
            Value::String(text) if text.contains('\n') => self.write_indented_string(text.lines()),
            Value::String(text) => self.write_raw(&quote_string(text)),
            Value::Lines(lines) => self.write_indented_string(lines.iter().map(String::as_str)),
            Value::Attrs(attrs) => self.block(|w| w.write_attrs(attrs)),
            Value::List(items) => {
                self.open_block("[");
                for item in items {
                    self.write_indent();
                    self.write_value(item);
                    self.buffer.push('\n');
                }
                self.close_block("]");
            }
        }
    }

    fn write_indented_string<'a>(&mut self, lines: impl Iterator<Item = &'a str>) {
        self.open_block("''");
        for line in lines {
            self.writeln(&escape_indented(line));
        }
        self.close_block("''");
    }

    /// Write `key = value;` followed by a newline.
    pub fn write_attr(&mut self, key: &str, value: &Value) {
        self.write(&format!("{} = ", quote_key(key)));
        self.write_value(value);
        self.write_raw(";\n");
    }

    /// Write every entry of `attrs`, one per line.
    ///
    /// # Panics
    ///
    /// Panics if two keys render to the same quoted text (`key with space` and
    /// `"key with space"`). Such a set cannot be expressed in Nix and means the
    /// caller built it incorrectly.
    pub fn write_attrs(&mut self, attrs: &AttrSet) {
        let mut seen = HashSet::with_capacity(attrs.len());
        for (key, value) in attrs {
            let quoted = quote_key(key);
            if !seen.insert(quoted.clone()) {
                panic!("attribute key {:?} collides with another key after quoting", key);
            }
            self.write_attr(key, value);
        }
    }

    /// Write every entry of `attrs`, each followed by a blank line.
    pub fn write_dict(&mut self, attrs: &AttrSet) {
        for (key, value) in attrs {
            self.write_attr(key, value);
            self.writeln("");
        }
    }

    /// Write each line of `comment` prefixed with `# `, unless comments are off.
    pub fn write_comment(&mut self, comment: &str) {
        if !self.options.comments {
            return;
        }
        for line in comment.lines() {
            self.writeln(&format!("# {}", line));
        }
    }

    /// Rendered text so far.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Consume the writer, returning the rendered text.
    pub fn into_text(self) -> String {
        self.buffer
    }

    /// Reset buffer and indentation.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.level = 0;
    }
}

fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return quote_string(&f.to_string());
    }
    let text = f.to_string();
    if text.contains('.') || text.contains('e') {
        text
    } else {
        format!("{}.0", text)
    }
}
