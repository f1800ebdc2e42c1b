//! Single-source mime.types registry
//!
//! Two accepted line forms:
//!
//! ```text
//! text/plain    txt text TXT
//! type=text/html exts=html,htm desc="HTML document"
//! ```
//!
//! `#` starts a comment line. Extension lookup is case-sensitive; files list
//! both cases explicitly when they want them.

use crate::types::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Mapping between a file extension and a MIME type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimeTypeEntry {
    pub mime_type: String,
    pub extension: String,
}

/// In-memory registry built from one mime.types source.
#[derive(Debug, Default)]
pub struct MimeTypeFile {
    entries: HashMap<String, MimeTypeEntry>,
}

impl MimeTypeFile {
    /// An empty registry, ready for [`MimeTypeFile::append`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse mime.types text, skipping malformed lines with a warning.
    pub fn parse(text: &str) -> Self {
        let mut file = Self::new();
        file.append(text);
        file
    }

    /// Load a mime.types file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!("parsing mime.types file: {}", path.display());
        Ok(Self::parse(&text))
    }

    /// Load a mime.types file from a reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text))
    }

    /// Append mime.types-format entries to this registry.
    ///
    /// A later mapping for an extension replaces an earlier one within the
    /// same source.
    pub fn append(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with("type=") {
                self.parse_attr_line(line);
            } else {
                self.parse_plain_line(line);
            }
        }
    }

    /// `<type> <ext> <ext> ...`
    fn parse_plain_line(&mut self, line: &str) {
        let mut tokens = line.split_whitespace();
        let Some(mime_type) = tokens.next() else {
            return;
        };
        for ext in tokens {
            self.add_entry(mime_type, ext);
        }
    }

    /// `type=<type> exts=<e1,e2> desc="..."` in any order; desc may contain
    /// spaces inside its quotes and is ignored for lookup.
    fn parse_attr_line(&mut self, line: &str) {
        let mut mime_type = None;
        let mut exts = None;

        for token in quoted_tokens(line) {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            match key {
                "type" => mime_type = Some(value.to_string()),
                "exts" => exts = Some(value.to_string()),
                "desc" => {}
                other => debug!("ignoring mime.types attribute: {}", other),
            }
        }

        let (Some(mime_type), Some(exts)) = (mime_type, exts) else {
            warn!("skipping mime.types entry without type/exts: {:?}", line);
            return;
        };
        for ext in exts.split(',') {
            let ext = ext.trim();
            if !ext.is_empty() {
                self.add_entry(&mime_type, ext);
            }
        }
    }

    fn add_entry(&mut self, mime_type: &str, extension: &str) {
        debug!("mime.types mapping: {} -> {}", extension, mime_type);
        self.entries.insert(
            extension.to_string(),
            MimeTypeEntry {
                mime_type: mime_type.to_string(),
                extension: extension.to_string(),
            },
        );
    }

    /// The entry for a file extension, if this source maps it.
    pub fn entry(&self, file_ext: &str) -> Option<&MimeTypeEntry> {
        self.entries.get(file_ext)
    }

    /// The MIME type string for a file extension.
    pub fn mime_type(&self, file_ext: &str) -> Option<&str> {
        self.entry(file_ext).map(|e| e.mime_type.as_str())
    }

    /// Number of extension mappings in this source.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this source maps no extensions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whitespace tokenization that keeps `key="a b"` together.
fn quoted_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
