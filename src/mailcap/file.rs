//! Single-source mailcap registry
//!
//! Holds the tables parsed from one mailcap source and answers
//! exact-then-wildcard lookups against it. Aggregation across sources
//! happens in [`super::command_map`].

use crate::mailcap::parser::{self, MailcapEntry};
use crate::types::Result;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Verb -> handler names, in preference order (first entry preferred).
pub type CommandTable = BTreeMap<String, Vec<String>>;

/// In-memory registry built from one mailcap source.
#[derive(Debug, Default)]
pub struct MailcapFile {
    /// type -> verb -> handler names
    type_table: HashMap<String, CommandTable>,
    /// fallback tier, same shape
    fallback_table: HashMap<String, CommandTable>,
    /// type -> raw entry lines that carry a native command
    native_commands: HashMap<String, Vec<String>>,
    /// every type seen, in first-seen order
    mime_types: Vec<String>,
}

impl MailcapFile {
    /// An empty registry, ready for [`MailcapFile::append`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse mailcap text, skipping malformed entries with a warning.
    pub fn parse(text: &str) -> Self {
        let mut file = Self::new();
        file.append(text);
        file
    }

    /// Load a mailcap file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!("parsing mailcap file: {}", path.display());
        Ok(Self::parse(&text))
    }

    /// Load a mailcap file from a reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text))
    }

    /// Append mailcap-format entries to this registry.
    ///
    /// Later entries for an existing type/verb extend the handler list; the
    /// first entry remains the preferred one. Malformed entries are skipped
    /// with a warning.
    pub fn append(&mut self, text: &str) {
        for line in parser::logical_lines(text) {
            match parser::parse_entry(&line) {
                Ok(entry) => self.add_entry(entry),
                Err(e) => warn!("skipping mailcap entry: {}", e),
            }
        }
    }

    fn add_entry(&mut self, entry: MailcapEntry) {
        if !self.mime_types.contains(&entry.mime_type) {
            self.mime_types.push(entry.mime_type.clone());
        }

        if entry.native_command.is_some() {
            self.native_commands
                .entry(entry.mime_type.clone())
                .or_default()
                .push(entry.raw.clone());
        }

        if entry.handlers.is_empty() {
            return;
        }
        let table = if entry.fallback {
            self.fallback_table.entry(entry.mime_type.clone()).or_default()
        } else {
            self.type_table.entry(entry.mime_type.clone()).or_default()
        };
        for (verb, handler) in entry.handlers {
            debug!(
                "mailcap binding: {} {} -> {}",
                entry.mime_type, verb, handler
            );
            table.entry(verb).or_default().push(handler);
        }
    }

    /// Primary command table for a MIME type.
    ///
    /// Probes the literal type first, then `type/*` when the query's subtype
    /// is not already `*`; when both hit, per-verb lists are merged with the
    /// exact hits ahead of the wildcard ones.
    pub fn command_table(&self, mime_type: &str) -> Option<CommandTable> {
        lookup(&self.type_table, mime_type)
    }

    /// Fallback command table for a MIME type, same probe order.
    pub fn fallback_table(&self, mime_type: &str) -> Option<CommandTable> {
        lookup(&self.fallback_table, mime_type)
    }

    /// Every MIME type this source mentions, in first-seen order.
    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// Raw native-command entry lines for a MIME type, exact hits first.
    pub fn native_commands(&self, mime_type: &str) -> Vec<String> {
        let mut commands = Vec::new();
        if let Some(exact) = self.native_commands.get(mime_type) {
            commands.extend(exact.iter().cloned());
        }
        if let Some(key) = wildcard_key(mime_type) {
            if let Some(wild) = self.native_commands.get(&key) {
                commands.extend(wild.iter().cloned());
            }
        }
        commands
    }
}

fn lookup(table: &HashMap<String, CommandTable>, mime_type: &str) -> Option<CommandTable> {
    let exact = table.get(mime_type);
    let wildcard = wildcard_key(mime_type).and_then(|key| table.get(&key));

    match (exact, wildcard) {
        (None, None) => None,
        (Some(e), None) => Some(e.clone()),
        (None, Some(w)) => Some(w.clone()),
        (Some(e), Some(w)) => Some(merge_tables(e, w)),
    }
}

/// `type/sub` -> `type/*`; no key for slashless or already-wildcard queries.
fn wildcard_key(mime_type: &str) -> Option<String> {
    match mime_type.split_once('/') {
        Some((major, sub)) if sub != "*" => Some(format!("{major}/*")),
        _ => None,
    }
}

fn merge_tables(exact: &CommandTable, wildcard: &CommandTable) -> CommandTable {
    let mut merged = exact.clone();
    for (verb, handlers) in wildcard {
        merged
            .entry(verb.clone())
            .or_default()
            .extend(handlers.iter().cloned());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MailcapFile {
        MailcapFile::parse(
            "text/plain; cat %s; x-handler-view=plain-viewer; x-handler-edit=plain-editor\n\
             text/plain; ; x-handler-view=second-viewer\n\
             text/*; ; x-handler-view=any-text; x-handler-print=text-printer\n\
             text/*; ; x-handler-fallback-entry=true; x-handler-view=fallback-viewer\n\
             image/gif; xv %s\n",
        )
    }

    #[test]
    fn test_exact_lookup() {
        let file = sample();
        let table = file.command_table("text/plain").unwrap();
        assert_eq!(
            table.get("edit"),
            Some(&vec!["plain-editor".to_string()])
        );
    }

    #[test]
    fn test_exact_hits_precede_wildcard_hits() {
        let file = sample();
        let table = file.command_table("text/plain").unwrap();
        assert_eq!(
            table.get("view"),
            Some(&vec![
                "plain-viewer".to_string(),
                "second-viewer".to_string(),
                "any-text".to_string()
            ])
        );
        // verb only present on the wildcard entry still resolves
        assert_eq!(table.get("print"), Some(&vec!["text-printer".to_string()]));
    }

    #[test]
    fn test_wildcard_only_match() {
        let file = sample();
        let table = file.command_table("text/html").unwrap();
        assert_eq!(table.get("view"), Some(&vec!["any-text".to_string()]));
    }

    #[test]
    fn test_wildcard_query_does_not_rewrite() {
        let file = sample();
        let table = file.command_table("text/*").unwrap();
        assert_eq!(table.get("view"), Some(&vec!["any-text".to_string()]));
    }

    #[test]
    fn test_unknown_type_returns_none() {
        let file = sample();
        assert!(file.command_table("audio/basic").is_none());
    }

    #[test]
    fn test_fallback_tier_is_separate() {
        let file = sample();
        let fallback = file.fallback_table("text/plain").unwrap();
        assert_eq!(
            fallback.get("view"),
            Some(&vec!["fallback-viewer".to_string()])
        );
        let primary = file.command_table("text/plain").unwrap();
        assert!(!primary
            .get("view")
            .unwrap()
            .contains(&"fallback-viewer".to_string()));
    }

    #[test]
    fn test_native_commands() {
        let file = sample();
        let native = file.native_commands("text/plain");
        assert_eq!(native.len(), 1);
        assert!(native[0].starts_with("text/plain; cat %s"));
        assert_eq!(file.native_commands("image/gif").len(), 1);
        assert!(file.native_commands("audio/basic").is_empty());
    }

    #[test]
    fn test_mime_types_first_seen_order() {
        let file = sample();
        assert_eq!(file.mime_types(), ["text/plain", "text/*", "image/gif"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let file = MailcapFile::parse("garbage\ntext/plain; ; x-handler-view=v\n");
        assert_eq!(file.mime_types(), ["text/plain"]);
    }
}
