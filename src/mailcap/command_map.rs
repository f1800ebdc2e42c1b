//! Layered mailcap command map
//!
//! Aggregates mailcap sources in a fixed precedence order and answers
//! command queries across all of them: primary entries from every source
//! are consulted before any fallback entry, and for preferred-command
//! queries the first source to bind a verb wins.

use crate::handler::{DataContentHandler, HandlerRegistry, CONTENT_HANDLER_VERB};
use crate::mailcap::file::{CommandTable, MailcapFile};
use crate::sources::{self, DEFAULT_MAILCAP, MAILCAPS_VAR, SYSTEM_MAILCAP, USER_MAILCAP};
use crate::types::{MimeMapError, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// One command binding: a verb and the handler name it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
    pub verb: String,
    pub handler: String,
}

/// Command registry aggregated from layered mailcap sources.
///
/// Source order: programmatic entries, `~/.mailcap`, files on the `MAILCAPS`
/// search path, the first existing system mailcap, then the embedded
/// built-in table.
pub struct MailcapCommandMap {
    programmatic: Option<MailcapFile>,
    sources: Vec<MailcapFile>,
    handlers: HandlerRegistry,
}

impl MailcapCommandMap {
    /// Build the map from all discovered sources.
    pub fn new() -> Self {
        let mut loaded = Vec::new();

        for path in sources::layered_paths(USER_MAILCAP, MAILCAPS_VAR, SYSTEM_MAILCAP) {
            match MailcapFile::from_path(&path) {
                Ok(file) => {
                    info!("loaded mailcap file: {}", path.display());
                    loaded.push(file);
                }
                Err(e) => warn!("can't load mailcap file {}: {}", path.display(), e),
            }
        }

        if let Some(text) = sources::embedded(DEFAULT_MAILCAP) {
            debug!("loaded built-in mailcap table");
            loaded.push(MailcapFile::parse(text));
        }

        Self {
            programmatic: None,
            sources: loaded,
            handlers: HandlerRegistry::with_builtins(),
        }
    }

    /// Build the map with the programmatic slot preloaded from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut map = Self::new();
        map.programmatic = Some(MailcapFile::from_path(path)?);
        info!("loaded programmatic mailcap from {}", path.display());
        Ok(map)
    }

    /// Build the map with the programmatic slot preloaded from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut map = Self::new();
        map.programmatic = Some(MailcapFile::from_reader(reader)?);
        Ok(map)
    }

    /// Append mailcap-format entries to the programmatic slot, which is
    /// searched before every other source.
    pub fn add_mailcap(&mut self, text: &str) {
        debug!("adding programmatic mailcap entries");
        self.programmatic
            .get_or_insert_with(MailcapFile::new)
            .append(text);
    }

    /// The handler registry consulted by [`MailcapCommandMap::content_handler`].
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    fn registries(&self) -> impl Iterator<Item = &MailcapFile> {
        self.programmatic.iter().chain(self.sources.iter())
    }

    /// The preferred command per verb for a MIME type.
    ///
    /// Walks primary tables of every source in order, then fallback tables
    /// of every source; the first source to bind a verb wins, and within a
    /// binding the head of the handler list is the preferred handler.
    pub fn preferred_commands(&self, mime_type: &str) -> Vec<CommandInfo> {
        let mime_type = mime_type.to_ascii_lowercase();
        let mut commands = Vec::new();

        for registry in self.registries() {
            if let Some(table) = registry.command_table(&mime_type) {
                append_preferred(&table, &mut commands);
            }
        }
        for registry in self.registries() {
            if let Some(table) = registry.fallback_table(&mime_type) {
                append_preferred(&table, &mut commands);
            }
        }
        commands
    }

    /// Every command binding for a MIME type across all sources, primary
    /// tier first, without per-verb deduplication.
    pub fn all_commands(&self, mime_type: &str) -> Vec<CommandInfo> {
        let mime_type = mime_type.to_ascii_lowercase();
        let mut commands = Vec::new();

        for registry in self.registries() {
            if let Some(table) = registry.command_table(&mime_type) {
                append_all(&table, &mut commands);
            }
        }
        for registry in self.registries() {
            if let Some(table) = registry.fallback_table(&mime_type) {
                append_all(&table, &mut commands);
            }
        }
        commands
    }

    /// The preferred binding for one verb, or `None` if no source binds it.
    pub fn command(&self, mime_type: &str, verb: &str) -> Option<CommandInfo> {
        let mime_type = mime_type.to_ascii_lowercase();

        for registry in self.registries() {
            if let Some(handler) = first_handler(registry.command_table(&mime_type), verb) {
                return Some(CommandInfo {
                    verb: verb.to_string(),
                    handler,
                });
            }
        }
        for registry in self.registries() {
            if let Some(handler) = first_handler(registry.fallback_table(&mime_type), verb) {
                return Some(CommandInfo {
                    verb: verb.to_string(),
                    handler,
                });
            }
        }
        None
    }

    /// Construct the content handler for a MIME type.
    ///
    /// Takes each source's preferred `content-handler` binding in turn
    /// (primary tier first, then fallback) and returns the first one whose
    /// name has a registered constructor; names without one are skipped.
    pub fn content_handler(&self, mime_type: &str) -> Option<Box<dyn DataContentHandler>> {
        let mime_type = mime_type.to_ascii_lowercase();
        debug!("content handler lookup for {}", mime_type);

        for registry in self.registries() {
            if let Some(name) =
                first_handler(registry.command_table(&mime_type), CONTENT_HANDLER_VERB)
            {
                match self.handlers.create(&name) {
                    Some(handler) => return Some(handler),
                    None => debug!("no factory registered for handler '{}'", name),
                }
            }
        }
        for registry in self.registries() {
            if let Some(name) =
                first_handler(registry.fallback_table(&mime_type), CONTENT_HANDLER_VERB)
            {
                match self.handlers.create(&name) {
                    Some(handler) => return Some(handler),
                    None => debug!("no factory registered for handler '{}'", name),
                }
            }
        }
        None
    }

    /// Like [`MailcapCommandMap::content_handler`], but an unresolvable type
    /// is an error.
    pub fn require_content_handler(&self, mime_type: &str) -> Result<Box<dyn DataContentHandler>> {
        self.content_handler(mime_type)
            .ok_or_else(|| MimeMapError::UnsupportedDataType(mime_type.to_string()))
    }

    /// Every MIME type known to any source, first-seen order, deduplicated.
    pub fn mime_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for registry in self.registries() {
            for mime_type in registry.mime_types() {
                if !types.contains(mime_type) {
                    types.push(mime_type.clone());
                }
            }
        }
        types
    }

    /// Raw native-command entries for a MIME type across all sources,
    /// deduplicated, in source order.
    pub fn native_commands(&self, mime_type: &str) -> Vec<String> {
        let mime_type = mime_type.to_ascii_lowercase();
        let mut commands: Vec<String> = Vec::new();
        for registry in self.registries() {
            for command in registry.native_commands(&mime_type) {
                if !commands.contains(&command) {
                    commands.push(command);
                }
            }
        }
        commands
    }
}

impl Default for MailcapCommandMap {
    fn default() -> Self {
        Self::new()
    }
}

fn append_preferred(table: &CommandTable, commands: &mut Vec<CommandInfo>) {
    for (verb, handlers) in table {
        if commands.iter().any(|c| &c.verb == verb) {
            continue;
        }
        if let Some(handler) = handlers.first() {
            commands.push(CommandInfo {
                verb: verb.clone(),
                handler: handler.clone(),
            });
        }
    }
}

fn append_all(table: &CommandTable, commands: &mut Vec<CommandInfo>) {
    for (verb, handlers) in table {
        for handler in handlers {
            commands.push(CommandInfo {
                verb: verb.clone(),
                handler: handler.clone(),
            });
        }
    }
}

fn first_handler(table: Option<CommandTable>, verb: &str) -> Option<String> {
    table
        .as_ref()
        .and_then(|t| t.get(verb))
        .and_then(|handlers| handlers.first())
        .cloned()
}
