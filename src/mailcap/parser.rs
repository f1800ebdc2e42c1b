//! RFC 1524 mailcap entry parsing
//!
//! A mailcap file is line oriented: `#` starts a comment line, blank lines
//! are skipped, and a trailing `\` joins the next physical line onto the
//! current logical entry. Each entry holds `;`-separated fields, with `\`
//! escaping the character after it inside a field.
//!
//! The first field is the MIME type, the second the native (shell) view
//! command, and the remaining fields are `name=value` parameters. Parameters
//! named `x-handler-<verb>` bind the named handler to that verb; the special
//! parameter `x-handler-fallback-entry=true` routes the entry's bindings into
//! the fallback tier.

use crate::types::{MimeMapError, Result};

/// Parameter prefix marking a handler binding.
pub const HANDLER_PREFIX: &str = "x-handler-";

/// Pseudo-verb marking an entry as fallback-tier.
pub const FALLBACK_VERB: &str = "fallback-entry";

/// One parsed mailcap entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailcapEntry {
    /// Lowercased MIME type; a bare type with no subtype is stored as `type/*`.
    pub mime_type: String,
    /// The native view command field, if non-empty.
    pub native_command: Option<String>,
    /// Handler bindings in entry order: `(verb, handler name)`.
    pub handlers: Vec<(String, String)>,
    /// Whether the entry's bindings belong to the fallback tier.
    pub fallback: bool,
    /// The logical line the entry was parsed from.
    pub raw: String,
}

/// Assemble logical entry lines from mailcap text.
///
/// Strips comment and blank lines and joins `\`-continued physical lines.
pub fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();

    for raw in text.lines() {
        let line = if pending.is_empty() { raw.trim_start() } else { raw };
        if pending.is_empty() && (line.is_empty() || line.starts_with('#')) {
            continue;
        }
        if ends_with_continuation(line) {
            pending.push_str(&line[..line.len() - 1]);
            continue;
        }
        pending.push_str(line);
        let entry = std::mem::take(&mut pending);
        if !entry.trim().is_empty() {
            lines.push(entry);
        }
    }
    // an unterminated continuation still yields its partial entry
    if !pending.trim().is_empty() {
        lines.push(pending);
    }
    lines
}

/// A trailing `\` continues the line unless it is itself escaped.
fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

/// Parse one logical mailcap line into an entry.
pub fn parse_entry(line: &str) -> Result<MailcapEntry> {
    let fields = split_fields(line);
    if fields.len() < 2 {
        return Err(MimeMapError::MailcapParse(format!(
            "expected at least '<type>; <command>': {line:?}"
        )));
    }

    let mut mime_type = fields[0].to_ascii_lowercase();
    if mime_type.is_empty() {
        return Err(MimeMapError::MailcapParse(format!(
            "empty MIME type field: {line:?}"
        )));
    }
    if !mime_type.contains('/') {
        mime_type.push_str("/*");
    }

    let native_command = Some(fields[1].clone()).filter(|c| !c.is_empty());

    let mut handlers = Vec::new();
    let mut fallback = false;
    for field in &fields[2..] {
        let Some((name, value)) = field.split_once('=') else {
            // bare flags (needsterminal, copiousoutput, ...) carry no binding
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        let Some(verb) = name.strip_prefix(HANDLER_PREFIX) else {
            continue;
        };
        if verb == FALLBACK_VERB {
            fallback = value.eq_ignore_ascii_case("true");
        } else if !verb.is_empty() && !value.is_empty() {
            handlers.push((verb.to_string(), value.to_string()));
        }
    }

    Ok(MailcapEntry {
        mime_type,
        native_command,
        handlers,
        fallback,
        raw: line.to_string(),
    })
}

/// Split a logical line on unescaped `;`, unescaping `\` within each field.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    field.push(next);
                }
            }
            ';' => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields.iter().map(|f| f.trim().to_string()).collect()
}
