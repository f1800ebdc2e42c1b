//! mimemap - layered MIME type and mailcap command registry
//!
//! This crate associates MIME types with handler names and native commands
//! using the mailcap (RFC 1524) and mime.types file formats. Each registry
//! merges programmatic entries, user dotfiles, search-path environment
//! variables, system files and embedded defaults, in that precedence order,
//! with exact-then-wildcard MIME lookup and a fallback tier consulted only
//! when primary entries are exhausted.

pub mod handler;
pub mod mailcap;
pub mod mimetypes;
pub mod sources;
pub mod types;

pub use handler::{DataContentHandler, HandlerRegistry};
pub use mailcap::{CommandInfo, MailcapCommandMap, MailcapFile};
pub use mimetypes::{FileTypeMap, MimeTypeEntry, MimeTypeFile};
pub use types::{MimeMapError, Result};
