//! mime.types file-extension registry
//!
//! [`MimeTypeFile`] holds one source's extension table;
//! [`FileTypeMap`] aggregates sources in precedence order.

pub mod file;
pub mod type_map;

pub use file::{MimeTypeEntry, MimeTypeFile};
pub use type_map::{FileTypeMap, DEFAULT_CONTENT_TYPE};
