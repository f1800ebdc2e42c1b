//! Layered file-extension -> MIME type map
//!
//! Data typing of files via their file name extension, using the mime.types
//! format. Sources are consulted in precedence order and the first mapping
//! for an extension wins.

use crate::mimetypes::file::MimeTypeFile;
use crate::sources::{
    self, DEFAULT_MIME_TYPES, MIMETYPES_VAR, SYSTEM_MIME_TYPES, USER_MIME_TYPES,
};
use crate::types::Result;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Content type reported when no source maps the extension.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File-type map aggregated from layered mime.types sources.
///
/// Source order: programmatic entries, `~/.mime.types`, files on the
/// `MIMETYPES` search path, the first existing system mime.types, then the
/// embedded built-in table.
pub struct FileTypeMap {
    programmatic: Option<MimeTypeFile>,
    sources: Vec<MimeTypeFile>,
}

impl FileTypeMap {
    /// Build the map from all discovered sources.
    pub fn new() -> Self {
        let mut loaded = Vec::new();

        for path in sources::layered_paths(USER_MIME_TYPES, MIMETYPES_VAR, SYSTEM_MIME_TYPES) {
            match MimeTypeFile::from_path(&path) {
                Ok(file) => {
                    info!("loaded mime.types file: {}", path.display());
                    loaded.push(file);
                }
                Err(e) => warn!("can't load mime.types file {}: {}", path.display(), e),
            }
        }

        if let Some(text) = sources::embedded(DEFAULT_MIME_TYPES) {
            debug!("loaded built-in mime.types table");
            loaded.push(MimeTypeFile::parse(text));
        }

        Self {
            programmatic: None,
            sources: loaded,
        }
    }

    /// Build the map with the programmatic slot preloaded from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut map = Self::new();
        map.programmatic = Some(MimeTypeFile::from_path(path)?);
        info!("loaded programmatic mime.types from {}", path.display());
        Ok(map)
    }

    /// Build the map with the programmatic slot preloaded from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut map = Self::new();
        map.programmatic = Some(MimeTypeFile::from_reader(reader)?);
        Ok(map)
    }

    /// Append mime.types-format entries to the programmatic slot, which is
    /// searched before every other source.
    pub fn add_mime_types(&mut self, text: &str) {
        debug!("adding programmatic mime.types entries");
        self.programmatic
            .get_or_insert_with(MimeTypeFile::new)
            .append(text);
    }

    fn registries(&self) -> impl Iterator<Item = &MimeTypeFile> {
        self.programmatic.iter().chain(self.sources.iter())
    }

    /// The MIME type for a file name.
    ///
    /// The extension is the text after the last `.`; a name with no dot or
    /// an empty extension, and an extension no source maps, all report
    /// [`DEFAULT_CONTENT_TYPE`].
    pub fn content_type(&self, filename: &str) -> &str {
        let Some(dot) = filename.rfind('.') else {
            return DEFAULT_CONTENT_TYPE;
        };
        let ext = &filename[dot + 1..];
        if ext.is_empty() {
            return DEFAULT_CONTENT_TYPE;
        }

        for registry in self.registries() {
            if let Some(mime_type) = registry.mime_type(ext) {
                debug!("content type for .{}: {}", ext, mime_type);
                return mime_type;
            }
        }
        DEFAULT_CONTENT_TYPE
    }

    /// The MIME type for a path, keyed on its file name.
    pub fn content_type_of(&self, path: &Path) -> &str {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.content_type(name),
            None => DEFAULT_CONTENT_TYPE,
        }
    }
}

impl Default for FileTypeMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Hermetic map: fixed sources, no filesystem or environment probing.
    fn map_with(programmatic: Option<&str>, sources: &[&str]) -> FileTypeMap {
        FileTypeMap {
            programmatic: programmatic.map(MimeTypeFile::parse),
            sources: sources.iter().map(|s| MimeTypeFile::parse(s)).collect(),
        }
    }

    #[test]
    fn test_first_source_wins() {
        let map = map_with(None, &["text/x-log txt", "text/plain txt text"]);
        assert_eq!(map.content_type("notes.txt"), "text/x-log");
        // only the second source maps "text"
        assert_eq!(map.content_type("notes.text"), "text/plain");
    }

    #[test]
    fn test_programmatic_slot_precedes_all_sources() {
        let mut map = map_with(None, &["text/plain txt"]);
        map.add_mime_types("application/x-note txt");
        assert_eq!(map.content_type("notes.txt"), "application/x-note");
    }

    #[test]
    fn test_extension_is_text_after_last_dot() {
        let map = map_with(None, &["application/gzip gz"]);
        assert_eq!(map.content_type("archive.tar.gz"), "application/gzip");
    }

    #[test]
    fn test_unmapped_and_missing_extensions_default() {
        let map = map_with(None, &["text/plain txt"]);
        assert_eq!(map.content_type("notes.xyz"), DEFAULT_CONTENT_TYPE);
        assert_eq!(map.content_type("Makefile"), DEFAULT_CONTENT_TYPE);
        assert_eq!(map.content_type("trailing."), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_content_type_of_uses_file_name() {
        let map = map_with(None, &["text/plain txt"]);
        let path = PathBuf::from("/some/dir.d/notes.txt");
        assert_eq!(map.content_type_of(&path), "text/plain");
    }

    #[test]
    fn test_default_map_serves_builtin_table() {
        // the embedded table is the lowest tier of the real constructor
        let map = FileTypeMap::new();
        assert_eq!(map.content_type("picture.gif"), "image/gif");
        assert_eq!(map.content_type("notes.txt"), "text/plain");
    }
}
