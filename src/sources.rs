//! Layered registry source discovery
//!
//! Both registries consult sources in the same precedence order:
//! 1. Programmatic entries (highest priority)
//! 2. A dotfile in the user's home directory
//! 3. Files named by a search-path environment variable
//! 4. The first existing well-known system file
//! 5. Built-in defaults embedded at compile time (lowest priority)

use include_dir::{include_dir, Dir};
use std::path::PathBuf;
use tracing::debug;

// Embed the registry directory at compile time
static REGISTRY_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/registry");

/// Mailcap dotfile name in the user's home directory.
pub const USER_MAILCAP: &str = ".mailcap";
/// mime.types dotfile name in the user's home directory.
pub const USER_MIME_TYPES: &str = ".mime.types";

/// RFC 1524 search-path variable naming extra mailcap files.
pub const MAILCAPS_VAR: &str = "MAILCAPS";
/// Search-path variable naming extra mime.types files.
pub const MIMETYPES_VAR: &str = "MIMETYPES";

/// Well-known system mailcap locations, probed in order.
pub const SYSTEM_MAILCAP: &[&str] =
    &["/etc/mailcap", "/usr/etc/mailcap", "/usr/local/etc/mailcap"];
/// Well-known system mime.types locations, probed in order.
pub const SYSTEM_MIME_TYPES: &[&str] = &["/etc/mime.types", "/usr/local/etc/mime.types"];

/// Embedded built-in mailcap table.
pub const DEFAULT_MAILCAP: &str = "mailcap.default";
/// Embedded built-in mime.types table.
pub const DEFAULT_MIME_TYPES: &str = "mimetypes.default";

/// Existing on-disk source files for one registry, highest priority first.
///
/// The embedded built-in default is not a path; fetch it with [`embedded`].
pub fn layered_paths(user_file: &str, env_var: &str, system: &[&str]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(home) = dirs::home_dir() {
        let candidate = home.join(user_file);
        if candidate.is_file() {
            debug!("found user registry file: {}", candidate.display());
            paths.push(candidate);
        }
    }

    if let Ok(list) = std::env::var(env_var) {
        for candidate in std::env::split_paths(&list) {
            if candidate.is_file() {
                debug!(
                    "found registry file via {}: {}",
                    env_var,
                    candidate.display()
                );
                paths.push(candidate);
            }
        }
    }

    for name in system {
        let candidate = PathBuf::from(name);
        if candidate.is_file() {
            debug!("found system registry file: {}", candidate.display());
            paths.push(candidate);
            break;
        }
    }

    paths
}

/// Contents of an embedded built-in table.
pub fn embedded(name: &str) -> Option<&'static str> {
    REGISTRY_DIR
        .get_file(name)
        .and_then(|file| file.contents_utf8())
}
