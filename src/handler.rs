//! Data content handlers
//!
//! A [`DataContentHandler`] converts between a MIME-typed byte stream and a
//! typed object. Mailcap entries bind handler *names* to MIME types; this
//! module holds the table that resolves those names to constructors, plus
//! the built-in text and byte-stream handlers the embedded default mailcap
//! refers to.

use std::any::Any;
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::debug;

/// Verb under which mailcap entries bind content handlers.
pub const CONTENT_HANDLER_VERB: &str = "content-handler";

/// Name of the built-in UTF-8 text handler.
pub const TEXT_PLAIN_HANDLER: &str = "text-plain";

/// Name of the built-in raw byte-stream handler.
pub const OCTET_STREAM_HANDLER: &str = "octet-stream";

/// Converts between a MIME-typed byte stream and a typed object.
pub trait DataContentHandler: Send + Sync {
    /// Decode a byte stream into the handler's object representation.
    fn decode(&self, data: &[u8]) -> io::Result<Box<dyn Any + Send>>;

    /// Encode an object produced by [`DataContentHandler::decode`] back onto
    /// a byte stream.
    fn encode(&self, value: &(dyn Any + Send), out: &mut dyn Write) -> io::Result<()>;
}

impl std::fmt::Debug for dyn DataContentHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataContentHandler")
    }
}

type HandlerFactory = Box<dyn Fn() -> Box<dyn DataContentHandler> + Send + Sync>;

/// Name -> constructor table for content handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in handlers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TEXT_PLAIN_HANDLER, || Box::new(TextPlainHandler));
        registry.register(OCTET_STREAM_HANDLER, || Box::new(OctetStreamHandler));
        registry
    }

    /// Register a constructor under a handler name, replacing any previous
    /// registration for that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn DataContentHandler> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("registering content handler factory: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Whether a constructor is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Construct the handler registered under this name.
    pub fn create(&self, name: &str) -> Option<Box<dyn DataContentHandler>> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Decodes to `String` (lossy UTF-8), encodes from `String` or `&str`.
struct TextPlainHandler;

impl DataContentHandler for TextPlainHandler {
    fn decode(&self, data: &[u8]) -> io::Result<Box<dyn Any + Send>> {
        Ok(Box::new(String::from_utf8_lossy(data).into_owned()))
    }

    fn encode(&self, value: &(dyn Any + Send), out: &mut dyn Write) -> io::Result<()> {
        if let Some(s) = value.downcast_ref::<String>() {
            return out.write_all(s.as_bytes());
        }
        if let Some(s) = value.downcast_ref::<&str>() {
            return out.write_all(s.as_bytes());
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "text-plain handler expects a String",
        ))
    }
}

/// Passes `Vec<u8>` through unchanged.
struct OctetStreamHandler;

impl DataContentHandler for OctetStreamHandler {
    fn decode(&self, data: &[u8]) -> io::Result<Box<dyn Any + Send>> {
        Ok(Box::new(data.to_vec()))
    }

    fn encode(&self, value: &(dyn Any + Send), out: &mut dyn Write) -> io::Result<()> {
        let bytes = value.downcast_ref::<Vec<u8>>().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "octet-stream handler expects Vec<u8>",
            )
        })?;
        out.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = HandlerRegistry::with_builtins();
        assert!(registry.contains(TEXT_PLAIN_HANDLER));
        assert!(registry.contains(OCTET_STREAM_HANDLER));
        assert!(!registry.contains("missing"));
        assert!(registry.create("missing").is_none());
    }

    #[test]
    fn test_text_round_trip() {
        let registry = HandlerRegistry::with_builtins();
        let handler = registry.create(TEXT_PLAIN_HANDLER).unwrap();

        let value = handler.decode(b"hello mailcap").unwrap();
        assert_eq!(
            value.downcast_ref::<String>().map(String::as_str),
            Some("hello mailcap")
        );

        let mut out = Vec::new();
        handler.encode(value.as_ref(), &mut out).unwrap();
        assert_eq!(out, b"hello mailcap");
    }

    #[test]
    fn test_octet_stream_round_trip() {
        let registry = HandlerRegistry::with_builtins();
        let handler = registry.create(OCTET_STREAM_HANDLER).unwrap();

        let value = handler.decode(&[0u8, 159, 146, 150]).unwrap();
        let mut out = Vec::new();
        handler.encode(value.as_ref(), &mut out).unwrap();
        assert_eq!(out, vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn test_encode_rejects_wrong_type() {
        let registry = HandlerRegistry::with_builtins();
        let handler = registry.create(TEXT_PLAIN_HANDLER).unwrap();
        let value: Box<dyn Any + Send> = Box::new(42u32);
        let mut out: Vec<u8> = Vec::new();
        assert!(handler.encode(value.as_ref(), &mut out).is_err());
    }

    #[test]
    fn test_custom_registration_replaces() {
        let mut registry = HandlerRegistry::with_builtins();
        registry.register(TEXT_PLAIN_HANDLER, || Box::new(OctetStreamHandler));
        let handler = registry.create(TEXT_PLAIN_HANDLER).unwrap();
        // replaced handler now decodes to Vec<u8>
        let value = handler.decode(b"abc").unwrap();
        assert!(value.downcast_ref::<Vec<u8>>().is_some());
    }
}
