//! Mailcap (RFC 1524) command registry
//!
//! Three layers:
//! 1. [`parser`] turns mailcap text into entries
//! 2. [`MailcapFile`] holds the tables for one source
//! 3. [`MailcapCommandMap`] aggregates sources in precedence order

pub mod command_map;
pub mod file;
pub mod parser;

pub use command_map::{CommandInfo, MailcapCommandMap};
pub use file::{CommandTable, MailcapFile};
pub use parser::MailcapEntry;
