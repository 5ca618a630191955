//! hela-ingest: mobile-money confirmation message parsing.

pub mod types;
pub mod parsers;

pub use parsers::mpesa::{MessageParser, ParserConfig, parse_message};
pub use types::{Direction, ParsedMessage};
