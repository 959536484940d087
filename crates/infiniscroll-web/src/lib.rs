#![forbid(unsafe_code)]

//! Browser-side glue for infiniscroll.
//!
//! The engine itself never touches the DOM or the network. A browser host
//! forwards encoded input through [`input_parser`], hands fetched response
//! bodies to [`page_codec`], and renders records with a template such as
//! [`message_template::MessageTemplate`].

pub mod input_parser;
pub mod message_template;
pub mod page_codec;

pub use input_parser::{InputParseError, parse_encoded_input};
pub use message_template::{Author, DEFAULT_BASE_URL, MESSAGES_PATH, Message, MessageTemplate};
pub use page_codec::{JsonPageSource, decode_page, decode_response};
