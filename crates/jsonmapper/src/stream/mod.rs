//! Streaming JSON reader and writer.
//!
//! Both sides share the same [`scope`] model, so a token sequence written by
//! [`JsonWriter`] reads back through [`JsonReader`] with the same structure.

pub(crate) mod escape;
mod reader;
pub(crate) mod scope;
mod token;
mod writer;


pub use reader::JsonReader;
pub use token::Token;
pub use writer::JsonWriter;
