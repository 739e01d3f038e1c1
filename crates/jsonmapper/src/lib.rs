//! Streaming JSON reader/writer and a type-directed serializer/deserializer
//! framework.
//!
//! The crate is layered:
//! - [`JsonReader`] and [`JsonWriter`] work one token at a time, in strict
//!   RFC 4627 mode or in a lenient superset.
//! - The [`codec`] module defines the [`Serializer`](codec::Serializer) and
//!   [`Deserializer`](codec::Deserializer) contracts with codecs for
//!   scalars, options, arrays, collections, maps, enums, untyped values,
//!   polymorphic values and shared objects.
//! - [`ObjectMapper`] reads and writes whole documents for a root type.

#![allow(missing_docs)]
extern crate alloc;

pub mod codec;
mod context;
mod error;
mod identity;
mod mapper;
mod number;
mod options;
mod registry;
mod stream;
mod value;

#[cfg(test)]
mod tests;

pub use context::{
    DeserializationContext, DeserializerParameters, Include, SerializationContext, SerializerParameters,
};
pub use error::{Error, ReadError, ReadErrorKind, SyntaxError, WriteError};
pub use identity::{BackReference, ObjectId};
pub use mapper::ObjectMapper;
pub use number::{BigInteger, JsonNumber};
pub use options::{DeserializerOptions, SerializerOptions};
pub use registry::{
    CodecRegistry, Registered, SharedDeserializer, SharedKeyDeserializer, SharedKeySerializer, SharedSerializer,
};
pub use stream::{JsonReader, JsonWriter, Token};
pub use value::{Array, Map, Value};
