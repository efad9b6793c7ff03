//! Core shared types for the mcp-bridge value codec.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod kind;
mod value;
mod wire;

/// Error taxonomy and result alias shared by the codec crates.
pub use error::{CodecError, CodecResult};
/// Opaque handle identifying a live object in the reference registry.
pub use ids::ObjectId;
/// Primitive kinds understood by the type descriptor algebra.
pub use kind::PrimitiveKind;
/// Host-side dynamic value model.
pub use value::{Fields, HostObject, HostValue, ObjectRef, Record};
/// Wire envelope layout and marker keys.
pub use wire::{POINTER_MARKER, PointerEnvelope, TYPE_MARKER, embedded_type_tag, has_pointer_marker};
