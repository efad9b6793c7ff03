//! Shared error definitions for value encoding and decoding.

use thiserror::Error;
use uuid::Error as UuidError;

use crate::PrimitiveKind;

/// Result alias used throughout the codec crates.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Errors raised while coercing, encoding, or decoding values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be coerced into the requested primitive kind.
    #[error("cannot coerce `{value}` to {kind}")]
    Coercion {
        /// Target primitive kind.
        kind: PrimitiveKind,
        /// Rendering of the offending value.
        value: String,
    },

    /// Wire data carried an embedded type tag different from the declared one.
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        /// Type tag declared by the descriptor.
        expected: String,
        /// Type tag embedded in the wire data.
        found: String,
    },

    /// A pointer envelope referenced a handle that is absent or expired.
    #[error("unknown object reference `{id}`")]
    UnknownReference {
        /// Handle carried by the envelope.
        id: String,
    },

    /// Wire data carried the pointer marker but was not a valid envelope.
    #[error("invalid pointer envelope: {reason}")]
    InvalidEnvelope {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A descriptor was constructed with an invalid shape.
    #[error("invalid type descriptor: {reason}")]
    InvalidDescriptor {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A registered type factory rejected the supplied fields.
    #[error("cannot construct `{type_name}`: {reason}")]
    Construction {
        /// Type tag of the factory.
        type_name: String,
        /// Reason reported by the factory.
        reason: String,
    },

    /// An object handle string could not be parsed.
    #[error("invalid object handle: {source}")]
    InvalidHandle {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },
}

impl CodecError {
    /// Helper to construct coercion errors from any displayable value.
    #[must_use]
    pub fn coercion(kind: PrimitiveKind, value: impl ToString) -> Self {
        Self::Coercion {
            kind,
            value: value.to_string(),
        }
    }

    /// Helper to construct factory errors.
    #[must_use]
    pub fn construction(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}
