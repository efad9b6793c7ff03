//! Errors produced by tool registration and invocation.

use bridge_primitives::CodecError;
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool registration and invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool definition failed validation.
    #[error("invalid tool: {reason}")]
    InvalidTool {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool name collided with an existing registration.
    #[error("tool `{name}` already exists")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },

    /// Requested tool does not exist.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// Two named tool sets with different names were merged.
    #[error("tool sets must have the same name (`{target}` vs `{source_name}`)")]
    HolderMismatch {
        /// Name of the receiving set.
        target: String,
        /// Name of the set being merged in.
        source_name: String,
    },

    /// A required parameter was absent from the call.
    #[error("missing required argument `{name}` for tool `{tool}`")]
    MissingArgument {
        /// Tool being invoked.
        tool: String,
        /// Parameter that was not supplied.
        name: String,
    },

    /// Argument decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Tool execution failed.
    #[error("{reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Creates a validation error from the supplied reason.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidTool {
            reason: reason.into(),
        }
    }
}
