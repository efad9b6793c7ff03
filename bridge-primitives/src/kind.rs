//! Primitive kinds of the descriptor algebra.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Scalar kinds a primitive descriptor coerces to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Signed 64-bit integer.
    Int,
    /// 64-bit floating point number.
    Float,
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
}

impl PrimitiveKind {
    /// Name of the matching JSON Schema type.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Float => "number",
            Self::String => "string",
            Self::Bool => "boolean",
        }
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}
