//! Object handle types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CodecError;

/// Globally unique handle for an entry in the object reference registry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generates a fresh random handle.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a handle from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for ObjectId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ObjectId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(CodecError::from)?;
        Ok(Self::from_uuid(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_object_id() {
        let id = ObjectId::random();
        let parsed = id.to_string().parse::<ObjectId>().expect("parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn malformed_handle_is_rejected() {
        let err = "not-a-handle".parse::<ObjectId>().expect_err("should fail");
        assert!(matches!(err, CodecError::InvalidHandle { .. }));
    }
}
