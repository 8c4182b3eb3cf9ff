use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidArgumentError;

/// Unique identifier for an aggregate instance.
///
/// An identity has two parts: the external id, a UUID fixed at creation, and
/// an optional surrogate number that the persistence boundary assigns the
/// first time the aggregate is stored. Only the external id takes part in
/// equality and hashing; the surrogate is metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AggregateId {
    #[serde(rename = "external_id")]
    external: Uuid,

    #[serde(
        rename = "surrogate_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    surrogate: Option<u64>,
}

impl AggregateId {
    /// Creates a new random aggregate ID with no surrogate.
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Parses an aggregate ID from its external string form.
    pub fn from_string(external: &str) -> Result<Self, InvalidArgumentError> {
        let uuid = Uuid::parse_str(external.trim()).map_err(|_| {
            InvalidArgumentError::MalformedId {
                value: external.to_string(),
            }
        })?;
        Ok(Self::from_uuid(uuid))
    }

    /// Creates an aggregate ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            external: uuid,
            surrogate: None,
        }
    }

    /// Returns a copy of this identity with the surrogate id attached.
    ///
    /// The surrogate can be set once. When it is already present the identity
    /// is returned unchanged, and a zero id leaves it unset.
    pub fn with_surrogate(self, id: i64) -> Result<Self, InvalidArgumentError> {
        let surrogate =
            u64::try_from(id).map_err(|_| InvalidArgumentError::NegativeSurrogate { value: id })?;

        if self.surrogate.is_some() || surrogate == 0 {
            return Ok(self);
        }

        Ok(Self {
            external: self.external,
            surrogate: Some(surrogate),
        })
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.external
    }

    /// Returns the external id in its canonical string form.
    pub fn external_id(&self) -> String {
        self.external.to_string()
    }

    /// Returns the surrogate id, if one has been assigned.
    pub fn surrogate_id(&self) -> Option<u64> {
        self.surrogate
    }

    /// Returns true once a surrogate id has been assigned.
    pub fn has_surrogate(&self) -> bool {
        self.surrogate.is_some()
    }
}

impl PartialEq for AggregateId {
    fn eq(&self, other: &Self) -> bool {
        self.external == other.external
    }
}

impl Eq for AggregateId {}

impl Hash for AggregateId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.external.hash(state);
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.external)
    }
}

impl FromStr for AggregateId {
    type Err = InvalidArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<AggregateId> for Uuid {
    fn from(id: AggregateId) -> Self {
        id.external
    }
}
