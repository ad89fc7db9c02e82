use crate::error::ModelError;
use uuid::Uuid;

/// Strongly typed id for a configured collection.
///
/// Collections live in the external collection store; this layer only ever
/// reads them, so the id is the sole handle the proxy holds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionId(pub Uuid);

impl Default for CollectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionId {
    pub fn new() -> Self {
        CollectionId(Uuid::now_v7())
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let uuid = s
            .parse::<Uuid>()
            .map_err(|_| ModelError::InvalidId(format!("not a collection id: {s}")))?;
        Ok(CollectionId(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for CollectionId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CollectionId {
    fn from(uuid: Uuid) -> Self {
        CollectionId(uuid)
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
