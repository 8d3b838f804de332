use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use seal_types::{ContainerKind, ContainerState, SealMetadata, TypeError};

/// A sealable container item as the item layer hands it over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub kind: ContainerKind,
    pub state: ContainerState,
    pub meta: SealMetadata,
}

impl Container {
    /// A new, empty container.
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            state: ContainerState::Empty,
            meta: SealMetadata::new(),
        }
    }

    /// Rebuild from an item's state and attribute bag.
    pub fn from_attributes(
        kind: ContainerKind,
        state: ContainerState,
        attrs: &BTreeMap<String, String>,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            kind,
            state,
            meta: SealMetadata::from_attributes(attrs)?,
        })
    }

    pub fn with_addresses(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.meta.from = Some(from.into());
        self.meta.to = Some(to.into());
        self
    }

    /// Item code of the container in its current state, e.g. `envelope-sealed`.
    pub fn item_code(&self) -> String {
        self.kind.item_code(self.state)
    }

    pub fn is_sealed(&self) -> bool {
        self.state == ContainerState::Sealed
    }
}

/// What opening a container yields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedContents {
    /// The payload stored when the container was filled.
    pub payload: Vec<u8>,
    /// Who filled it.
    pub creator_id: String,
    /// The container left behind.
    pub container: Container,
}
