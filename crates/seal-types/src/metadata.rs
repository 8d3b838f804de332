use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{BlobId, StampId};

/// Attribute keys the host item layer stores on container and stamp items.
pub mod keys {
    pub const CONTENTS_ID: &str = "ContentsId";
    pub const STAMP_ID: &str = "StampId";
    pub const STAMP_TITLE: &str = "StampTitle";
    pub const STAMP_DESIGN: &str = "StampDesign";
    pub const WAX_COLOR: &str = "WaxColor";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const SEALER_NAME: &str = "SealerName";
    pub const SEALER_ID: &str = "SealerId";
    pub const VERSION: &str = "SealMetadataVersion";
}

/// Physical kind of a sealable container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Envelope,
    Parcel,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Envelope => "envelope",
            Self::Parcel => "parcel",
        }
    }

    /// Item code for this container in the given state, e.g. `envelope-sealed`.
    pub fn item_code(self, state: ContainerState) -> String {
        format!("{}-{}", self.as_str(), state.as_str())
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    /// No contents.
    Empty,
    /// Holds contents but carries no seal.
    Unsealed,
    /// Holds contents under an intact wax seal.
    Sealed,
    /// Seal broken; may still be refilled.
    Opened,
}

impl ContainerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Unsealed => "unsealed",
            Self::Sealed => "sealed",
            Self::Opened => "opened",
        }
    }

    /// State after contents are placed into the container, if allowed.
    pub fn after_fill(self) -> Option<Self> {
        match self {
            Self::Empty | Self::Opened => Some(Self::Unsealed),
            Self::Unsealed | Self::Sealed => None,
        }
    }

    /// State after a seal is applied, if allowed.
    pub fn after_seal(self) -> Option<Self> {
        match self {
            Self::Unsealed => Some(Self::Sealed),
            _ => None,
        }
    }

    /// State of the container left behind after its contents are taken out.
    ///
    /// Breaking an intact seal leaves an opened container that keeps the
    /// emblem; emptying an unsealed or already opened one leaves it blank.
    pub fn after_open(self) -> Option<Self> {
        match self {
            Self::Sealed => Some(Self::Opened),
            Self::Unsealed | Self::Opened => Some(Self::Empty),
            Self::Empty => None,
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerState {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "unsealed" => Ok(Self::Unsealed),
            "sealed" => Ok(Self::Sealed),
            "opened" => Ok(Self::Opened),
            other => Err(TypeError::Serialization(format!("unknown container state {other:?}"))),
        }
    }
}

/// Typed per-item metadata for containers and stamps.
///
/// Replaces the host's string-keyed attribute bag. Conversion to and from
/// that bag happens only in [`SealMetadata::from_attributes`] and
/// [`SealMetadata::to_attributes`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealMetadata {
    pub version: u32,
    pub contents_id: Option<BlobId>,
    pub stamp_id: Option<StampId>,
    pub stamp_title: Option<String>,
    pub stamp_design: Option<String>,
    pub wax_color: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Display name of whoever sealed the container (older containers only).
    pub sealer_name: Option<String>,
    /// Player uid recorded by the oldest containers, pending a name lookup.
    pub sealer_id: Option<String>,
}

impl SealMetadata {
    pub const CURRENT_VERSION: u32 = 2;

    /// Fresh metadata at the current version.
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Self::default()
        }
    }

    /// Read metadata out of a host attribute bag.
    ///
    /// Empty values count as absent. Unparseable ids are an error rather
    /// than silently dropped. A bag without a version key is version 1.
    pub fn from_attributes(attrs: &BTreeMap<String, String>) -> Result<Self, TypeError> {
        let get = |key: &str| {
            attrs
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let version = match get(keys::VERSION) {
            Some(v) => v
                .parse()
                .map_err(|e| TypeError::Serialization(format!("metadata version {v:?}: {e}")))?,
            None => 1,
        };

        Ok(Self {
            version,
            contents_id: get(keys::CONTENTS_ID).map(|v| BlobId::parse(&v)).transpose()?,
            stamp_id: get(keys::STAMP_ID).map(|v| v.parse()).transpose()?,
            stamp_title: get(keys::STAMP_TITLE),
            stamp_design: get(keys::STAMP_DESIGN),
            wax_color: get(keys::WAX_COLOR),
            from: get(keys::FROM),
            to: get(keys::TO),
            sealer_name: get(keys::SEALER_NAME),
            sealer_id: get(keys::SEALER_ID),
        })
    }

    /// Write metadata into a host attribute bag; absent fields are omitted.
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        attrs.insert(keys::VERSION.to_string(), self.version.to_string());
        let mut put = |key: &str, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                attrs.insert(key.to_string(), v);
            }
        };
        put(keys::CONTENTS_ID, self.contents_id.as_ref().map(BlobId::to_string));
        put(keys::STAMP_ID, self.stamp_id.map(|id| id.to_string()));
        put(keys::STAMP_TITLE, self.stamp_title.clone());
        put(keys::STAMP_DESIGN, self.stamp_design.clone());
        put(keys::WAX_COLOR, self.wax_color.clone());
        put(keys::FROM, self.from.clone());
        put(keys::TO, self.to.clone());
        put(keys::SEALER_NAME, self.sealer_name.clone());
        put(keys::SEALER_ID, self.sealer_id.clone());
        attrs
    }

    /// Whether this record still needs [`SealMetadata::migrate_legacy`].
    pub fn needs_migration(&self) -> bool {
        self.version < Self::CURRENT_VERSION || self.sealer_id.is_some()
    }

    /// Bring a legacy record up to the current version.
    ///
    /// A recorded sealer uid is replaced by the player name `resolve_name`
    /// returns for it. When the uid cannot be resolved it stays in place and
    /// the record keeps its old version so a later pass can retry. Returns
    /// `true` if anything changed.
    pub fn migrate_legacy<F>(&mut self, resolve_name: F) -> bool
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let before = self.clone();
        if let Some(uid) = self.sealer_id.clone() {
            match resolve_name(&uid).filter(|n| !n.is_empty()) {
                Some(name) => {
                    self.sealer_name = Some(name);
                    self.sealer_id = None;
                }
                None => return false,
            }
        }
        self.version = Self::CURRENT_VERSION;
        *self != before
    }

    /// Carry the visual and addressing fields over to the container left
    /// behind after opening. Contents never carry over.
    pub fn carried_over(&self) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            contents_id: None,
            stamp_id: self.stamp_id,
            stamp_title: self.stamp_title.clone(),
            stamp_design: self.stamp_design.clone(),
            wax_color: self.wax_color.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            sealer_name: None,
            sealer_id: None,
        }
    }
}
