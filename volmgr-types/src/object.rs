// SPDX-License-Identifier: GPL-3.0-only

//! Typed arena handles for the four object kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// `None` once the arena outgrows the 32-bit handle space.
            pub fn try_from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }

            /// Handle of an existing arena slot. Slots are only created
            /// through [`Self::try_from_index`], so `index` always fits.
            pub fn from_index(index: usize) -> Self {
                debug_assert!(u32::try_from(index).is_ok());
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

object_id!(
    /// Handle of a drive in the configuration arena.
    DriveId
);
object_id!(
    /// Handle of a subdisk in the configuration arena.
    SubdiskId
);
object_id!(
    /// Handle of a plex in the configuration arena.
    PlexId
);
object_id!(
    /// Handle of a volume in the configuration arena.
    VolumeId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Drive,
    Subdisk,
    Plex,
    Volume,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Drive => write!(f, "drive"),
            ObjectKind::Subdisk => write!(f, "subdisk"),
            ObjectKind::Plex => write!(f, "plex"),
            ObjectKind::Volume => write!(f, "volume"),
        }
    }
}

/// A resolved object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Drive(DriveId),
    Subdisk(SubdiskId),
    Plex(PlexId),
    Volume(VolumeId),
}

impl ObjectRef {
    pub fn kind(self) -> ObjectKind {
        match self {
            ObjectRef::Drive(_) => ObjectKind::Drive,
            ObjectRef::Subdisk(_) => ObjectKind::Subdisk,
            ObjectRef::Plex(_) => ObjectKind::Plex,
            ObjectRef::Volume(_) => ObjectKind::Volume,
        }
    }
}
