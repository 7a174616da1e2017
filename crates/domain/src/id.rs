//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Namespace for name-derived zone identifiers.
const ZONE_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6f1d_8a52_3c4e_4b7a_9e21_53d0_c7a4_e1b9);

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Stable identifier of a configured [`Zone`](crate::zone::Zone).
    ZoneId
);

define_id!(
    /// Unique identifier for a [`SceneEvent`](crate::event::SceneEvent).
    EventId
);

impl ZoneId {
    /// Derive the identifier from a zone name.
    ///
    /// Names that slugify identically ("Living Room", "living_room") map to
    /// the same id, so the id survives restarts and cosmetic renames.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(uuid::Uuid::new_v5(
            &ZONE_NAMESPACE,
            crate::zone::slugify(name).as_bytes(),
        ))
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl EventId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_derive_same_zone_id_for_same_name() {
        assert_eq!(ZoneId::from_name("Kitchen"), ZoneId::from_name("Kitchen"));
    }

    #[test]
    fn should_derive_same_zone_id_for_names_with_same_slug() {
        assert_eq!(
            ZoneId::from_name("Living Room"),
            ZoneId::from_name("living_room")
        );
    }

    #[test]
    fn should_derive_different_zone_ids_for_different_names() {
        assert_ne!(ZoneId::from_name("Kitchen"), ZoneId::from_name("Bedroom"));
    }

    #[test]
    fn should_generate_unique_event_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn should_parse_zone_id_from_display_form() {
        let id = ZoneId::from_name("Office");
        let parsed: ZoneId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_reject_invalid_uuid() {
        assert!(ZoneId::from_str("not-a-uuid").is_err());
    }
}
