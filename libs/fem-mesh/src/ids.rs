//! # Identifier Newtypes
//!
//! Nodes, elements, properties and materials each get their own ID space.
//! Keeping them as distinct types stops an element ID from being used where a
//! node ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw identifier.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier.
            #[inline]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Returns this identifier shifted by `offset`, or `None` on overflow.
            #[inline]
            pub fn checked_add(self, offset: u32) -> Option<Self> {
                self.0.checked_add(offset).map(Self)
            }

            /// Returns the identifier following this one, or `None` on overflow.
            #[inline]
            pub fn next(self) -> Option<Self> {
                self.checked_add(1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

id_type!(
    /// Grid point identifier.
    NodeId
);
id_type!(
    /// Element identifier.
    ElementId
);
id_type!(
    /// Property identifier; groups elements sharing one material.
    PropertyId
);
id_type!(
    /// Material identifier.
    MaterialId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_raw_value() {
        assert!(NodeId::new(2) < NodeId::new(10));
        assert_eq!(ElementId::new(5).next(), Some(ElementId::new(6)));
        assert_eq!(MaterialId::new(u32::MAX).next(), None);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&PropertyId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(back, NodeId::new(7));
    }

    #[test]
    fn test_display_is_raw_number() {
        assert_eq!(NodeId::new(101).to_string(), "101");
    }
}
