//! Dataplane handles.
//!
//! The dataplane hands out plain `u32` indices for the objects it owns. The
//! engine does not track which caller holds them and offers no lookup by name
//! for ACLs, so callers persist these values for the lifetime of the object.
//! Distinct newtypes keep an ACL index from being passed where an interface
//! index is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_handle {
    ($name:ident, $label:literal) => {
        #[doc = concat!("Dataplane ", $label, ".")]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            pub const fn as_raw(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $label, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                $name(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(handle: $name) -> u32 {
                handle.0
            }
        }
    };
}

define_handle!(SwIfIndex, "sw_if_index");
define_handle!(AclIndex, "acl_index");
define_handle!(VrfId, "vrf");

impl VrfId {
    /// The default routing table.
    pub const DEFAULT: VrfId = VrfId(0);

    pub const fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl Default for VrfId {
    fn default() -> Self {
        VrfId::DEFAULT
    }
}
