//! Asynchronous dataplane events.
//!
//! Events are a tagged union keyed by a numeric discriminator. New kinds are
//! added as new variants; a discriminator this build does not recognise
//! arrives as [`VppEvent::Unknown`] and is ignored and released by consumers.

use std::fmt;

/// Discriminator of a link status change (`VPP_INTF_LINK_STATUS`).
pub const EVENT_LINK_STATUS: u32 = 1;

/// Size of the interface name field in a link status event, NUL included.
pub const HWIF_NAME_LEN: usize = 64;

/// Link state of a dataplane interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceStatus {
    pub hwif_name: String,
    pub link_up: bool,
}

/// An event published by the dataplane.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VppEvent {
    /// Interface link went up or down.
    LinkStatus(InterfaceStatus),
    /// A discriminator this build does not know about.
    Unknown { kind: u32 },
}

impl VppEvent {
    pub fn link_status(hwif_name: impl Into<String>, link_up: bool) -> Self {
        VppEvent::LinkStatus(InterfaceStatus {
            hwif_name: hwif_name.into(),
            link_up,
        })
    }

    /// Returns the numeric discriminator of this event.
    pub fn kind(&self) -> u32 {
        match self {
            VppEvent::LinkStatus(_) => EVENT_LINK_STATUS,
            VppEvent::Unknown { kind } => *kind,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, VppEvent::Unknown { .. })
    }
}

impl fmt::Display for VppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VppEvent::LinkStatus(status) => write!(
                f,
                "link {} on {}",
                if status.link_up { "up" } else { "down" },
                status.hwif_name
            ),
            VppEvent::Unknown { kind } => write!(f, "unknown event kind {}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind() {
        assert_eq!(VppEvent::link_status("eth0", true).kind(), EVENT_LINK_STATUS);
        assert_eq!(VppEvent::Unknown { kind: 42 }.kind(), 42);
    }

    #[test]
    fn test_known() {
        assert!(VppEvent::link_status("eth0", false).is_known());
        assert!(!VppEvent::Unknown { kind: 9 }.is_known());
    }

    #[test]
    fn test_display() {
        assert_eq!(VppEvent::link_status("eth1", true).to_string(), "link up on eth1");
        assert_eq!(
            VppEvent::link_status("eth1", false).to_string(),
            "link down on eth1"
        );
    }
}
