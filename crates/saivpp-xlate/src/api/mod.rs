//! Typed wrappers for the dataplane call groups.
//!
//! Each submodule defines the request records of one group and an API struct
//! borrowing a [`Dataplane`](crate::Dataplane). The wrappers:
//!
//! - Build the request record the engine expects
//! - Convert the raw status into a `Result`, keeping the code unchanged
//! - Log applied changes and rejections
//!
//! Nothing here retries or rolls back; a failed multi-step change is left for
//! the caller to reconcile.
//!
//! # Available API Modules
//!
//! - [`interface`]: LCP pairing, loopbacks, sub-interfaces, VRF binding,
//!   admin state, MTU
//! - [`route`]: routes, interface addresses, ECMP flow hash
//! - [`neighbor`]: IPv4/IPv6 neighbor entries
//! - [`vrf`]: VRF tables
//! - [`acl`]: ACL programming and interface binding

pub mod acl;
pub mod interface;
pub mod neighbor;
pub mod route;
pub mod vrf;

pub use acl::{Acl, AclAction, AclApi, AclDirection, AclRule, AddrMatch, PortRange};
pub use interface::{InterfaceApi, MtuType};
pub use neighbor::{Neighbor, NeighborApi};
pub use route::{FlowHash, IpRoute, NextHop, NextHopType, RouteApi};
pub use vrf::VrfApi;

use crate::error::{VppStatus, XlateResult};
use tracing::warn;

/// Converts a dataplane status into a Result, logging rejections.
pub(crate) fn check(op: &'static str, status: VppStatus) -> XlateResult<()> {
    if status.is_error() {
        warn!("{} failed with status {}", op, status);
    }
    status.into_result(op)
}
