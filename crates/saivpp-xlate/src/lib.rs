//! Translation layer between a SAI provider and the VPP dataplane.
//!
//! The dataplane engine is reached through a flat C call set: every
//! configuration call returns an integer status, and asynchronous state
//! changes (link up/down) come back through an event queue. This crate gives
//! that contract a typed shape.
//!
//! # Architecture
//!
//! - [`dataplane`]: the [`Dataplane`] trait, one method per engine call
//! - [`api`]: typed wrappers per call group (interfaces, routes, neighbors,
//!   VRFs, ACLs)
//! - [`event_queue`]: FIFO of events with explicit release ownership
//! - [`event`]: the event union
//! - [`client`]: [`XlateClient`], a connected session plus its event queue
//! - [`config`]: TOML configuration
//! - [`ffi`]: C layouts of the engine's records and, with the `vpp-link`
//!   feature, the engine's symbols
//! - [`session`]: the process-wide engine session claim
//! - `vpp`: [`VppDataplane`], the linked engine backend (`vpp-link` only)
//!
//! # Example
//!
//! ```ignore
//! use saivpp_xlate::{VppDataplane, XlateClient, XlateConfig, XlateResult};
//!
//! fn bring_up(port: &str) -> XlateResult<()> {
//!     let dataplane = VppDataplane::new()?;
//!     let mut client = XlateClient::connect(dataplane, XlateConfig::default())?;
//!     client.interfaces().set_admin_state(port, true)?;
//!     client.drain_events(|event| println!("{}", event))?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod dataplane;
pub mod error;
pub mod event;
pub mod event_queue;
pub mod ffi;
pub mod session;
pub mod types;
#[cfg(feature = "vpp-link")]
mod vpp;

pub use api::{
    Acl, AclAction, AclApi, AclDirection, AclRule, AddrMatch, FlowHash, InterfaceApi, IpRoute,
    MtuType, Neighbor, NeighborApi, NextHop, NextHopType, PortRange, RouteApi, VrfApi,
};
pub use client::XlateClient;
pub use config::{ConnectConfig, EventConfig, XlateConfig, DEFAULT_CONFIG_PATH};
pub use dataplane::Dataplane;
pub use error::{VppStatus, VppStatusExt, XlateError, XlateResult};
pub use event::{InterfaceStatus, VppEvent};
pub use session::SessionGuard;
pub use event_queue::{
    channel, channel_with_free, DequeuedEvent, EventConsumer, EventProducer, QueueStats,
};
pub use types::{AclIndex, SwIfIndex, VrfId};
#[cfg(feature = "vpp-link")]
pub use vpp::VppDataplane;

pub use saivpp_types::{AddressFamily, IpPrefix, MacAddress, VlanId};
