//! The dataplane call contract.
//!
//! One method per engine call. Each returns the engine's status untouched;
//! an `Err` means the request never reached the engine because it could not
//! be marshalled (for example a name with an interior NUL).
//!
//! Requests are borrowed for the duration of the call only. Implementations
//! must not retain them.
//!
//! None of these calls are assumed re-entrant. Implementations that wrap a
//! process-global engine binding should not be `Sync`, so that callers
//! serialize their calls by construction.

use crate::api::{Acl, FlowHash, IpRoute, MtuType};
use crate::error::{VppStatus, XlateResult};
use crate::event::VppEvent;
use crate::event_queue::EventProducer;
use saivpp_types::{AddressFamily, MacAddress};
use std::net::{Ipv4Addr, Ipv6Addr};

pub trait Dataplane {
    // Lifecycle

    /// Establishes the session with the engine.
    fn init_vpp_client(&self) -> XlateResult<VppStatus>;

    /// Re-reads the engine's interface list.
    fn refresh_interfaces_list(&self) -> XlateResult<VppStatus>;

    // Interfaces

    fn configure_lcp_interface(
        &self,
        hwif_name: &str,
        hostif_name: &str,
        is_add: bool,
    ) -> XlateResult<VppStatus>;

    fn create_loopback_instance(&self, hwif_name: &str, instance: u32) -> XlateResult<VppStatus>;

    fn delete_loopback(&self, hwif_name: &str, instance: u32) -> XlateResult<VppStatus>;

    /// Returns the interface index, or a negative status.
    fn get_sw_if_idx(&self, ifname: &str) -> XlateResult<i32>;

    fn create_sub_interface(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vlan_id: u16,
    ) -> XlateResult<VppStatus>;

    fn delete_sub_interface(&self, hwif_name: &str, sub_id: u32) -> XlateResult<VppStatus>;

    fn set_interface_vrf(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vrf_id: u32,
        is_ipv6: bool,
    ) -> XlateResult<VppStatus>;

    /// Adds or removes `prefix.prefix` as an interface address. Next-hops in
    /// the record are ignored.
    fn interface_ip_address_add_del(
        &self,
        hwif_name: &str,
        prefix: &IpRoute,
        is_add: bool,
    ) -> XlateResult<VppStatus>;

    fn interface_set_state(&self, hwif_name: &str, is_up: bool) -> XlateResult<VppStatus>;

    fn hw_interface_set_mtu(&self, hwif_name: &str, mtu: u32) -> XlateResult<VppStatus>;

    fn sw_interface_set_mtu(
        &self,
        hwif_name: &str,
        mtu: u32,
        mtu_type: MtuType,
    ) -> XlateResult<VppStatus>;

    /// Writes the link state to `link_is_up` on success.
    fn interface_get_state(&self, hwif_name: &str, link_is_up: &mut bool)
        -> XlateResult<VppStatus>;

    // Addressing

    fn ip_vrf_add(&self, vrf_id: u32, vrf_name: &str, is_ipv6: bool) -> XlateResult<VppStatus>;

    fn ip_vrf_del(&self, vrf_id: u32, vrf_name: &str, is_ipv6: bool) -> XlateResult<VppStatus>;

    fn ip4_nbr_add_del(
        &self,
        hwif_name: &str,
        addr: Ipv4Addr,
        is_static: bool,
        mac: &MacAddress,
        is_add: bool,
    ) -> XlateResult<VppStatus>;

    fn ip6_nbr_add_del(
        &self,
        hwif_name: &str,
        addr: Ipv6Addr,
        is_static: bool,
        mac: &MacAddress,
        is_add: bool,
    ) -> XlateResult<VppStatus>;

    fn ip_route_add_del(&self, route: &IpRoute, is_add: bool) -> XlateResult<VppStatus>;

    fn ip_flow_hash_set(
        &self,
        vrf_id: u32,
        mask: FlowHash,
        family: AddressFamily,
    ) -> XlateResult<VppStatus>;

    // ACL

    /// Programs an ACL. On add, the issued index is written to `acl_index`;
    /// on replace, `acl_index` names the ACL to replace.
    fn acl_add_replace(
        &self,
        acl: &Acl,
        acl_index: &mut u32,
        is_replace: bool,
    ) -> XlateResult<VppStatus>;

    fn acl_del(&self, acl_index: u32) -> XlateResult<VppStatus>;

    fn acl_interface_bind(
        &self,
        hwif_name: &str,
        acl_index: u32,
        is_input: bool,
    ) -> XlateResult<VppStatus>;

    fn acl_interface_unbind(
        &self,
        hwif_name: &str,
        acl_index: u32,
        is_input: bool,
    ) -> XlateResult<VppStatus>;

    // Events

    /// Publishes every state change the engine knows about into `sink`.
    ///
    /// When this returns, all changes known to the engine at the time of the
    /// call are in `sink`.
    fn sync_for_events(&self, sink: &EventProducer<VppEvent>) -> XlateResult<VppStatus>;
}
