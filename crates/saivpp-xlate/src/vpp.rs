//! [`Dataplane`] backed by the native translation library.
//!
//! The library keeps one process-global session, so [`VppDataplane`] holds a
//! [`SessionGuard`]: a second [`VppDataplane::new`] fails with
//! [`SessionActive`](crate::XlateError::SessionActive) until the first is
//! dropped. The handle is `Send` but not `Sync`; calls from several threads
//! have to go through one owner (or a lock around it).

use crate::api::{Acl, FlowHash, IpRoute, MtuType};
use crate::dataplane::Dataplane;
use crate::error::{VppStatus, XlateResult};
use crate::event::VppEvent;
use crate::event_queue::EventProducer;
use crate::ffi::{self, c_name, AclBuf, RouteBuf};
use crate::session::SessionGuard;
use saivpp_types::{AddressFamily, MacAddress};
use std::cell::Cell;
use std::marker::PhantomData;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Handle to the linked dataplane library.
#[derive(Debug)]
pub struct VppDataplane {
    _session: SessionGuard,
    _not_sync: PhantomData<Cell<()>>,
}

impl VppDataplane {
    /// Claims the process-wide session.
    ///
    /// This does not talk to the engine yet; see
    /// [`Dataplane::init_vpp_client`].
    pub fn new() -> XlateResult<Self> {
        Ok(Self {
            _session: SessionGuard::acquire()?,
            _not_sync: PhantomData,
        })
    }
}

fn status(raw: libc::c_int) -> XlateResult<VppStatus> {
    Ok(VppStatus::from_raw(raw))
}

impl Dataplane for VppDataplane {
    fn init_vpp_client(&self) -> XlateResult<VppStatus> {
        // SAFETY: no arguments; the session guard serializes callers.
        status(unsafe { ffi::init_vpp_client() })
    }

    fn refresh_interfaces_list(&self) -> XlateResult<VppStatus> {
        // SAFETY: no arguments.
        status(unsafe { ffi::refresh_interfaces_list() })
    }

    fn configure_lcp_interface(
        &self,
        hwif_name: &str,
        hostif_name: &str,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        let hostif = c_name(hostif_name)?;
        // SAFETY: both strings outlive the call.
        status(unsafe { ffi::configure_lcp_interface(hwif.as_ptr(), hostif.as_ptr(), is_add) })
    }

    fn create_loopback_instance(&self, hwif_name: &str, instance: u32) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::create_loopback_instance(hwif.as_ptr(), instance) })
    }

    fn delete_loopback(&self, hwif_name: &str, instance: u32) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::delete_loopback(hwif.as_ptr(), instance) })
    }

    fn get_sw_if_idx(&self, ifname: &str) -> XlateResult<i32> {
        let name = c_name(ifname)?;
        // SAFETY: `name` outlives the call.
        Ok(unsafe { ffi::get_sw_if_idx(name.as_ptr()) })
    }

    fn create_sub_interface(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vlan_id: u16,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::create_sub_interface(hwif.as_ptr(), sub_id, vlan_id) })
    }

    fn delete_sub_interface(&self, hwif_name: &str, sub_id: u32) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::delete_sub_interface(hwif.as_ptr(), sub_id) })
    }

    fn set_interface_vrf(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vrf_id: u32,
        is_ipv6: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::set_interface_vrf(hwif.as_ptr(), sub_id, vrf_id, is_ipv6) })
    }

    fn interface_ip_address_add_del(
        &self,
        hwif_name: &str,
        prefix: &IpRoute,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        let mut record = RouteBuf::new(prefix)?;
        // SAFETY: `hwif` and `record` outlive the call; the engine only reads
        // the record.
        status(unsafe {
            ffi::interface_ip_address_add_del(hwif.as_ptr(), record.as_mut_ptr(), is_add)
        })
    }

    fn interface_set_state(&self, hwif_name: &str, is_up: bool) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::interface_set_state(hwif.as_ptr(), is_up) })
    }

    fn hw_interface_set_mtu(&self, hwif_name: &str, mtu: u32) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::hw_interface_set_mtu(hwif.as_ptr(), mtu) })
    }

    fn sw_interface_set_mtu(
        &self,
        hwif_name: &str,
        mtu: u32,
        mtu_type: MtuType,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::sw_interface_set_mtu(hwif.as_ptr(), mtu, mtu_type.as_raw()) })
    }

    fn interface_get_state(
        &self,
        hwif_name: &str,
        link_is_up: &mut bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call and `link_is_up` is a valid,
        // exclusive pointer for its duration.
        status(unsafe { ffi::interface_get_state(hwif.as_ptr(), link_is_up) })
    }

    fn ip_vrf_add(&self, vrf_id: u32, vrf_name: &str, is_ipv6: bool) -> XlateResult<VppStatus> {
        let name = c_name(vrf_name)?;
        // SAFETY: `name` outlives the call.
        status(unsafe { ffi::ip_vrf_add(vrf_id, name.as_ptr(), is_ipv6) })
    }

    fn ip_vrf_del(&self, vrf_id: u32, vrf_name: &str, is_ipv6: bool) -> XlateResult<VppStatus> {
        let name = c_name(vrf_name)?;
        // SAFETY: `name` outlives the call.
        status(unsafe { ffi::ip_vrf_del(vrf_id, name.as_ptr(), is_ipv6) })
    }

    fn ip4_nbr_add_del(
        &self,
        hwif_name: &str,
        addr: Ipv4Addr,
        is_static: bool,
        mac: &MacAddress,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        let mut sin = ffi::sockaddr_v4(addr);
        let mut mac = *mac.as_bytes();
        // SAFETY: all pointers refer to locals that outlive the call.
        status(unsafe {
            ffi::ip4_nbr_add_del(hwif.as_ptr(), &mut sin, is_static, mac.as_mut_ptr(), is_add)
        })
    }

    fn ip6_nbr_add_del(
        &self,
        hwif_name: &str,
        addr: Ipv6Addr,
        is_static: bool,
        mac: &MacAddress,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        let mut sin6 = ffi::sockaddr_v6(addr);
        let mut mac = *mac.as_bytes();
        // SAFETY: all pointers refer to locals that outlive the call.
        status(unsafe {
            ffi::ip6_nbr_add_del(hwif.as_ptr(), &mut sin6, is_static, mac.as_mut_ptr(), is_add)
        })
    }

    fn ip_route_add_del(&self, route: &IpRoute, is_add: bool) -> XlateResult<VppStatus> {
        let mut record = RouteBuf::new(route)?;
        // SAFETY: `record` and the names it points to outlive the call.
        status(unsafe { ffi::ip_route_add_del(record.as_mut_ptr(), is_add) })
    }

    fn ip_flow_hash_set(
        &self,
        vrf_id: u32,
        mask: FlowHash,
        family: AddressFamily,
    ) -> XlateResult<VppStatus> {
        // SAFETY: scalar arguments only.
        status(unsafe { ffi::vpp_ip_flow_hash_set(vrf_id, mask.bits(), ffi::af_of(family)) })
    }

    fn acl_add_replace(
        &self,
        acl: &Acl,
        acl_index: &mut u32,
        is_replace: bool,
    ) -> XlateResult<VppStatus> {
        let mut record = AclBuf::new(acl)?;
        // SAFETY: `record` and `acl_index` are valid for the call.
        status(unsafe { ffi::vpp_acl_add_replace(record.as_mut_ptr(), acl_index, is_replace) })
    }

    fn acl_del(&self, acl_index: u32) -> XlateResult<VppStatus> {
        // SAFETY: scalar argument only.
        status(unsafe { ffi::vpp_acl_del(acl_index) })
    }

    fn acl_interface_bind(
        &self,
        hwif_name: &str,
        acl_index: u32,
        is_input: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::vpp_acl_interface_bind(hwif.as_ptr(), acl_index, is_input) })
    }

    fn acl_interface_unbind(
        &self,
        hwif_name: &str,
        acl_index: u32,
        is_input: bool,
    ) -> XlateResult<VppStatus> {
        let hwif = c_name(hwif_name)?;
        // SAFETY: `hwif` outlives the call.
        status(unsafe { ffi::vpp_acl_interface_unbind(hwif.as_ptr(), acl_index, is_input) })
    }

    fn sync_for_events(&self, sink: &EventProducer<VppEvent>) -> XlateResult<VppStatus> {
        // SAFETY: no arguments.
        let rc = VppStatus::from_raw(unsafe { ffi::vpp_sync_for_events() });
        if rc.is_error() {
            return Ok(rc);
        }

        // SAFETY: vpp_ev_dequeue hands out owned nodes or null, and each
        // node goes back through vpp_ev_free exactly once.
        let moved = unsafe {
            ffi::drain_engine(
                || ffi::vpp_ev_dequeue(),
                |node| ffi::vpp_ev_free(node),
                sink,
            )
        };
        debug!("Collected {} event(s) from the engine", moved);

        Ok(rc)
    }
}
