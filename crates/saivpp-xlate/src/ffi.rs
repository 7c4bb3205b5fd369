//! C ABI of the native translation library.
//!
//! The `#[repr(C)]` types mirror the engine's transfer records field for
//! field. Route and ACL records end in a zero-length array sized by an
//! explicit count field; [`RouteBuf`] and [`AclBuf`] build them in one
//! contiguous allocation together with the C strings their pointers refer
//! to, and keep everything alive for the duration of a call.
//!
//! The `extern "C"` declarations are only compiled with the `vpp-link`
//! feature; the layouts and builders are always available.

#![allow(non_camel_case_types)]

use crate::api::{Acl, AclRule, IpRoute, NextHop};
use crate::error::{XlateError, XlateResult};
use crate::event::{InterfaceStatus, VppEvent, HWIF_NAME_LEN};
use crate::event_queue::EventProducer;
use libc::{c_char, c_int, c_uint, sa_family_t, sockaddr_in, sockaddr_in6, AF_INET, AF_INET6};
use std::alloc::{self, Layout};
use std::ffi::{CStr, CString};
use std::mem::{self, offset_of};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ptr::{self, NonNull};
use std::slice;
use tracing::trace;

pub type vpp_nexthop_type_e = c_uint;
pub const VPP_NEXTHOP_NORMAL: vpp_nexthop_type_e = 1;
pub const VPP_NEXTHOP_LOCAL: vpp_nexthop_type_e = 2;

pub type vpp_acl_action_e = c_uint;
pub const VPP_ACL_ACTION_API_DENY: vpp_acl_action_e = 0;
pub const VPP_ACL_ACTION_API_PERMIT: vpp_acl_action_e = 1;
pub const VPP_ACL_ACTION_API_PERMIT_STFULL: vpp_acl_action_e = 2;

pub type vpp_event_type_e = c_uint;
pub const VPP_INTF_LINK_STATUS: vpp_event_type_e = 1;

#[repr(C)]
#[derive(Clone, Copy)]
pub union vpp_ip_addr_u {
    pub ip4: sockaddr_in,
    pub ip6: sockaddr_in6,
}

/// Address tagged with its socket family.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct vpp_ip_addr_t {
    pub sa_family: c_int,
    pub addr: vpp_ip_addr_u,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct vpp_ip_nexthop_t {
    pub addr: vpp_ip_addr_t,
    pub hwif_name: *const c_char,
    pub weight: u8,
    pub preference: u8,
    pub type_: vpp_nexthop_type_e,
    pub flags: u32,
}

#[repr(C)]
pub struct vpp_ip_route_t {
    pub prefix_addr: vpp_ip_addr_t,
    pub prefix_len: c_uint,
    pub vrf_id: u32,
    pub is_multipath: bool,
    pub nexthop_cnt: c_uint,
    pub nexthop: [vpp_ip_nexthop_t; 0],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct vpp_acl_rule_t {
    pub action: vpp_acl_action_e,
    pub src_prefix: vpp_ip_addr_t,
    pub src_prefix_mask: vpp_ip_addr_t,
    pub dst_prefix: vpp_ip_addr_t,
    pub dst_prefix_mask: vpp_ip_addr_t,
    pub proto: c_int,
    pub srcport_or_icmptype_first: u16,
    pub srcport_or_icmptype_last: u16,
    pub dstport_or_icmpcode_first: u16,
    pub dstport_or_icmpcode_last: u16,
    pub tcp_flags_mask: u8,
    pub tcp_flags_value: u8,
}

#[repr(C)]
pub struct vpp_acl_t {
    pub acl_name: *mut c_char,
    pub count: u32,
    pub rules: [vpp_acl_rule_t; 0],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct vpp_intf_status_t {
    pub hwif_name: [c_char; HWIF_NAME_LEN],
    pub link_up: bool,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union vpp_event_data_t {
    pub intf_status: vpp_intf_status_t,
}

/// Engine-side event node. `next` belongs to the engine's queue.
#[repr(C)]
pub struct vpp_event_info_t {
    pub next: *mut vpp_event_info_t,
    pub type_: vpp_event_type_e,
    pub data: vpp_event_data_t,
}

pub type vpp_event_free_fn = Option<unsafe extern "C" fn(*mut vpp_event_info_t)>;

/// Engine-side queue head. Only the engine touches this.
#[repr(C)]
pub struct vpp_event_queue_t {
    pub head: *mut vpp_event_info_t,
    pub tail: *mut *mut vpp_event_info_t,
    pub free: vpp_event_free_fn,
}

#[cfg(feature = "vpp-link")]
extern "C" {
    pub fn vpp_ev_dequeue() -> *mut vpp_event_info_t;
    pub fn vpp_ev_free(evp: *mut vpp_event_info_t);

    pub fn init_vpp_client() -> c_int;
    pub fn refresh_interfaces_list() -> c_int;
    pub fn configure_lcp_interface(
        hwif_name: *const c_char,
        hostif_name: *const c_char,
        is_add: bool,
    ) -> c_int;
    pub fn create_loopback_instance(hwif_name: *const c_char, instance: u32) -> c_int;
    pub fn delete_loopback(hwif_name: *const c_char, instance: u32) -> c_int;
    pub fn get_sw_if_idx(ifname: *const c_char) -> c_int;
    pub fn create_sub_interface(hwif_name: *const c_char, sub_id: u32, vlan_id: u16) -> c_int;
    pub fn delete_sub_interface(hwif_name: *const c_char, sub_id: u32) -> c_int;
    pub fn set_interface_vrf(
        hwif_name: *const c_char,
        sub_id: u32,
        vrf_id: u32,
        is_ipv6: bool,
    ) -> c_int;
    pub fn interface_ip_address_add_del(
        hw_ifname: *const c_char,
        prefix: *mut vpp_ip_route_t,
        is_add: bool,
    ) -> c_int;
    pub fn interface_set_state(hwif_name: *const c_char, is_up: bool) -> c_int;
    pub fn hw_interface_set_mtu(hwif_name: *const c_char, mtu: u32) -> c_int;
    pub fn sw_interface_set_mtu(hwif_name: *const c_char, mtu: u32, type_: c_int) -> c_int;

    pub fn ip_vrf_add(vrf_id: u32, vrf_name: *const c_char, is_ipv6: bool) -> c_int;
    pub fn ip_vrf_del(vrf_id: u32, vrf_name: *const c_char, is_ipv6: bool) -> c_int;

    pub fn ip4_nbr_add_del(
        hwif_name: *const c_char,
        addr: *mut sockaddr_in,
        is_static: bool,
        mac: *mut u8,
        is_add: bool,
    ) -> c_int;
    pub fn ip6_nbr_add_del(
        hwif_name: *const c_char,
        addr: *mut sockaddr_in6,
        is_static: bool,
        mac: *mut u8,
        is_add: bool,
    ) -> c_int;
    pub fn ip_route_add_del(prefix: *mut vpp_ip_route_t, is_add: bool) -> c_int;
    pub fn vpp_ip_flow_hash_set(vrf_id: u32, mask: u32, addr_family: c_int) -> c_int;

    pub fn vpp_acl_add_replace(
        in_acl: *mut vpp_acl_t,
        acl_index: *mut u32,
        is_replace: bool,
    ) -> c_int;
    pub fn vpp_acl_del(acl_index: u32) -> c_int;
    pub fn vpp_acl_interface_bind(hwif_name: *const c_char, acl_index: u32, is_input: bool)
        -> c_int;
    pub fn vpp_acl_interface_unbind(
        hwif_name: *const c_char,
        acl_index: u32,
        is_input: bool,
    ) -> c_int;
    pub fn interface_get_state(hwif_name: *const c_char, link_is_up: *mut bool) -> c_int;
    pub fn vpp_sync_for_events() -> c_int;
}

// =============================================================================
// Addresses
// =============================================================================

pub fn sockaddr_v4(addr: Ipv4Addr) -> sockaddr_in {
    // SAFETY: sockaddr_in is plain old data; all-zero is a valid value.
    let mut sin: sockaddr_in = unsafe { mem::zeroed() };
    sin.sin_family = AF_INET as sa_family_t;
    sin.sin_addr.s_addr = u32::from_ne_bytes(addr.octets());
    sin
}

pub fn sockaddr_v6(addr: Ipv6Addr) -> sockaddr_in6 {
    // SAFETY: sockaddr_in6 is plain old data; all-zero is a valid value.
    let mut sin6: sockaddr_in6 = unsafe { mem::zeroed() };
    sin6.sin6_family = AF_INET6 as sa_family_t;
    sin6.sin6_addr.s6_addr = addr.octets();
    sin6
}

/// Socket family constant for an address family.
pub fn af_of(family: saivpp_types::AddressFamily) -> c_int {
    if family.is_ipv6() {
        AF_INET6
    } else {
        AF_INET
    }
}

impl From<IpAddr> for vpp_ip_addr_t {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => vpp_ip_addr_t {
                sa_family: AF_INET,
                addr: vpp_ip_addr_u {
                    ip6: v4_in_v6_slot(sockaddr_v4(v4)),
                },
            },
            IpAddr::V6(v6) => vpp_ip_addr_t {
                sa_family: AF_INET6,
                addr: vpp_ip_addr_u {
                    ip6: sockaddr_v6(v6),
                },
            },
        }
    }
}

/// Zero-extends a `sockaddr_in` to the size of the union so no byte of the
/// record is left uninitialised.
fn v4_in_v6_slot(sin: sockaddr_in) -> sockaddr_in6 {
    let mut slot = vpp_ip_addr_u {
        // SAFETY: sockaddr_in6 is plain old data; all-zero is a valid value.
        ip6: unsafe { mem::zeroed() },
    };
    slot.ip4 = sin;
    // SAFETY: every byte of the union was initialised by the zeroed ip6 member.
    unsafe { slot.ip6 }
}

impl vpp_ip_addr_t {
    /// Decodes the address selected by `sa_family`.
    pub fn to_ip(&self) -> Option<IpAddr> {
        match self.sa_family {
            AF_INET => {
                // SAFETY: sa_family says the ip4 member is active.
                let sin = unsafe { self.addr.ip4 };
                Some(IpAddr::V4(Ipv4Addr::from(sin.sin_addr.s_addr.to_ne_bytes())))
            }
            AF_INET6 => {
                // SAFETY: sa_family says the ip6 member is active.
                let sin6 = unsafe { self.addr.ip6 };
                Some(IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)))
            }
            _ => None,
        }
    }
}

/// Converts a name to a C string.
pub fn c_name(name: &str) -> XlateResult<CString> {
    CString::new(name)
        .map_err(|_| XlateError::invalid_parameter(format!("{:?} contains an interior NUL", name)))
}

// =============================================================================
// Count-prefixed records
// =============================================================================

/// A header followed by a trailing entry array, in one allocation.
struct FlexAlloc {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl FlexAlloc {
    /// Writes `header` at the start and `entries` at byte `offset`.
    ///
    /// `offset` must be the offset of the header's trailing array field.
    fn new<H, E: Copy>(header: H, offset: usize, entries: &[E]) -> XlateResult<Self> {
        let size = mem::size_of::<E>()
            .checked_mul(entries.len())
            .and_then(|bytes| bytes.checked_add(offset))
            .ok_or_else(|| XlateError::invalid_parameter("record too large"))?
            .max(mem::size_of::<H>());
        let layout = Layout::from_size_align(size, mem::align_of::<H>())
            .map_err(|e| XlateError::invalid_parameter(e.to_string()))?;

        // SAFETY: the layout is non-zero sized (size >= size_of::<H>() > 0).
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout)
        };

        // SAFETY: the allocation is aligned for H and large enough for the
        // header plus `entries.len()` entries starting at `offset`, which is
        // aligned for E because it is the offset of a `[E; 0]` field of H.
        unsafe {
            ptr::write(ptr.as_ptr().cast::<H>(), header);
            let dst = ptr.as_ptr().add(offset).cast::<E>();
            ptr::copy_nonoverlapping(entries.as_ptr(), dst, entries.len());
        }

        Ok(Self { ptr, layout })
    }
}

impl Drop for FlexAlloc {
    fn drop(&mut self) {
        // SAFETY: allocated in `new` with this layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

fn count_field(len: usize, what: &str) -> XlateResult<u32> {
    u32::try_from(len)
        .map_err(|_| XlateError::invalid_parameter(format!("too many {}: {}", what, len)))
}

/// `vpp_ip_route_t` with its next-hop array and interface names.
pub struct RouteBuf {
    alloc: FlexAlloc,
    _names: Vec<CString>,
}

impl RouteBuf {
    pub fn new(route: &IpRoute) -> XlateResult<Self> {
        let mut names = Vec::new();
        let mut hops = Vec::with_capacity(route.next_hops.len());
        for next_hop in &route.next_hops {
            let hwif_name = match &next_hop.hwif_name {
                Some(name) => {
                    let name = c_name(name)?;
                    let p = name.as_ptr();
                    names.push(name);
                    p
                }
                None => ptr::null(),
            };
            hops.push(raw_next_hop(next_hop, hwif_name));
        }

        let header = vpp_ip_route_t {
            prefix_addr: route.prefix.address().into(),
            prefix_len: c_uint::from(route.prefix.prefix_len()),
            vrf_id: route.vrf_id.as_raw(),
            is_multipath: route.is_multipath(),
            nexthop_cnt: count_field(hops.len(), "next-hops")?,
            nexthop: [],
        };
        let alloc = FlexAlloc::new(header, offset_of!(vpp_ip_route_t, nexthop), &hops)?;

        Ok(Self {
            alloc,
            _names: names,
        })
    }

    pub fn header(&self) -> &vpp_ip_route_t {
        // SAFETY: the allocation starts with an initialised header.
        unsafe { &*self.alloc.ptr.as_ptr().cast::<vpp_ip_route_t>() }
    }

    pub fn next_hops(&self) -> &[vpp_ip_nexthop_t] {
        let header = self.header();
        // SAFETY: `nexthop_cnt` entries were written at the trailing array.
        unsafe {
            slice::from_raw_parts(
                ptr::addr_of!(header.nexthop).cast::<vpp_ip_nexthop_t>(),
                header.nexthop_cnt as usize,
            )
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut vpp_ip_route_t {
        self.alloc.ptr.as_ptr().cast()
    }
}

fn raw_next_hop(next_hop: &NextHop, hwif_name: *const c_char) -> vpp_ip_nexthop_t {
    vpp_ip_nexthop_t {
        addr: next_hop.addr.into(),
        hwif_name,
        weight: next_hop.weight,
        preference: next_hop.preference,
        type_: next_hop.kind.as_raw(),
        flags: next_hop.flags,
    }
}

/// `vpp_acl_t` with its rule array and name.
pub struct AclBuf {
    alloc: FlexAlloc,
    _name: CString,
}

impl AclBuf {
    pub fn new(acl: &Acl) -> XlateResult<Self> {
        let name = c_name(&acl.name)?;
        acl.check_families()?;
        let rules: Vec<vpp_acl_rule_t> = acl.rules.iter().map(raw_rule).collect();

        let header = vpp_acl_t {
            acl_name: name.as_ptr().cast_mut(),
            count: count_field(rules.len(), "ACL rules")?,
            rules: [],
        };
        let alloc = FlexAlloc::new(header, offset_of!(vpp_acl_t, rules), &rules)?;

        Ok(Self { alloc, _name: name })
    }

    pub fn header(&self) -> &vpp_acl_t {
        // SAFETY: the allocation starts with an initialised header.
        unsafe { &*self.alloc.ptr.as_ptr().cast::<vpp_acl_t>() }
    }

    pub fn rules(&self) -> &[vpp_acl_rule_t] {
        let header = self.header();
        // SAFETY: `count` rules were written at the trailing array.
        unsafe {
            slice::from_raw_parts(
                ptr::addr_of!(header.rules).cast::<vpp_acl_rule_t>(),
                header.count as usize,
            )
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut vpp_acl_t {
        self.alloc.ptr.as_ptr().cast()
    }
}

fn raw_rule(rule: &AclRule) -> vpp_acl_rule_t {
    vpp_acl_rule_t {
        action: rule.action.as_raw(),
        src_prefix: rule.src.addr.into(),
        src_prefix_mask: rule.src.mask.into(),
        dst_prefix: rule.dst.addr.into(),
        dst_prefix_mask: rule.dst.mask.into(),
        proto: c_int::from(rule.proto),
        srcport_or_icmptype_first: rule.src_ports.first,
        srcport_or_icmptype_last: rule.src_ports.last,
        dstport_or_icmpcode_first: rule.dst_ports.first,
        dstport_or_icmpcode_last: rule.dst_ports.last,
        tcp_flags_mask: rule.tcp_flags_mask,
        tcp_flags_value: rule.tcp_flags_value,
    }
}

// =============================================================================
// Events
// =============================================================================

impl vpp_event_info_t {
    /// Builds an unlinked link status node. The name is truncated to fit the
    /// 64-byte field with its terminating NUL.
    pub fn link_status(hwif_name: &str, link_up: bool) -> Self {
        let mut status = vpp_intf_status_t {
            hwif_name: [0; HWIF_NAME_LEN],
            link_up,
        };
        for (dst, src) in status
            .hwif_name
            .iter_mut()
            .zip(hwif_name.bytes().take(HWIF_NAME_LEN - 1))
        {
            *dst = c_char::from_ne_bytes([src]);
        }

        Self {
            next: ptr::null_mut(),
            type_: VPP_INTF_LINK_STATUS,
            data: vpp_event_data_t {
                intf_status: status,
            },
        }
    }

    /// Decodes the payload selected by `type_`. `next` is not read.
    pub fn to_event(&self) -> VppEvent {
        match self.type_ {
            VPP_INTF_LINK_STATUS => {
                // SAFETY: the type tag says intf_status is the active member.
                let status = unsafe { self.data.intf_status };
                VppEvent::LinkStatus(InterfaceStatus {
                    hwif_name: name_from_field(&status.hwif_name),
                    link_up: status.link_up,
                })
            }
            kind => VppEvent::Unknown { kind },
        }
    }
}

/// Reads a NUL-terminated name out of a fixed-size field, never past its end.
fn name_from_field(field: &[c_char; HWIF_NAME_LEN]) -> String {
    // SAFETY: c_char and u8 have the same size and alignment.
    let bytes = unsafe { slice::from_raw_parts(field.as_ptr().cast::<u8>(), field.len()) };
    match CStr::from_bytes_until_nul(bytes) {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Moves every node the engine has queued into `sink`, oldest first.
///
/// Each node is decoded, then handed to `free` exactly once. Nodes of an
/// unknown kind are forwarded as [`VppEvent::Unknown`]. Returns the number
/// of nodes moved.
///
/// # Safety
///
/// `dequeue` must return either null or a pointer to a valid node that
/// nobody else owns, and must keep returning null once the queue is empty.
/// `free` must accept every node returned by `dequeue`.
pub unsafe fn drain_engine<D, F>(
    mut dequeue: D,
    mut free: F,
    sink: &EventProducer<VppEvent>,
) -> usize
where
    D: FnMut() -> *mut vpp_event_info_t,
    F: FnMut(*mut vpp_event_info_t),
{
    let mut moved = 0;
    loop {
        let node = dequeue();
        if node.is_null() {
            break;
        }
        // SAFETY: non-null nodes from `dequeue` are valid until freed.
        let event = unsafe { (*node).to_event() };
        free(node);
        trace!("Engine event: {}", event);
        sink.enqueue(event);
        moved += 1;
    }
    moved
}
