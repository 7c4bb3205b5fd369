//! Recording dataplane for integration tests.
//!
//! Records every call, answers with scripted statuses and keeps a list of
//! "engine-pending" events that `sync_for_events` publishes. Route and ACL
//! records are marshalled through the same ABI builders as the linked
//! backend, so marshalling errors surface here too.

#![allow(dead_code)]

use parking_lot::Mutex;
use saivpp_xlate::ffi::{AclBuf, RouteBuf};
use saivpp_xlate::{
    Acl, AddressFamily, Dataplane, EventProducer, FlowHash, IpRoute, MacAddress, MtuType, VppEvent,
    VppStatus, XlateResult,
};
use std::collections::{HashMap, VecDeque};
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub detail: String,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    failures: HashMap<&'static str, i32>,
    sw_if_index: HashMap<String, i32>,
    link_up: HashMap<String, bool>,
    next_acl_index: u32,
    routes: Vec<(IpRoute, bool)>,
    acls: Vec<(Acl, u32, bool)>,
    engine_events: VecDeque<VppEvent>,
}

#[derive(Debug, Default)]
pub struct RecordingDataplane {
    state: Mutex<State>,
}

impl RecordingDataplane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call of `op` return `status`.
    pub fn fail(&self, op: &'static str, status: i32) {
        self.state.lock().failures.insert(op, status);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    pub fn add_interface(&self, name: &str, sw_if_index: i32, link_up: bool) {
        let mut state = self.state.lock();
        state.sw_if_index.insert(name.to_string(), sw_if_index);
        state.link_up.insert(name.to_string(), link_up);
    }

    /// Queues an event on the engine side; it reaches the client's queue on
    /// the next sync.
    pub fn publish(&self, event: VppEvent) {
        self.state.lock().engine_events.push_back(event);
    }

    pub fn engine_pending(&self) -> usize {
        self.state.lock().engine_events.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.state.lock().calls.iter().map(|c| c.op).collect()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.state.lock().calls.last().cloned()
    }

    pub fn routes(&self) -> Vec<(IpRoute, bool)> {
        self.state.lock().routes.clone()
    }

    pub fn acls(&self) -> Vec<(Acl, u32, bool)> {
        self.state.lock().acls.clone()
    }

    fn record(&self, op: &'static str, detail: String) -> VppStatus {
        let mut state = self.state.lock();
        state.calls.push(Call { op, detail });
        VppStatus::from_raw(state.failures.get(op).copied().unwrap_or(0))
    }
}

impl Dataplane for RecordingDataplane {
    fn init_vpp_client(&self) -> XlateResult<VppStatus> {
        Ok(self.record("init_vpp_client", String::new()))
    }

    fn refresh_interfaces_list(&self) -> XlateResult<VppStatus> {
        Ok(self.record("refresh_interfaces_list", String::new()))
    }

    fn configure_lcp_interface(
        &self,
        hwif_name: &str,
        hostif_name: &str,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "configure_lcp_interface",
            format!("{} {} add={}", hwif_name, hostif_name, is_add),
        ))
    }

    fn create_loopback_instance(&self, hwif_name: &str, instance: u32) -> XlateResult<VppStatus> {
        Ok(self.record(
            "create_loopback_instance",
            format!("{} {}", hwif_name, instance),
        ))
    }

    fn delete_loopback(&self, hwif_name: &str, instance: u32) -> XlateResult<VppStatus> {
        Ok(self.record("delete_loopback", format!("{} {}", hwif_name, instance)))
    }

    fn get_sw_if_idx(&self, ifname: &str) -> XlateResult<i32> {
        let status = self.record("get_sw_if_idx", ifname.to_string());
        if status.is_error() {
            return Ok(status.as_raw());
        }
        Ok(self
            .state
            .lock()
            .sw_if_index
            .get(ifname)
            .copied()
            .unwrap_or(-1))
    }

    fn create_sub_interface(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vlan_id: u16,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "create_sub_interface",
            format!("{}.{} vlan={}", hwif_name, sub_id, vlan_id),
        ))
    }

    fn delete_sub_interface(&self, hwif_name: &str, sub_id: u32) -> XlateResult<VppStatus> {
        Ok(self.record("delete_sub_interface", format!("{}.{}", hwif_name, sub_id)))
    }

    fn set_interface_vrf(
        &self,
        hwif_name: &str,
        sub_id: u32,
        vrf_id: u32,
        is_ipv6: bool,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "set_interface_vrf",
            format!("{}.{} vrf={} v6={}", hwif_name, sub_id, vrf_id, is_ipv6),
        ))
    }

    fn interface_ip_address_add_del(
        &self,
        hwif_name: &str,
        prefix: &IpRoute,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        let record = RouteBuf::new(prefix)?;
        Ok(self.record(
            "interface_ip_address_add_del",
            format!(
                "{} {} nexthops={} add={}",
                hwif_name,
                prefix.prefix,
                record.header().nexthop_cnt,
                is_add
            ),
        ))
    }

    fn interface_set_state(&self, hwif_name: &str, is_up: bool) -> XlateResult<VppStatus> {
        Ok(self.record("interface_set_state", format!("{} up={}", hwif_name, is_up)))
    }

    fn hw_interface_set_mtu(&self, hwif_name: &str, mtu: u32) -> XlateResult<VppStatus> {
        Ok(self.record("hw_interface_set_mtu", format!("{} {}", hwif_name, mtu)))
    }

    fn sw_interface_set_mtu(
        &self,
        hwif_name: &str,
        mtu: u32,
        mtu_type: MtuType,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "sw_interface_set_mtu",
            format!("{} {} type={}", hwif_name, mtu, mtu_type.as_raw()),
        ))
    }

    fn interface_get_state(
        &self,
        hwif_name: &str,
        link_is_up: &mut bool,
    ) -> XlateResult<VppStatus> {
        let status = self.record("interface_get_state", hwif_name.to_string());
        if status.is_success() {
            *link_is_up = self
                .state
                .lock()
                .link_up
                .get(hwif_name)
                .copied()
                .unwrap_or(false);
        }
        Ok(status)
    }

    fn ip_vrf_add(&self, vrf_id: u32, vrf_name: &str, is_ipv6: bool) -> XlateResult<VppStatus> {
        Ok(self.record(
            "ip_vrf_add",
            format!("{} {} v6={}", vrf_id, vrf_name, is_ipv6),
        ))
    }

    fn ip_vrf_del(&self, vrf_id: u32, vrf_name: &str, is_ipv6: bool) -> XlateResult<VppStatus> {
        Ok(self.record(
            "ip_vrf_del",
            format!("{} {} v6={}", vrf_id, vrf_name, is_ipv6),
        ))
    }

    fn ip4_nbr_add_del(
        &self,
        hwif_name: &str,
        addr: Ipv4Addr,
        is_static: bool,
        mac: &MacAddress,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "ip4_nbr_add_del",
            format!(
                "{} {} {} static={} add={}",
                hwif_name, addr, mac, is_static, is_add
            ),
        ))
    }

    fn ip6_nbr_add_del(
        &self,
        hwif_name: &str,
        addr: Ipv6Addr,
        is_static: bool,
        mac: &MacAddress,
        is_add: bool,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "ip6_nbr_add_del",
            format!(
                "{} {} {} static={} add={}",
                hwif_name, addr, mac, is_static, is_add
            ),
        ))
    }

    fn ip_route_add_del(&self, route: &IpRoute, is_add: bool) -> XlateResult<VppStatus> {
        let record = RouteBuf::new(route)?;
        let status = self.record(
            "ip_route_add_del",
            format!(
                "{} vrf={} nexthops={} multipath={} add={}",
                route.prefix,
                record.header().vrf_id,
                record.header().nexthop_cnt,
                record.header().is_multipath,
                is_add
            ),
        );
        self.state.lock().routes.push((route.clone(), is_add));
        Ok(status)
    }

    fn ip_flow_hash_set(
        &self,
        vrf_id: u32,
        mask: FlowHash,
        family: AddressFamily,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "vpp_ip_flow_hash_set",
            format!("{} {:#x} {}", vrf_id, mask.bits(), family),
        ))
    }

    fn acl_add_replace(
        &self,
        acl: &Acl,
        acl_index: &mut u32,
        is_replace: bool,
    ) -> XlateResult<VppStatus> {
        let record = AclBuf::new(acl)?;
        let status = self.record(
            "vpp_acl_add_replace",
            format!(
                "{} rules={} replace={}",
                acl.name,
                record.header().count,
                is_replace
            ),
        );
        if status.is_error() {
            return Ok(status);
        }

        let mut state = self.state.lock();
        if !is_replace {
            *acl_index = state.next_acl_index;
            state.next_acl_index += 1;
        }
        state.acls.push((acl.clone(), *acl_index, is_replace));
        Ok(status)
    }

    fn acl_del(&self, acl_index: u32) -> XlateResult<VppStatus> {
        Ok(self.record("vpp_acl_del", acl_index.to_string()))
    }

    fn acl_interface_bind(
        &self,
        hwif_name: &str,
        acl_index: u32,
        is_input: bool,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "vpp_acl_interface_bind",
            format!("{} {} input={}", hwif_name, acl_index, is_input),
        ))
    }

    fn acl_interface_unbind(
        &self,
        hwif_name: &str,
        acl_index: u32,
        is_input: bool,
    ) -> XlateResult<VppStatus> {
        Ok(self.record(
            "vpp_acl_interface_unbind",
            format!("{} {} input={}", hwif_name, acl_index, is_input),
        ))
    }

    fn sync_for_events(&self, sink: &EventProducer<VppEvent>) -> XlateResult<VppStatus> {
        let status = self.record("vpp_sync_for_events", String::new());
        if status.is_error() {
            return Ok(status);
        }
        let mut state = self.state.lock();
        while let Some(event) = state.engine_events.pop_front() {
            sink.enqueue(event);
        }
        Ok(status)
    }
}
