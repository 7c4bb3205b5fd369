//! Client and typed API behaviour against a recording dataplane.

mod common;

use common::RecordingDataplane;
use pretty_assertions::assert_eq;
use saivpp_xlate::{
    Acl, AclAction, AclDirection, AclIndex, AclRule, AddressFamily, FlowHash, IpPrefix, IpRoute,
    MacAddress, MtuType, Neighbor, NextHop, PortRange, SwIfIndex, VlanId, VppEvent, VppStatus,
    VrfId, XlateClient, XlateConfig, XlateError,
};

fn connect() -> XlateClient<RecordingDataplane> {
    XlateClient::connect(RecordingDataplane::new(), XlateConfig::default()).unwrap()
}

fn prefix(s: &str) -> IpPrefix {
    s.parse().unwrap()
}

#[test]
fn test_connect_initializes_and_refreshes() {
    let client = connect();
    assert_eq!(
        client.dataplane().ops(),
        vec!["init_vpp_client", "refresh_interfaces_list"]
    );
}

#[test]
fn test_connect_without_refresh() {
    let mut config = XlateConfig::default();
    config.connect.refresh_interfaces = false;
    let client = XlateClient::connect(RecordingDataplane::new(), config).unwrap();
    assert_eq!(client.dataplane().ops(), vec!["init_vpp_client"]);
}

#[test]
fn test_connect_surfaces_init_failure() {
    let dataplane = RecordingDataplane::new();
    dataplane.fail("init_vpp_client", -13);
    let err = XlateClient::connect(dataplane, XlateConfig::default()).unwrap_err();
    assert_eq!(err.op(), Some("init_vpp_client"));
    assert_eq!(err.status(), Some(VppStatus::from_raw(-13)));
}

#[test]
fn test_connect_rejects_invalid_config() {
    let mut config = XlateConfig::default();
    config.events.drain_batch = 1 << 20;
    let err = XlateClient::connect(RecordingDataplane::new(), config).unwrap_err();
    assert!(matches!(err, XlateError::Config { .. }));
}

#[test]
fn test_raw_status_unchanged() {
    let client = connect();
    for code in [-1, -68, 7, i32::MIN] {
        client.dataplane().fail("interface_set_state", code);
        let err = client
            .interfaces()
            .set_admin_state("Ethernet0", true)
            .unwrap_err();
        assert_eq!(err.status(), Some(VppStatus::from_raw(code)));
        assert_eq!(
            err.to_string(),
            format!("interface_set_state failed with status {}", code)
        );
    }
}

#[test]
fn test_interface_calls() {
    let client = connect();
    let interfaces = client.interfaces();

    interfaces.configure_lcp("Ethernet0", "Ethernet0-host").unwrap();
    interfaces.create_loopback("Loopback0", 0).unwrap();
    interfaces
        .create_sub_interface("Ethernet4", 100, VlanId::new(100).unwrap())
        .unwrap();
    interfaces
        .set_vrf("Ethernet4", 100, VrfId::from_raw(10), AddressFamily::Ipv6)
        .unwrap();
    interfaces.set_hw_mtu("Ethernet0", 9100).unwrap();
    interfaces.set_sw_mtu("Ethernet0", 9000, MtuType::Ip6).unwrap();
    interfaces.delete_sub_interface("Ethernet4", 100).unwrap();
    interfaces.delete_loopback("Loopback0", 0).unwrap();
    interfaces.remove_lcp("Ethernet0", "Ethernet0-host").unwrap();

    let details: Vec<String> = client
        .dataplane()
        .calls()
        .into_iter()
        .skip(2)
        .map(|c| format!("{}: {}", c.op, c.detail))
        .collect();
    assert_eq!(
        details,
        vec![
            "configure_lcp_interface: Ethernet0 Ethernet0-host add=true",
            "create_loopback_instance: Loopback0 0",
            "create_sub_interface: Ethernet4.100 vlan=100",
            "set_interface_vrf: Ethernet4.100 vrf=10 v6=true",
            "hw_interface_set_mtu: Ethernet0 9100",
            "sw_interface_set_mtu: Ethernet0 9000 type=2",
            "delete_sub_interface: Ethernet4.100",
            "delete_loopback: Loopback0 0",
            "configure_lcp_interface: Ethernet0 Ethernet0-host add=false",
        ]
    );
}

#[test]
fn test_sw_if_index_lookup() {
    let client = connect();
    client.dataplane().add_interface("Ethernet0", 3, true);

    assert_eq!(
        client.interfaces().sw_if_index("Ethernet0").unwrap(),
        SwIfIndex::from_raw(3)
    );

    let err = client.interfaces().sw_if_index("Ethernet99").unwrap_err();
    assert_eq!(err.op(), Some("get_sw_if_idx"));
    assert_eq!(err.status(), Some(VppStatus::from_raw(-1)));
}

#[test]
fn test_link_state() {
    let client = connect();
    client.dataplane().add_interface("Ethernet0", 1, true);
    client.dataplane().add_interface("Ethernet4", 2, false);

    assert!(client.interfaces().link_state("Ethernet0").unwrap());
    assert!(!client.interfaces().link_state("Ethernet4").unwrap());

    client.dataplane().fail("interface_get_state", -5);
    assert!(client.interfaces().link_state("Ethernet0").is_err());
}

#[test]
fn test_name_with_nul_never_reaches_engine() {
    let client = connect();
    let route = IpRoute::new(prefix("10.0.0.0/24"))
        .with_next_hop(NextHop::new("10.1.1.1".parse().unwrap()).via("Eth\0ernet0"));

    let err = client.routes().add_route(&route).unwrap_err();
    assert!(matches!(err, XlateError::InvalidParameter { .. }));
    assert_eq!(err.status(), None);
    assert!(!client.dataplane().ops().contains(&"ip_route_add_del"));
}

#[test]
fn test_multipath_route() {
    let client = connect();
    let route = IpRoute::new(prefix("192.168.0.0/16"))
        .in_vrf(VrfId::from_raw(7))
        .with_next_hop(NextHop::new("10.0.0.1".parse().unwrap()).via("Ethernet0"))
        .with_next_hop(NextHop::new("10.0.0.2".parse().unwrap()).via("Ethernet4"));

    client.routes().add_route(&route).unwrap();
    client.routes().del_route(&route).unwrap();

    let calls = client.dataplane().calls();
    let route_calls: Vec<&str> = calls
        .iter()
        .filter(|c| c.op == "ip_route_add_del")
        .map(|c| c.detail.as_str())
        .collect();
    assert_eq!(
        route_calls,
        vec![
            "192.168.0.0/16 vrf=7 nexthops=2 multipath=true add=true",
            "192.168.0.0/16 vrf=7 nexthops=2 multipath=true add=false",
        ]
    );
    assert_eq!(client.dataplane().routes()[0], (route, true));
}

#[test]
fn test_route_failure_not_rolled_back() {
    let client = connect();
    client.dataplane().fail("ip_route_add_del", -2);

    let route = IpRoute::new(prefix("10.0.0.0/8"))
        .with_next_hop(NextHop::new("10.0.0.1".parse().unwrap()));
    assert!(client.routes().add_route(&route).is_err());

    // One attempt, no retry and no compensating delete.
    let ops = client.dataplane().ops();
    assert_eq!(ops.iter().filter(|op| **op == "ip_route_add_del").count(), 1);
}

#[test]
fn test_interface_address_has_no_next_hops() {
    let client = connect();
    client
        .routes()
        .add_interface_address("Ethernet0", prefix("10.0.0.1/31"))
        .unwrap();
    client
        .routes()
        .del_interface_address("Ethernet0", prefix("fc00::1/126"))
        .unwrap();

    let calls = client.dataplane().calls();
    assert_eq!(
        calls[calls.len() - 2].detail,
        "Ethernet0 10.0.0.1/31 nexthops=0 add=true"
    );
    assert_eq!(
        calls[calls.len() - 1].detail,
        "Ethernet0 fc00::1/126 nexthops=0 add=false"
    );
}

#[test]
fn test_flow_hash() {
    let client = connect();
    client
        .routes()
        .set_flow_hash(
            VrfId::DEFAULT,
            AddressFamily::Ipv4,
            FlowHash::FIVE_TUPLE | FlowHash::SYMMETRIC,
        )
        .unwrap();
    assert_eq!(client.dataplane().last_call().unwrap().detail, "0 0x5f ipv4");
}

#[test]
fn test_neighbor_dispatch_by_family() {
    let client = connect();
    let mac: MacAddress = "00:11:22:33:44:55".parse().unwrap();

    let v4 = Neighbor::new("Ethernet0", "10.0.0.2".parse().unwrap(), mac);
    let v6 = Neighbor::new("Ethernet0", "fc00::2".parse().unwrap(), mac).with_static(true);

    client.neighbors().add(&v4).unwrap();
    client.neighbors().add(&v6).unwrap();
    client.neighbors().del(&v4).unwrap();

    let calls: Vec<(&'static str, String)> = client
        .dataplane()
        .calls()
        .into_iter()
        .skip(2)
        .map(|c| (c.op, c.detail))
        .collect();
    assert_eq!(
        calls,
        vec![
            (
                "ip4_nbr_add_del",
                "Ethernet0 10.0.0.2 00:11:22:33:44:55 static=false add=true".to_string()
            ),
            (
                "ip6_nbr_add_del",
                "Ethernet0 fc00::2 00:11:22:33:44:55 static=true add=true".to_string()
            ),
            (
                "ip4_nbr_add_del",
                "Ethernet0 10.0.0.2 00:11:22:33:44:55 static=false add=false".to_string()
            ),
        ]
    );
}

#[test]
fn test_vrf_tables() {
    let client = connect();
    client
        .vrfs()
        .add(VrfId::from_raw(10), "Vrf-red", AddressFamily::Ipv4)
        .unwrap();
    client
        .vrfs()
        .del(VrfId::from_raw(10), "Vrf-red", AddressFamily::Ipv6)
        .unwrap();
    assert_eq!(
        &client.dataplane().ops()[2..],
        &["ip_vrf_add", "ip_vrf_del"]
    );
    assert_eq!(
        client.dataplane().last_call().unwrap().detail,
        "10 Vrf-red v6=true"
    );
}

#[test]
fn test_acl_lifecycle() {
    let client = connect();
    let acls = client.acls();

    let acl = Acl::new("DATAACL")
        .with_rule(
            AclRule::new(AclAction::Permit, AddressFamily::Ipv4)
                .dst(prefix("10.0.0.0/24"))
                .proto(6)
                .dst_ports(PortRange::single(443)),
        )
        .with_rule(AclRule::new(AclAction::Deny, AddressFamily::Ipv4));

    let first = acls.add(&acl).unwrap();
    let second = acls.add(&Acl::new("EVERFLOW")).unwrap();
    assert_eq!(first, AclIndex::from_raw(0));
    assert_eq!(second, AclIndex::from_raw(1));

    acls.bind("Ethernet0", first, AclDirection::Ingress).unwrap();

    let updated = acl.clone().with_rule(AclRule::new(AclAction::Permit, AddressFamily::Ipv4));
    assert_eq!(acls.replace(first, &updated).unwrap(), first);

    acls.unbind("Ethernet0", first, AclDirection::Ingress).unwrap();
    acls.delete(first).unwrap();

    let details: Vec<String> = client
        .dataplane()
        .calls()
        .into_iter()
        .skip(2)
        .map(|c| format!("{}: {}", c.op, c.detail))
        .collect();
    assert_eq!(
        details,
        vec![
            "vpp_acl_add_replace: DATAACL rules=2 replace=false",
            "vpp_acl_add_replace: EVERFLOW rules=0 replace=false",
            "vpp_acl_interface_bind: Ethernet0 0 input=true",
            "vpp_acl_add_replace: DATAACL rules=3 replace=true",
            "vpp_acl_interface_unbind: Ethernet0 0 input=true",
            "vpp_acl_del: 0",
        ]
    );
}

#[test]
fn test_acl_mixed_family_rule_never_reaches_engine() {
    let client = connect();
    let acl = Acl::new("MIXED").with_rule(
        AclRule::new(AclAction::Permit, AddressFamily::Ipv4)
            .src(prefix("10.0.0.0/8"))
            .dst(prefix("2001:db8::/32")),
    );

    let err = client.acls().add(&acl).unwrap_err();
    assert!(matches!(err, XlateError::InvalidParameter { .. }));
    assert_eq!(err.status(), None);
    let err = client.acls().replace(AclIndex::from_raw(4), &acl).unwrap_err();
    assert!(matches!(err, XlateError::InvalidParameter { .. }));
    assert!(!client.dataplane().ops().contains(&"vpp_acl_add_replace"));
}

#[test]
fn test_acl_add_failure() {
    let client = connect();
    client.dataplane().fail("vpp_acl_add_replace", -9);
    let err = client.acls().add(&Acl::new("BAD")).unwrap_err();
    assert_eq!(err.status(), Some(VppStatus::from_raw(-9)));
    assert!(client.dataplane().acls().is_empty());
}

#[test]
fn test_sync_publishes_engine_events() {
    let mut client = connect();
    client.dataplane().publish(VppEvent::link_status("eth0", true));
    client.dataplane().publish(VppEvent::link_status("eth0", false));

    // Nothing is visible before the sync.
    assert!(client.dequeue_event().is_none());

    client.sync_for_events().unwrap();
    assert_eq!(client.dataplane().engine_pending(), 0);

    let first = client.dequeue_event().unwrap();
    assert_eq!(*first, VppEvent::link_status("eth0", true));
    first.free();
    let second = client.dequeue_event().unwrap();
    assert_eq!(*second, VppEvent::link_status("eth0", false));
    second.free();
    assert!(client.dequeue_event().is_none());
}

#[test]
fn test_sync_keeps_already_queued_events_first() {
    let mut client = connect();
    client
        .event_producer()
        .enqueue(VppEvent::link_status("eth9", true));
    client.dataplane().publish(VppEvent::link_status("eth1", true));
    client.sync_for_events().unwrap();

    let names: Vec<String> = std::iter::from_fn(|| client.dequeue_event())
        .map(|event| event.to_string())
        .collect();
    assert_eq!(names, vec!["link up on eth9", "link up on eth1"]);
}

#[test]
fn test_sync_failure_surfaces_status() {
    let client = connect();
    client.dataplane().fail("vpp_sync_for_events", -4);
    client.dataplane().publish(VppEvent::link_status("eth0", true));

    let err = client.sync_for_events().unwrap_err();
    assert_eq!(err.status(), Some(VppStatus::from_raw(-4)));
    assert_eq!(client.dataplane().engine_pending(), 1);
}

#[test]
fn test_drain_skips_unknown_events() {
    let mut client = connect();
    client.dataplane().publish(VppEvent::link_status("eth0", true));
    client.dataplane().publish(VppEvent::Unknown { kind: 42 });
    client.dataplane().publish(VppEvent::link_status("eth1", false));

    let mut seen = Vec::new();
    let dispatched = client
        .drain_events(|event| seen.push(event.clone()))
        .unwrap();

    assert_eq!(dispatched, 2);
    assert_eq!(
        seen,
        vec![
            VppEvent::link_status("eth0", true),
            VppEvent::link_status("eth1", false),
        ]
    );

    let stats = client.queue_stats();
    assert_eq!(stats.dequeued, 3);
    assert_eq!(stats.freed, 3);
    assert_eq!(stats.pending, 0);
}

#[test]
fn test_drain_respects_batch_limit() {
    let mut config = XlateConfig::default();
    config.events.drain_batch = 2;
    config.events.sync_before_drain = false;
    let mut client = XlateClient::connect(RecordingDataplane::new(), config).unwrap();

    let producer = client.event_producer();
    for i in 0..5 {
        producer.enqueue(VppEvent::link_status(format!("eth{}", i), true));
    }

    assert_eq!(client.drain_events(|_| {}).unwrap(), 2);
    assert_eq!(client.drain_events(|_| {}).unwrap(), 2);
    assert_eq!(client.drain_events(|_| {}).unwrap(), 1);
    assert_eq!(client.drain_events(|_| {}).unwrap(), 0);

    // No sync was requested.
    assert!(!client.dataplane().ops().contains(&"vpp_sync_for_events"));
}

#[test]
fn test_drain_unbounded() {
    let mut config = XlateConfig::default();
    config.events.drain_batch = 0;
    let mut client = XlateClient::connect(RecordingDataplane::new(), config).unwrap();
    for i in 0..3000 {
        client
            .dataplane()
            .publish(VppEvent::link_status(format!("eth{}", i), i % 2 == 0));
    }

    assert_eq!(client.drain_events(|_| {}).unwrap(), 3000);
    assert_eq!(client.queue_stats().outstanding(), 0);
}
