// duskmesh: disaster-aware SDN route planner for best-effort backup flows
// Copyright (C) 2026 duskmesh contributors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! End-to-end scenarios against the public API: a controller wired up with
//! an in-memory fake transport, driven through switch registration, link
//! setup, host-pair registration, and update ticks.

use pretty_assertions::assert_eq;

use duskmesh::flow::{FlowAction, FlowEntry, SwitchTransport, TransportError, HOST_EDGE_PRIORITY, INITIAL_ROUTE_PRIORITY, TABLE_MISS_PRIORITY};
use duskmesh::routing::RoutingStrategy;
use duskmesh::topology::{HostClient, HostServer, SwitchName};
use duskmesh::Controller;

#[derive(Default)]
struct RecordingSwitches {
    installed: Vec<(SwitchName, FlowEntry)>,
    packet_outs: Vec<SwitchName>,
}

impl SwitchTransport for RecordingSwitches {
    fn install_flow(&mut self, switch: &SwitchName, entry: FlowEntry, _buffer_id: Option<u32>) -> Result<(), TransportError> {
        self.installed.push((switch.clone(), entry));
        Ok(())
    }

    fn packet_out(&mut self, switch: &SwitchName, _in_port: u32, _actions: Vec<FlowAction>, _data: Vec<u8>) -> Result<(), TransportError> {
        self.packet_outs.push(switch.clone());
        Ok(())
    }
}

fn diamond_controller(strategy: RoutingStrategy) -> (Controller, RecordingSwitches) {
    let mut controller = Controller::new(strategy, 30).unwrap();
    let mut transport = RecordingSwitches::default();
    for s in ["s1", "s2", "s3", "s4"] {
        controller.on_switch_features(&mut transport, s);
    }
    controller.add_link("s1", 1, "s2", 1, 100.0).unwrap();
    controller.add_link("s1", 2, "s3", 1, 1.0).unwrap();
    controller.add_link("s2", 2, "s4", 1, 10.0).unwrap();
    controller.add_link("s3", 2, "s4", 2, 100.0).unwrap();
    (controller, transport)
}

#[test]
fn switch_registration_installs_one_table_miss_each() {
    let (controller, transport) = diamond_controller(RoutingStrategy::Dijkstra);
    assert_eq!(controller.topology().switches().len(), 4);
    assert_eq!(transport.installed.len(), 4);
    assert!(transport.installed.iter().all(|(_, e)| e.priority == TABLE_MISS_PRIORITY));
}

#[test]
fn host_pair_registration_installs_host_edge_entries_before_any_tick() {
    let (mut controller, mut transport) = diamond_controller(RoutingStrategy::DisasterAware);
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h1c", "s4", 1000, 20.0),
            "10.0.0.1".parse().unwrap(),
            9,
            HostServer::new("h1s", "s1"),
            "10.0.0.2".parse().unwrap(),
            9,
        )
        .unwrap();

    let host_edge_entries: Vec<_> = transport.installed.iter().filter(|(_, e)| e.priority == HOST_EDGE_PRIORITY).collect();
    // 2 matches (ipv4, arp) x 2 hosts
    assert_eq!(host_edge_entries.len(), 4);
}

#[test]
fn disaster_aware_plan_prioritizes_more_urgent_pair_and_installs_symmetric_routes() {
    let (mut controller, mut transport) = diamond_controller(RoutingStrategy::DisasterAware);
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h1c", "s4", 1000, 20.0),
            "10.0.0.1".parse().unwrap(),
            9,
            HostServer::new("h1s", "s1"),
            "10.0.0.2".parse().unwrap(),
            9,
        )
        .unwrap();
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h2c", "s2", 500, 20.0),
            "10.0.1.1".parse().unwrap(),
            10,
            HostServer::new("h2s", "s3"),
            "10.0.1.2".parse().unwrap(),
            10,
        )
        .unwrap();

    controller.start_update_path(&mut transport);
    assert!(controller.is_updating());
    assert_eq!(controller.update_count(), 1);

    let route_entries: Vec<_> = transport.installed.iter().filter(|(_, e)| e.priority == INITIAL_ROUTE_PRIORITY).collect();
    assert!(!route_entries.is_empty());
}

#[test]
fn dijkstra_strategy_ignores_fail_times_and_keeps_updating() {
    let (mut controller, mut transport) = diamond_controller(RoutingStrategy::Dijkstra);
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h1c", "s4", 1, 20.0),
            "10.0.0.1".parse().unwrap(),
            9,
            HostServer::new("h1s", "s1"),
            "10.0.0.2".parse().unwrap(),
            9,
        )
        .unwrap();

    controller.start_update_path(&mut transport);
    assert!(controller.is_updating());
    assert_eq!(controller.update_count(), 1);
    assert!(controller.tick(&mut transport));
    assert_eq!(controller.update_count(), 2);
}

#[test]
fn port_status_delete_removes_link_and_stops_future_routes_over_it() {
    let (mut controller, _transport) = diamond_controller(RoutingStrategy::Dijkstra);
    controller.on_port_status(&"s3".into(), 2, true);
    assert!(controller.topology().find_link(&"s3".into(), &"s4".into()).is_none());
    assert_eq!(controller.topology().links().len(), 3);
}

#[test]
fn init_resets_the_controller_to_a_blank_slate() {
    let (mut controller, mut transport) = diamond_controller(RoutingStrategy::DisasterAware);
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h1c", "s4", 1000, 20.0),
            "10.0.0.1".parse().unwrap(),
            9,
            HostServer::new("h1s", "s1"),
            "10.0.0.2".parse().unwrap(),
            9,
        )
        .unwrap();
    controller.start_update_path(&mut transport);

    controller.init();
    assert!(controller.topology().switches().is_empty());
    assert!(controller.topology().links().is_empty());
    assert!(!controller.is_updating());
    assert_eq!(controller.ip_of("h1c"), None);
}

#[test]
fn duplicate_client_name_is_rejected() {
    let (mut controller, mut transport) = diamond_controller(RoutingStrategy::Dijkstra);
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h1c", "s4", 1000, 20.0),
            "10.0.0.1".parse().unwrap(),
            9,
            HostServer::new("h1s", "s1"),
            "10.0.0.2".parse().unwrap(),
            9,
        )
        .unwrap();
    let err = controller.add_host_pair(
        &mut transport,
        HostClient::new("h1c", "s2", 1000, 20.0),
        "10.0.2.1".parse().unwrap(),
        5,
        HostServer::new("h3s", "s1"),
        "10.0.2.2".parse().unwrap(),
        5,
    );
    assert!(err.is_err());
}
