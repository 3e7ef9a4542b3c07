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

//! The controller aggregate: the single owner of the topology, the port map,
//! the IP bindings, and the flow installer. Every admin-surface operation and
//! every OpenFlow event handler is a method here, so the whole mutable state
//! of the controller sits behind one value a real driver would put behind one
//! `Mutex` (see the crate-level concurrency note).

pub mod learning;
pub mod update_loop;

use std::collections::HashMap;
use std::net::Ipv4Addr;

use log::{info, warn};

use crate::error::ControllerError;
use crate::flow::{FlowInstaller, PortMap, SwitchTransport};
use crate::routing::{self, RoutingStrategy};
use crate::topology::{HostClient, HostServer, Link, SwitchName, Topology};

use learning::LearningBridge;
use update_loop::UpdateLoop;

/// Adapts the controller's `from -> port -> neighbor` port map to the
/// [`PortMap`] the flow installer queries by `(from, to)`.
struct PortsAdapter<'a>(&'a HashMap<SwitchName, HashMap<u32, SwitchName>>);

impl PortMap for PortsAdapter<'_> {
    fn port_towards(&self, from: &SwitchName, to: &SwitchName) -> Option<u32> {
        self.0.get(from)?.iter().find(|(_, n)| *n == to).map(|(p, _)| *p)
    }
}

/// The controller: topology, port map, host IP/access-port bindings, flow
/// installer, routing strategy, and the learning bridge and update loop that
/// drive them.
#[derive(Debug, Clone)]
pub struct Controller {
    topology: Topology,
    ports: HashMap<SwitchName, HashMap<u32, SwitchName>>,
    ip_bindings: HashMap<String, Ipv4Addr>,
    host_ports: HashMap<String, u32>,
    installer: FlowInstaller,
    update_loop: UpdateLoop,
    learning: LearningBridge,
    strategy: RoutingStrategy,
    update_interval_sec: u32,
}

impl Controller {
    /// Build a controller with an empty topology. `update_interval_sec` must
    /// be greater than zero.
    pub fn new(strategy: RoutingStrategy, update_interval_sec: u32) -> Result<Self, ControllerError> {
        if update_interval_sec == 0 {
            return Err(ControllerError::InvalidUpdateInterval(0));
        }
        Ok(Self {
            topology: Topology::new(),
            ports: HashMap::new(),
            ip_bindings: HashMap::new(),
            host_ports: HashMap::new(),
            installer: FlowInstaller::new(),
            update_loop: UpdateLoop::new(),
            learning: LearningBridge::new(),
            strategy,
            update_interval_sec,
        })
    }

    /// The topology, for read-only inspection (admin-surface GETs).
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Whether the update loop is currently running.
    pub fn is_updating(&self) -> bool {
        self.update_loop.is_updating()
    }

    /// The next tick index the update loop will run.
    pub fn update_count(&self) -> i64 {
        self.update_loop.update_count()
    }

    /// The IPv4 address registered for a host name, if any.
    pub fn ip_of(&self, host_name: &str) -> Option<Ipv4Addr> {
        self.ip_bindings.get(host_name).copied()
    }

    /// Register a switch and install its table-miss entry. Re-registering an
    /// already-known switch only re-installs the table-miss rule, which is
    /// harmless (the switch replaces the entry in place).
    pub fn on_switch_features(&mut self, transport: &mut dyn SwitchTransport, switch: impl Into<SwitchName>) {
        let switch = switch.into();
        info!("switch {switch} connected");
        self.topology.add_switch(switch.clone());
        self.installer.install_table_miss(transport, &switch);
    }

    /// A switch reported one of its ports went down or up. Only `is_delete`
    /// is acted on: the port-map entry and the underlying link are removed,
    /// exactly the `OFPPR_DELETE` handling in the reference controller.
    pub fn on_port_status(&mut self, switch: &SwitchName, port: u32, is_delete: bool) {
        if !is_delete {
            return;
        }
        let Some(neighbor) = self.ports.get(switch).and_then(|m| m.get(&port)).cloned() else {
            return;
        };
        info!("port {port} on {switch} (towards {neighbor}) went down, tearing down link");
        if let Some(m) = self.ports.get_mut(switch) {
            m.remove(&port);
        }
        if let Some(m) = self.ports.get_mut(&neighbor) {
            let stale: Vec<u32> = m.iter().filter(|(_, n)| **n == *switch).map(|(p, _)| *p).collect();
            for p in stale {
                m.remove(&p);
            }
        }
        self.topology.remove_link(switch, &neighbor);
    }

    /// Register a bidirectional link and its port bindings. Both endpoint
    /// switches must already be registered. A link already present between
    /// these two switches is a no-op, leaving the existing port bindings and
    /// fail time untouched.
    pub fn add_link(
        &mut self,
        a: impl Into<SwitchName>,
        a_port: u32,
        b: impl Into<SwitchName>,
        b_port: u32,
        bandwidth_mbps: f64,
    ) -> Result<(), ControllerError> {
        let a = a.into();
        let b = b.into();
        if !self.topology.has_switch(&a) {
            return Err(ControllerError::UnknownSwitch(a));
        }
        if !self.topology.has_switch(&b) {
            return Err(ControllerError::UnknownSwitch(b));
        }
        if self.topology.find_link(&a, &b).is_some() {
            return Ok(());
        }
        self.topology.add_link(Link::new(a.clone(), b.clone(), bandwidth_mbps));
        self.ports.entry(a.clone()).or_default().insert(a_port, b.clone());
        self.ports.entry(b.clone()).or_default().insert(b_port, a.clone());
        Ok(())
    }

    /// Update a link's predicted failure time.
    pub fn register_link_fail_time(
        &mut self,
        a: &SwitchName,
        b: &SwitchName,
        fail_at_sec: i64,
    ) -> Result<(), ControllerError> {
        self.topology.register_link_fail_time(a, b, fail_at_sec)
    }

    /// Register a client/server backup pair, bind their IPs and access
    /// ports, and immediately install their static host-edge flow entries —
    /// independent of whether the update loop has run.
    #[allow(clippy::too_many_arguments)]
    pub fn add_host_pair(
        &mut self,
        transport: &mut dyn SwitchTransport,
        client: HostClient,
        client_ip: Ipv4Addr,
        client_port: u32,
        server: HostServer,
        server_ip: Ipv4Addr,
        server_port: u32,
    ) -> Result<(), ControllerError> {
        let client_switch = client.neighbor_switch.clone();
        let server_switch = server.neighbor_switch.clone();
        let client_name = client.name.clone();
        let server_name = server.name.clone();

        self.topology.add_host_pair(client, server)?;

        self.ip_bindings.insert(client_name.clone(), client_ip);
        self.ip_bindings.insert(server_name.clone(), server_ip);
        self.host_ports.insert(client_name, client_port);
        self.host_ports.insert(server_name, server_port);

        self.installer.install_host_edge(transport, &client_switch, client_ip, client_port);
        self.installer.install_host_edge(transport, &server_switch, server_ip, server_port);
        Ok(())
    }

    /// Update an existing client's predicted failure time and data size.
    /// Unknown client names are a no-op, matching the admin-surface contract.
    pub fn update_host_client(&mut self, name: &str, fail_at_sec: i64, datasize_gb: f64) {
        self.topology.update_host_client(name, fail_at_sec, datasize_gb);
    }

    /// Start the update loop at tick 0 and immediately run the first tick.
    pub fn start_update_path(&mut self, transport: &mut dyn SwitchTransport) {
        self.update_loop.start();
        self.tick(transport);
    }

    /// Run one planning tick: compute the plan, install it, and advance the
    /// tick counter. Returns whether the caller should schedule another tick.
    /// A plan computation error or an empty plan both stop the loop (no
    /// further ticks are scheduled), matching the reference implementation's
    /// return-without-rescheduling behavior.
    pub fn tick(&mut self, transport: &mut dyn SwitchTransport) -> bool {
        if !self.update_loop.is_updating() {
            return false;
        }
        let nth = self.update_loop.update_count();
        match routing::plan(&self.topology, self.strategy, nth, self.update_interval_sec as i64) {
            Ok(routes) if routes.is_empty() => {
                info!("no path available for any registered pair, stopping update loop");
                false
            }
            Ok(routes) => {
                let ip_bindings = &self.ip_bindings;
                let ports = PortsAdapter(&self.ports);
                self.installer
                    .install_plan(transport, &ports, &routes, |name| ip_bindings.get(name).copied());
                self.update_loop.advance();
                true
            }
            Err(e) => {
                warn!("failed to compute plan: {e}");
                false
            }
        }
    }

    /// Handle a packet-in not matched by any higher-priority rule: parse the
    /// raw frame, learn its source, and forward or flood it, per the default
    /// learning-bridge behavior.
    pub fn handle_packet_in(&mut self, transport: &mut dyn SwitchTransport, switch: &SwitchName, in_port: u32, buffer_id: Option<u32>, data: Vec<u8>) {
        self.learning.handle_packet_in(transport, switch, in_port, buffer_id, data);
    }

    /// Reset to a freshly-constructed controller: drop the topology, port
    /// map, IP bindings, learned MAC tables, and stop the update loop.
    pub fn init(&mut self) {
        self.topology.reset();
        self.ports.clear();
        self.ip_bindings.clear();
        self.host_ports.clear();
        self.installer.reset();
        self.update_loop.stop();
        self.learning.reset();
    }
}
