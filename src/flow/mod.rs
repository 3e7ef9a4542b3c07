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

//! Flow entries and the interface the core expects of the OpenFlow
//! transport driver. The wire format (barrier replies, echo/hello
//! handshake, actual socket framing) is the external collaborator's
//! concern; this module only models the match/action vocabulary the core
//! produces and the operations it invokes.

use std::net::Ipv4Addr;

use log::trace;
use thiserror::Error;

use crate::routing::PlannedRoute;
use crate::topology::SwitchName;

/// Table-miss entries send unmatched traffic to the controller.
pub const TABLE_MISS_PRIORITY: u32 = 0;
/// Priority used by the MAC-learning bridge's exact-match entries.
pub const LEARNING_PRIORITY: u32 = 10;
/// Priority used by static host-edge entries binding a host's IP to its access port.
pub const HOST_EDGE_PRIORITY: u32 = 50;
/// First priority used by the route planner; increases by one per tick.
pub const INITIAL_ROUTE_PRIORITY: u32 = 100;

/// The match portion of a flow entry. Only the combinations the core
/// actually installs are represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowMatch {
    /// Table-miss: matches everything.
    Any,
    /// Exact match on the destination MAC address (the learning bridge).
    EthDst(String),
    /// `eth_type = IPv4, ipv4_dst = addr`.
    Ipv4Dst(Ipv4Addr),
    /// `eth_type = ARP, arp_tpa = addr`.
    ArpTpa(Ipv4Addr),
}

/// A single OpenFlow action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Output the packet on this port.
    Output(u32),
    /// Send the packet to the controller, uncapped (`OFPCML_NO_BUFFER`).
    ToController,
}

/// A (priority, match, actions) flow-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEntry {
    /// Higher priority wins; older lower-priority entries are left in place
    /// until the switch evicts them.
    pub priority: u32,
    /// The match clause.
    pub matching: FlowMatch,
    /// Actions to apply on a match. An empty vector means "drop".
    pub actions: Vec<FlowAction>,
}

/// Errors raised while talking to a switch. These are always absorbed by
/// the caller (logged, install continues with the next hop/pair) per the
/// core's error-propagation policy; they are never returned out of the
/// public API as a hard failure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The switch is not currently connected.
    #[error("switch {0} is not connected")]
    Disconnected(SwitchName),
    /// Any other transport-level failure (socket write error, etc).
    #[error("transport error talking to {0}: {1}")]
    Other(SwitchName, String),
}

/// What the core needs from the external OpenFlow driver: installing flow
/// entries and emitting packet-outs. Framing, the echo/hello handshake, and
/// barrier replies are the driver's concern and are not modeled here.
pub trait SwitchTransport {
    /// Install a flow entry on `switch`. `buffer_id` lets the switch emit a
    /// buffered packet that triggered this install, if any.
    fn install_flow(&mut self, switch: &SwitchName, entry: FlowEntry, buffer_id: Option<u32>) -> Result<(), TransportError>;

    /// Emit a packet-out on `switch`, echoing `data` out of `actions`.
    fn packet_out(&mut self, switch: &SwitchName, in_port: u32, actions: Vec<FlowAction>, data: Vec<u8>) -> Result<(), TransportError>;
}

/// Resolves which port on a switch faces a given neighbor switch. The
/// controller owns the concrete port map; the flow installer only needs to
/// query it.
pub trait PortMap {
    /// The port on `from` that is wired to `to`, if the two are adjacent.
    fn port_towards(&self, from: &SwitchName, to: &SwitchName) -> Option<u32>;
}

/// Translates plans and host registrations into flow entries, at a
/// monotonically increasing route priority.
#[derive(Debug, Clone)]
pub struct FlowInstaller {
    route_priority: u32,
}

impl Default for FlowInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowInstaller {
    /// A fresh installer at the initial priority.
    pub fn new() -> Self {
        Self {
            route_priority: INITIAL_ROUTE_PRIORITY,
        }
    }

    /// The priority that will be used for the *next* batch of route entries.
    pub fn current_priority(&self) -> u32 {
        self.route_priority
    }

    /// Reset to the initial priority (used by `init()`).
    pub fn reset(&mut self) {
        self.route_priority = INITIAL_ROUTE_PRIORITY;
    }

    /// Install the table-miss rule on a newly-registered switch.
    pub fn install_table_miss(&self, transport: &mut dyn SwitchTransport, switch: &SwitchName) {
        let entry = FlowEntry {
            priority: TABLE_MISS_PRIORITY,
            matching: FlowMatch::Any,
            actions: vec![FlowAction::ToController],
        };
        if let Err(e) = transport.install_flow(switch, entry, None) {
            log::warn!("failed to install table-miss rule on {switch}: {e}");
        }
    }

    /// Install the static IPv4+ARP host-edge entries binding `ip` to
    /// `out_port` on `switch`, at [`HOST_EDGE_PRIORITY`].
    pub fn install_host_edge(&self, transport: &mut dyn SwitchTransport, switch: &SwitchName, ip: Ipv4Addr, out_port: u32) {
        for matching in [FlowMatch::Ipv4Dst(ip), FlowMatch::ArpTpa(ip)] {
            let entry = FlowEntry {
                priority: HOST_EDGE_PRIORITY,
                matching,
                actions: vec![FlowAction::Output(out_port)],
            };
            if let Err(e) = transport.install_flow(switch, entry, None) {
                log::warn!("failed to install host-edge rule on {switch}: {e}");
            }
        }
    }

    /// Install every pair's path as symmetric per-hop flow entries, then
    /// bump the route priority so the next batch shadows this one.
    ///
    /// `ip_of` resolves a host name to its IPv4 address; pairs whose client
    /// or server has no known IP, or whose path is empty, are skipped.
    pub fn install_plan(
        &mut self,
        transport: &mut dyn SwitchTransport,
        ports: &dyn PortMap,
        routes: &[PlannedRoute],
        ip_of: impl Fn(&str) -> Option<Ipv4Addr>,
    ) {
        let priority = self.route_priority;
        for route in routes {
            if route.path.is_empty() {
                continue;
            }
            let (Some(client_ip), Some(server_ip)) = (ip_of(&route.client.name), ip_of(&route.server.name)) else {
                log::warn!(
                    "skipping install for {}->{}: missing IP binding",
                    route.client.name, route.server.name
                );
                continue;
            };
            for hop in &route.path.links {
                trace!("installing hop {} -> {} at priority {priority}", hop.from, hop.to);
                let Some(out_port) = ports.port_towards(&hop.from, &hop.to) else {
                    log::warn!("no port from {} towards {}, skipping hop", hop.from, hop.to);
                    continue;
                };
                for matching in [FlowMatch::Ipv4Dst(server_ip), FlowMatch::ArpTpa(server_ip)] {
                    let entry = FlowEntry {
                        priority,
                        matching,
                        actions: vec![FlowAction::Output(out_port)],
                    };
                    if let Err(e) = transport.install_flow(&hop.from, entry, None) {
                        log::warn!("failed to install route rule on {}: {e}", hop.from);
                    }
                }

                let Some(back_port) = ports.port_towards(&hop.to, &hop.from) else {
                    log::warn!("no port from {} towards {}, skipping symmetric hop", hop.to, hop.from);
                    continue;
                };
                for matching in [FlowMatch::Ipv4Dst(client_ip), FlowMatch::ArpTpa(client_ip)] {
                    let entry = FlowEntry {
                        priority,
                        matching,
                        actions: vec![FlowAction::Output(back_port)],
                    };
                    if let Err(e) = transport.install_flow(&hop.to, entry, None) {
                        log::warn!("failed to install route rule on {}: {e}", hop.to);
                    }
                }
            }
        }
        self.route_priority += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Path;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeSwitches {
        installed: Vec<(SwitchName, FlowEntry)>,
    }

    impl SwitchTransport for FakeSwitches {
        fn install_flow(&mut self, switch: &SwitchName, entry: FlowEntry, _buffer_id: Option<u32>) -> Result<(), TransportError> {
            self.installed.push((switch.clone(), entry));
            Ok(())
        }
        fn packet_out(&mut self, _switch: &SwitchName, _in_port: u32, _actions: Vec<FlowAction>, _data: Vec<u8>) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct FixedPorts(HashMap<(SwitchName, SwitchName), u32>);
    impl PortMap for FixedPorts {
        fn port_towards(&self, from: &SwitchName, to: &SwitchName) -> Option<u32> {
            self.0.get(&(from.clone(), to.clone())).copied()
        }
    }

    #[test]
    fn install_plan_emits_symmetric_entries_and_bumps_priority() {
        use crate::topology::{DirectedLink, FailTime, HostClient, HostServer};

        let mut transport = FakeSwitches::default();
        let mut ports = HashMap::new();
        ports.insert(("s1".into(), "s2".into()), 1u32);
        ports.insert(("s2".into(), "s1".into()), 2u32);
        let ports = FixedPorts(ports);

        let route = PlannedRoute {
            client: HostClient::new("c", "s2", 100, 1.0),
            server: HostServer::new("s", "s1"),
            path: Path::single(DirectedLink {
                from: "s1".into(),
                to: "s2".into(),
                bandwidth_mbps: 10.0,
                fail_at_sec: FailTime::Unknown,
            }),
        };

        let mut installer = FlowInstaller::new();
        assert_eq!(installer.current_priority(), INITIAL_ROUTE_PRIORITY);
        installer.install_plan(&mut transport, &ports, &[route], |name| match name {
            "c" => Some("10.0.0.1".parse().unwrap()),
            "s" => Some("10.0.0.2".parse().unwrap()),
            _ => None,
        });

        assert_eq!(transport.installed.len(), 4);
        assert!(transport.installed.iter().all(|(_, e)| e.priority == INITIAL_ROUTE_PRIORITY));
        assert_eq!(installer.current_priority(), INITIAL_ROUTE_PRIORITY + 1);
    }

    #[test]
    fn empty_path_is_skipped() {
        let mut transport = FakeSwitches::default();
        let ports = FixedPorts(HashMap::new());
        let route = PlannedRoute {
            client: crate::topology::HostClient::new("c", "s2", 100, 1.0),
            server: crate::topology::HostServer::new("s", "s1"),
            path: Path::new(),
        };
        let mut installer = FlowInstaller::new();
        installer.install_plan(&mut transport, &ports, &[route], |_| None);
        assert!(transport.installed.is_empty());
        assert_eq!(installer.current_priority(), INITIAL_ROUTE_PRIORITY + 1);
    }
}
