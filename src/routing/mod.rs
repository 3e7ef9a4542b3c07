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

//! Route calculation: two strategies sharing one [`Topology`], selected
//! once at configuration time rather than dispatched by a runtime string (see
//! `SPEC_FULL.md`'s note on replacing the reference implementation's enum
//! dispatch-by-string).

pub mod dijkstra;
pub mod disaster;

use crate::error::ControllerError;
use crate::topology::{HostClient, HostServer, Path, Topology};

/// One pair's computed route for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    /// The client that originates this transfer.
    pub client: HostClient,
    /// The server that receives it.
    pub server: HostServer,
    /// The assigned path; empty if the pair is currently unreachable.
    pub path: Path,
}

/// Which route-calculation strategy the controller uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutingStrategy {
    /// Classical per-pair shortest path, ignoring disaster timing.
    Dijkstra,
    /// Time-windowed widest-path greedy, prioritizing by urgency.
    DisasterAware,
}

/// Compute the plan for the current tick under the given strategy.
pub fn plan(
    topo: &Topology,
    strategy: RoutingStrategy,
    nth_update: i64,
    update_interval_sec: i64,
) -> Result<Vec<PlannedRoute>, ControllerError> {
    match strategy {
        RoutingStrategy::Dijkstra => Ok(topo
            .host_pairs()
            .iter()
            .map(|pair| {
                let path = dijkstra::shortest_path(topo, &pair.client.neighbor_switch, &pair.server.neighbor_switch);
                PlannedRoute {
                    client: pair.client.clone(),
                    server: pair.server.clone(),
                    path,
                }
            })
            .collect()),
        RoutingStrategy::DisasterAware => disaster::plan(topo, nth_update, update_interval_sec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{HostClient, HostServer, Link};

    #[test]
    fn dijkstra_strategy_ignores_fail_times() {
        let mut t = Topology::new();
        t.add_switch("s1");
        t.add_switch("s2");
        t.add_link(Link::new("s1", "s2", 1.0).with_fail_at(0));
        t.add_host_pair(HostClient::new("c", "s2", 100, 1.0), HostServer::new("s", "s1"))
            .unwrap();

        let routes = plan(&t, RoutingStrategy::Dijkstra, 0, 30).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path.links.len(), 1);
    }

    #[test]
    fn disaster_strategy_is_deterministic() {
        let mut t = Topology::new();
        t.add_switch("s1");
        t.add_switch("s2");
        t.add_switch("s3");
        t.add_link(Link::new("s1", "s2", 10.0));
        t.add_link(Link::new("s2", "s3", 5.0));
        t.add_host_pair(HostClient::new("c", "s1", 100, 1.0), HostServer::new("s", "s3"))
            .unwrap();

        let r1 = plan(&t, RoutingStrategy::DisasterAware, 0, 30).unwrap();
        let r2 = plan(&t, RoutingStrategy::DisasterAware, 0, 30).unwrap();
        assert_eq!(r1, r2);
    }
}
