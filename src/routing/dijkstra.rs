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

//! The Dijkstra shortest-path baseline: per-pair, bandwidth-oblivious to
//! disaster timing, used as the simple routing strategy and as the ground
//! truth for the "a path exists" testable property.

use std::collections::HashMap;

use crate::topology::{DirectedLink, Path, SwitchName, Topology};

/// Edge-cost scaling constant: `cost = floor(COST_SCALE / bandwidth_mbps)`.
/// Chosen, as in the reference implementation, so that higher bandwidth
/// links are cheaper.
pub const COST_SCALE: f64 = 10.0;

/// Compute the shortest path from `src` to `dst` using a lazy-fixing
/// Dijkstra relaxation over link cost `floor(COST_SCALE / bandwidth_mbps)`.
///
/// Returns an empty [`Path`] if `dst` is unreachable from `src`, or if
/// `src == dst`. Ties among equal-cost unfixed vertices are broken by the
/// topology's switch registration order, which makes the result fully
/// deterministic for a given topology.
pub fn shortest_path(topo: &Topology, src: &SwitchName, dst: &SwitchName) -> Path {
    if src == dst || !topo.has_switch(src) || !topo.has_switch(dst) {
        return Path::new();
    }

    let mut cost: HashMap<SwitchName, u64> = HashMap::new();
    let mut predecessor_link: HashMap<SwitchName, DirectedLink> = HashMap::new();
    let mut fixed: Vec<SwitchName> = vec![src.clone()];
    cost.insert(src.clone(), 0);
    for s in topo.switches() {
        if &s.name != src {
            cost.insert(s.name.clone(), u64::MAX);
        }
    }

    while !fixed.contains(dst) {
        let last = fixed.last().unwrap().clone();
        let last_cost = cost[&last];
        if last_cost == u64::MAX {
            // the frontier is exhausted without reaching dst: unreachable.
            return Path::new();
        }

        for neighbor in topo.neighbors(&last) {
            if fixed.contains(neighbor) {
                continue;
            }
            let link = topo
                .find_link(&last, neighbor)
                .expect("neighbor implies a link exists");
            let candidate = last_cost + link.cost(COST_SCALE);
            if candidate < cost[neighbor] {
                cost.insert(neighbor.clone(), candidate);
                predecessor_link.insert(neighbor.clone(), DirectedLink::from_link(link, &last));
            }
        }

        // pick the lowest-cost unfixed switch, in topology registration order on ties.
        let next = topo
            .switches()
            .iter()
            .map(|s| &s.name)
            .filter(|n| !fixed.contains(n))
            .min_by_key(|n| cost[*n]);
        match next {
            Some(n) => fixed.push(n.clone()),
            None => return Path::new(),
        }
    }

    // reconstruct by walking predecessor links from dst back to src.
    let mut path = Path::new();
    let mut at = dst.clone();
    while &at != src {
        let Some(link) = predecessor_link.get(&at) else {
            return Path::new();
        };
        let from = link.from.clone();
        path.push_front(link.clone());
        at = from;
    }
    path
}
