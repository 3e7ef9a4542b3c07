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

//! The disaster-aware planner: time-windowed widest-path greedy assignment.
//!
//! For every update tick, each host pair is assigned the path between its
//! switches with the largest bottleneck bandwidth expected to survive the
//! current time window, pairs being served in order of descending urgency.
//! Assigning a pair deducts its bottleneck from the links it used before the
//! next (less urgent) pair is planned.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::ControllerError;
use crate::routing::PlannedRoute;
use crate::topology::{DirectedLink, FailTime, HostPair, Path, SwitchName, Topology};

/// Unordered key for a link, used to track the single expected-bandwidth
/// value shared by both of its orientations.
fn link_key(a: &SwitchName, b: &SwitchName) -> (SwitchName, SwitchName) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// The fraction of the update window `[t0, t1)` during which a link or
/// client with the given failure prediction is expected to remain
/// operational.
fn operational_ratio(fail_at_sec: FailTime, t0: i64, t1: i64, interval_sec: i64) -> f64 {
    match fail_at_sec {
        FailTime::Unknown => 1.0,
        FailTime::At(f) => {
            if t1 <= f {
                1.0
            } else if t0 <= f {
                (f - t0) as f64 / interval_sec as f64
            } else {
                0.0
            }
        }
    }
}

/// The throughput a pair would need to finish exactly at its deadline.
///
/// A client with no known failure time carries no deadline pressure and is
/// given the lowest possible urgency (`0.0`), so it is served last and in
/// input order relative to other undated pairs; this avoids the reference
/// implementation's division that is undefined once a deadline is unknown.
fn requested_throughput(pair: &HostPair) -> f64 {
    match pair.client.fail_at_sec {
        FailTime::At(f) => pair.client.datasize_gb / f as f64,
        FailTime::Unknown => 0.0,
    }
}

/// Run the disaster-aware planner for update index `nth_update` over the
/// window `[nth_update * update_interval_sec, (nth_update + 1) *
/// update_interval_sec)`.
///
/// Pairs whose client has already failed by the start of the window
/// (`fail_at_sec <= t0`) are skipped entirely for this tick, rather than
/// being planned with an ill-defined requested throughput — see
/// `SPEC_FULL.md`'s open-question decision.
pub fn plan(topo: &Topology, nth_update: i64, update_interval_sec: i64) -> Result<Vec<PlannedRoute>, ControllerError> {
    if update_interval_sec <= 0 {
        return Err(ControllerError::InvalidUpdateInterval(update_interval_sec));
    }
    if nth_update < 0 {
        return Err(ControllerError::InvalidNthUpdate(nth_update));
    }

    let t0 = nth_update * update_interval_sec;
    let t1 = t0 + update_interval_sec;

    let mut expected_bw: HashMap<(SwitchName, SwitchName), f64> = HashMap::new();
    for link in topo.links() {
        let ratio = operational_ratio(link.fail_at_sec, t0, t1, update_interval_sec);
        expected_bw.insert(link_key(&link.switch1, &link.switch2), ratio * link.bandwidth_mbps);
    }

    let mut demand: Vec<&HostPair> = topo
        .host_pairs()
        .iter()
        .filter(|p| !p.client.fail_at_sec.is_known_at_or_before(t0))
        .collect();
    demand.sort_by(|a, b| {
        requested_throughput(b)
            .partial_cmp(&requested_throughput(a))
            .unwrap_or(Ordering::Equal)
    });

    let switches: Vec<SwitchName> = topo.switches().iter().map(|s| s.name.clone()).collect();
    let index: HashMap<SwitchName, usize> = switches.iter().cloned().enumerate().map(|(i, s)| (s, i)).collect();
    let n = switches.len();

    let mut result = Vec::with_capacity(demand.len());
    for pair in demand {
        let mut bw = vec![vec![f64::NEG_INFINITY; n]; n];
        let mut paths: Vec<Vec<Path>> = (0..n).map(|_| (0..n).map(|_| Path::new()).collect()).collect();
        for (i, diag) in bw.iter_mut().enumerate() {
            diag[i] = f64::INFINITY;
        }

        for link in topo.links() {
            let i = index[&link.switch1];
            let j = index[&link.switch2];
            let b = expected_bw[&link_key(&link.switch1, &link.switch2)];
            bw[i][j] = b;
            bw[j][i] = b;
            paths[i][j] = Path::single(DirectedLink::from_link(link, &link.switch1));
            paths[j][i] = Path::single(DirectedLink::from_link(link, &link.switch2));
        }

        // widest-path closure, Floyd-Warshall-style: i outer, k the
        // intermediate node, j inner, matching the reference implementation's
        // loop nesting exactly.
        for i in 0..n {
            for k in 0..n {
                for j in 0..n {
                    let via = bw[i][k].min(bw[k][j]);
                    if via > bw[i][j] {
                        bw[i][j] = via;
                        bw[j][i] = via;
                        paths[i][j] = Path::merge(&paths[i][k], &paths[k][j]);
                        paths[j][i] = Path::merge(&paths[j][k], &paths[k][i]);
                    }
                }
            }
        }

        let ci = index[&pair.client.neighbor_switch];
        let si = index[&pair.server.neighbor_switch];
        let path = paths[ci][si].clone();

        let bottleneck = path.bottleneck_bandwidth_mbps();
        if bottleneck.is_finite() {
            for hop in &path.links {
                if let Some(b) = expected_bw.get_mut(&link_key(&hop.from, &hop.to)) {
                    *b -= bottleneck;
                }
            }
        }

        result.push(PlannedRoute {
            client: pair.client.clone(),
            server: pair.server.clone(),
            path,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{HostClient, HostServer, Link};

    fn diamond() -> Topology {
        let mut t = Topology::new();
        for s in ["s1", "s2", "s3", "s4"] {
            t.add_switch(s);
        }
        t.add_link(Link::new("s1", "s2", 100.0).with_fail_at(1000));
        t.add_link(Link::new("s1", "s3", 1.0).with_fail_at(1000));
        t.add_link(Link::new("s2", "s4", 10.0).with_fail_at(1000));
        t.add_link(Link::new("s3", "s4", 100.0).with_fail_at(1000));
        t
    }

    fn path_switches(p: &Path) -> Vec<String> {
        if p.is_empty() {
            return vec![];
        }
        std::iter::once(p.links[0].from.0.clone())
            .chain(p.links.iter().map(|l| l.to.0.clone()))
            .collect()
    }

    #[test]
    fn s1_trivial_pair() {
        let mut t = Topology::new();
        t.add_switch("s1");
        t.add_switch("s2");
        t.add_link(Link::new("s1", "s2", 1.0).with_fail_at(50));
        t.add_host_pair(HostClient::new("h1c", "s2", 100, 20.0), HostServer::new("h1s", "s1"))
            .unwrap();

        let routes = plan(&t, 0, 30).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(path_switches(&routes[0].path), vec!["s2", "s1"]);
    }

    #[test]
    fn s2_disaster_prioritized_demand() {
        let mut t = diamond();
        t.add_host_pair(HostClient::new("h1c", "s4", 1000, 20.0), HostServer::new("h1s", "s1"))
            .unwrap();
        t.add_host_pair(HostClient::new("h2c", "s2", 500, 20.0), HostServer::new("h2s", "s3"))
            .unwrap();

        let routes = plan(&t, 0, 30).unwrap();
        assert_eq!(routes[0].client.name, "h2c");
        assert_eq!(path_switches(&routes[0].path), vec!["s2", "s4", "s3"]);
        assert_eq!(routes[1].client.name, "h1c");
        assert_eq!(path_switches(&routes[1].path), vec!["s4", "s3", "s1"]);
    }

    #[test]
    fn s3_mid_window_link_failure_avoids_failed_link() {
        let mut t = Topology::new();
        for s in ["s1", "s2", "s3", "s4"] {
            t.add_switch(s);
        }
        t.add_link(Link::new("s1", "s2", 100.0).with_fail_at(1000));
        t.add_link(Link::new("s1", "s3", 1.0).with_fail_at(1000));
        t.add_link(Link::new("s2", "s4", 10.0).with_fail_at(1000));
        t.add_link(Link::new("s3", "s4", 100.0).with_fail_at(100));
        t.add_host_pair(HostClient::new("h1c", "s4", 1000, 20.0), HostServer::new("h1s", "s1"))
            .unwrap();
        t.add_host_pair(HostClient::new("h2c", "s2", 500, 20.0), HostServer::new("h2s", "s3"))
            .unwrap();

        let routes = plan(&t, 4, 30).unwrap();
        assert_eq!(path_switches(&routes[0].path), vec!["s2", "s1", "s3"]);
        assert_eq!(path_switches(&routes[1].path), vec!["s4", "s2", "s1"]);
        for r in &routes {
            assert!(!r.path.links.iter().any(|l| {
                (l.from.0 == "s3" && l.to.0 == "s4") || (l.from.0 == "s4" && l.to.0 == "s3")
            }));
        }
    }

    #[test]
    fn s4_data_size_tiebreak() {
        let mut t = diamond();
        t.add_host_pair(HostClient::new("h1c", "s4", 1000, 20.0), HostServer::new("h1s", "s1"))
            .unwrap();
        t.add_host_pair(HostClient::new("h2c", "s2", 1000, 100.0), HostServer::new("h2s", "s3"))
            .unwrap();

        let routes = plan(&t, 0, 30).unwrap();
        assert_eq!(routes[0].client.name, "h2c");
        assert_eq!(path_switches(&routes[0].path), vec!["s2", "s4", "s3"]);
        assert_eq!(routes[1].client.name, "h1c");
        assert_eq!(path_switches(&routes[1].path), vec!["s4", "s3", "s1"]);
    }

    #[test]
    fn s5_unreachable_pair_returns_empty_path() {
        let mut t = Topology::new();
        for s in ["a1", "a2", "b1", "b2"] {
            t.add_switch(s);
        }
        t.add_link(Link::new("a1", "a2", 10.0));
        t.add_link(Link::new("b1", "b2", 10.0));
        t.add_host_pair(HostClient::new("ca", "a1", 1000, 10.0), HostServer::new("sa", "a2"))
            .unwrap();
        t.add_host_pair(HostClient::new("cross", "a1", 1000, 10.0), HostServer::new("scross", "b2"))
            .unwrap();

        let routes = plan(&t, 0, 30).unwrap();
        let within = routes.iter().find(|r| r.client.name == "ca").unwrap();
        assert!(!within.path.is_empty());
        let cross = routes.iter().find(|r| r.client.name == "cross").unwrap();
        assert!(cross.path.is_empty());
    }

    #[test]
    fn already_failed_client_is_skipped() {
        let mut t = Topology::new();
        t.add_switch("s1");
        t.add_switch("s2");
        t.add_link(Link::new("s1", "s2", 10.0));
        t.add_host_pair(HostClient::new("c1", "s1", 10, 5.0), HostServer::new("srv", "s2"))
            .unwrap();

        // t0 = 30 for nth_update=1, interval=30: client failed at 10 <= 30.
        let routes = plan(&t, 1, 30).unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn rejects_nonpositive_interval() {
        let t = Topology::new();
        let err = plan(&t, 0, 0).unwrap_err();
        assert_eq!(err, ControllerError::InvalidUpdateInterval(0));
    }

    #[test]
    fn rejects_negative_nth_update() {
        let t = Topology::new();
        let err = plan(&t, -1, 30).unwrap_err();
        assert_eq!(err, ControllerError::InvalidNthUpdate(-1));
    }
}
