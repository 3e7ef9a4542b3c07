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

//! The topology model: switches, links, host pairs, and the mutation
//! operations the admin surface drives.
//!
//! Links name their endpoints by [`SwitchName`] rather than by index or
//! pointer. This keeps the topology a pure value (no cyclic object graph to
//! manage) at the cost of O(|E|) lookups, which is fine at the scale this
//! controller targets (a few dozen switches).

pub mod path;

pub use path::{DirectedLink, Path};

use std::fmt;

use crate::error::ControllerError;

/// The unique name of a switch, e.g. `"s3"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchName(pub String);

impl SwitchName {
    /// Build a switch name from anything string-like.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The numeric datapath-id, which is the integer suffix of the name
    /// (`"s3"` -> `3`). Returns `None` if the name carries no trailing digits.
    pub fn datapath_id(&self) -> Option<u64> {
        let digits: String = self
            .0
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .chars()
            .rev()
            .collect();
        if digits.is_empty() {
            None
        } else {
            digits.parse().ok()
        }
    }

    /// Build a [`SwitchName`] from a datapath-id using the `"s" + decimal(dpid)` convention.
    pub fn from_datapath_id(dpid: u64) -> Self {
        Self(format!("s{dpid}"))
    }
}

impl fmt::Display for SwitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SwitchName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A registered switch. The name is the only identifying attribute; the
/// datapath-id is always derivable from it, so no separate field is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Switch {
    /// Unique switch name, primary key in the topology.
    pub name: SwitchName,
}

impl Switch {
    /// Create a new switch with the given name.
    pub fn new(name: impl Into<SwitchName>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&str> for Switch {
    fn from(s: &str) -> Self {
        Self::new(SwitchName::from(s))
    }
}

/// A link's predicted failure time, in seconds from start-of-experiment.
/// `Unknown` stands in for the reference implementation's `-1` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailTime {
    /// The time at which this link or client is predicted to fail.
    At(i64),
    /// No failure prediction is known.
    Unknown,
}

impl FailTime {
    /// Returns `true` if a failure time is known and no later than `t`.
    pub fn is_known_at_or_before(&self, t: i64) -> bool {
        matches!(self, FailTime::At(f) if *f <= t)
    }
}

impl From<i64> for FailTime {
    fn from(v: i64) -> Self {
        if v < 0 {
            FailTime::Unknown
        } else {
            FailTime::At(v)
        }
    }
}

/// An undirected link between two switches.
///
/// Equality is endpoint-unordered: `Link::new(a, b, ..)` equals
/// `Link::new(b, a, ..)` with the same bandwidth and fail time.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// One endpoint.
    pub switch1: SwitchName,
    /// The other endpoint.
    pub switch2: SwitchName,
    /// Link bandwidth in Mbps. Must be greater than zero.
    pub bandwidth_mbps: f64,
    /// Predicted failure time.
    pub fail_at_sec: FailTime,
}

impl Link {
    /// Build a new link. `fail_at_sec` defaults to [`FailTime::Unknown`].
    pub fn new(switch1: impl Into<SwitchName>, switch2: impl Into<SwitchName>, bandwidth_mbps: f64) -> Self {
        Self {
            switch1: switch1.into(),
            switch2: switch2.into(),
            bandwidth_mbps,
            fail_at_sec: FailTime::Unknown,
        }
    }

    /// Build a link with a known failure time.
    pub fn with_fail_at(mut self, fail_at_sec: impl Into<FailTime>) -> Self {
        self.fail_at_sec = fail_at_sec.into();
        self
    }

    /// Does this link touch the given endpoint pair, in either order?
    pub fn connects(&self, a: &SwitchName, b: &SwitchName) -> bool {
        (&self.switch1 == a && &self.switch2 == b) || (&self.switch1 == b && &self.switch2 == a)
    }

    /// The switch on the other side of `from`, if `from` is an endpoint of this link.
    pub fn other_end(&self, from: &SwitchName) -> Option<&SwitchName> {
        if &self.switch1 == from {
            Some(&self.switch2)
        } else if &self.switch2 == from {
            Some(&self.switch1)
        } else {
            None
        }
    }

    /// Dijkstra edge cost: `floor(C / bandwidth_mbps)`, larger bandwidth gives lower cost.
    pub fn cost(&self, c: f64) -> u64 {
        (c / self.bandwidth_mbps).floor() as u64
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.connects(&other.switch1, &other.switch2)
    }
}
impl Eq for Link {}

/// A client host: sends the backup data, and carries its predicted failure time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostClient {
    /// Unique host name.
    pub name: String,
    /// The switch this host is directly attached to.
    pub neighbor_switch: SwitchName,
    /// Time at which this client is predicted to fail.
    pub fail_at_sec: FailTime,
    /// Size, in GB, of the data that must be backed up before failure.
    pub datasize_gb: f64,
}

impl HostClient {
    /// Build a new host client.
    pub fn new(
        name: impl Into<String>,
        neighbor_switch: impl Into<SwitchName>,
        fail_at_sec: impl Into<FailTime>,
        datasize_gb: f64,
    ) -> Self {
        Self {
            name: name.into(),
            neighbor_switch: neighbor_switch.into(),
            fail_at_sec: fail_at_sec.into(),
            datasize_gb,
        }
    }
}

/// A server host: receives the backup data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostServer {
    /// Unique host name.
    pub name: String,
    /// The switch this host is directly attached to.
    pub neighbor_switch: SwitchName,
}

impl HostServer {
    /// Build a new host server.
    pub fn new(name: impl Into<String>, neighbor_switch: impl Into<SwitchName>) -> Self {
        Self {
            name: name.into(),
            neighbor_switch: neighbor_switch.into(),
        }
    }
}

/// A registered (client, server) backup pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostPair {
    /// The client that originates the transfer.
    pub client: HostClient,
    /// The server that receives the transfer.
    pub server: HostServer,
}

/// The topology aggregate: switches, links, and host pairs.
///
/// This is the single critical section named in the concurrency model: all
/// mutation and all plan computation is meant to run with exclusive access to
/// one `Topology` value (e.g. behind one `Mutex` in a real controller).
#[derive(Debug, Clone, Default)]
pub struct Topology {
    switches: Vec<Switch>,
    links: Vec<Link>,
    host_pairs: Vec<HostPair>,
}

impl Topology {
    /// An empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// All registered switches, in registration order.
    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    /// All links currently in the topology, in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All registered host pairs, in insertion order. Sort stability of this
    /// order is what the disaster planner's tie-break relies on.
    pub fn host_pairs(&self) -> &[HostPair] {
        &self.host_pairs
    }

    /// True if a switch with this name is registered.
    pub fn has_switch(&self, name: &SwitchName) -> bool {
        self.switches.iter().any(|s| &s.name == name)
    }

    /// Register a switch. A switch with the same name already present is a no-op.
    pub fn add_switch(&mut self, name: impl Into<SwitchName>) {
        let name = name.into();
        if !self.has_switch(&name) {
            self.switches.push(Switch { name });
        }
    }

    /// Remove a switch and cascade-remove every link incident to it.
    /// Removing an unregistered switch is a no-op.
    pub fn remove_switch(&mut self, name: &SwitchName) {
        if !self.has_switch(name) {
            return;
        }
        self.switches.retain(|s| &s.name != name);
        self.links
            .retain(|l| &l.switch1 != name && &l.switch2 != name);
    }

    /// Find the link between two switches, if one exists.
    pub fn find_link(&self, a: &SwitchName, b: &SwitchName) -> Option<&Link> {
        self.links.iter().find(|l| l.connects(a, b))
    }

    /// Add a link, deduplicating on the unordered endpoint pair. A link
    /// already present between these two switches is a no-op (the existing
    /// link, including its fail time, is left untouched).
    pub fn add_link(&mut self, link: Link) {
        if self.find_link(&link.switch1, &link.switch2).is_none() {
            self.links.push(link);
        }
    }

    /// Remove the link between two switches. Removing a missing link is a no-op.
    pub fn remove_link(&mut self, a: &SwitchName, b: &SwitchName) {
        self.links.retain(|l| !l.connects(a, b));
    }

    /// Update the predicted failure time of the link between `a` and `b` in place.
    pub fn register_link_fail_time(
        &mut self,
        a: &SwitchName,
        b: &SwitchName,
        fail_at_sec: impl Into<FailTime>,
    ) -> Result<(), ControllerError> {
        let link = self
            .links
            .iter_mut()
            .find(|l| l.connects(a, b))
            .ok_or_else(|| ControllerError::MissingLink(a.clone(), b.clone()))?;
        link.fail_at_sec = fail_at_sec.into();
        Ok(())
    }

    /// The switches directly connected to `switch`.
    pub fn neighbors(&self, switch: &SwitchName) -> Vec<&SwitchName> {
        self.links
            .iter()
            .filter_map(|l| l.other_end(switch))
            .collect()
    }

    /// Add a host pair. Rejects a client name that is already registered.
    pub fn add_host_pair(&mut self, client: HostClient, server: HostServer) -> Result<(), ControllerError> {
        if !self.has_switch(&client.neighbor_switch) {
            return Err(ControllerError::UnknownNeighbor(client.neighbor_switch.clone()));
        }
        if !self.has_switch(&server.neighbor_switch) {
            return Err(ControllerError::UnknownNeighbor(server.neighbor_switch.clone()));
        }
        if self.host_pairs.iter().any(|p| p.client.name == client.name) {
            return Err(ControllerError::DuplicateHostClient(client.name));
        }
        self.host_pairs.push(HostPair { client, server });
        Ok(())
    }

    /// Mutate an existing client's fail time and data size in place.
    ///
    /// The pair is popped and re-pushed at the back, matching the reference
    /// implementation's behavior exactly: it preserves nothing about ordering
    /// except that *this* name's position moves to the end. Unknown clients
    /// are a no-op, per the admin-surface contract.
    pub fn update_host_client(&mut self, name: &str, fail_at_sec: impl Into<FailTime>, datasize_gb: f64) {
        let Some(idx) = self.host_pairs.iter().position(|p| p.client.name == name) else {
            return;
        };
        let mut pair = self.host_pairs.remove(idx);
        pair.client.fail_at_sec = fail_at_sec.into();
        pair.client.datasize_gb = datasize_gb;
        self.host_pairs.push(pair);
    }

    /// Discard all switches, links, and host pairs.
    pub fn reset(&mut self) {
        self.switches.clear();
        self.links.clear();
        self.host_pairs.clear();
    }
}
