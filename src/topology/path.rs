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

//! [`Path`]: an ordered sequence of oriented hops, with the `merge` operation
//! the widest-path closure uses to compose two sub-paths.

use super::{FailTime, Link, SwitchName};

/// A single hop, oriented `from -> to`.
///
/// Equality only considers the orientation (`from`, `to`), matching the
/// reference implementation's `DirectedLink.__eq__`: two directed links with
/// the same orientation are equal regardless of which `Link` they were built
/// from.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectedLink {
    /// Tail of the hop.
    pub from: SwitchName,
    /// Head of the hop.
    pub to: SwitchName,
    /// Bandwidth of the underlying link, in Mbps.
    pub bandwidth_mbps: f64,
    /// Predicted failure time of the underlying link.
    pub fail_at_sec: FailTime,
}

impl PartialEq for DirectedLink {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}
impl Eq for DirectedLink {}

impl DirectedLink {
    /// Orient `link` from `from` to the other endpoint.
    ///
    /// # Panics
    /// Panics if `from` is not an endpoint of `link` (an internal invariant
    /// of the planner; callers only orient links they just looked up).
    pub fn from_link(link: &Link, from: &SwitchName) -> Self {
        let to = link
            .other_end(from)
            .expect("from must be an endpoint of link")
            .clone();
        Self {
            from: from.clone(),
            to,
            bandwidth_mbps: link.bandwidth_mbps,
            fail_at_sec: link.fail_at_sec,
        }
    }

    /// The same underlying link, oriented the other way.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            bandwidth_mbps: self.bandwidth_mbps,
            fail_at_sec: self.fail_at_sec,
        }
    }
}

/// An ordered sequence of directed hops. The empty path is a valid value
/// (used both for "no route" and as the identity of [`Path::merge`]).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    /// The hops, in traversal order.
    pub links: Vec<DirectedLink>,
}

impl Path {
    /// The empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// A path with a single hop.
    pub fn single(link: DirectedLink) -> Self {
        Self { links: vec![link] }
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True if this path has no hops.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Prepend a hop (used by predecessor-walking reconstruction, which
    /// builds the path from destination back to source).
    pub fn push_front(&mut self, link: DirectedLink) {
        self.links.insert(0, link);
    }

    /// The minimum bandwidth across all hops. The empty path's bottleneck is
    /// `f64::INFINITY`, matching the reference implementation's sentinel
    /// (an empty path never constrains anything it is merged with).
    pub fn bottleneck_bandwidth_mbps(&self) -> f64 {
        self.links
            .iter()
            .fold(f64::INFINITY, |acc, l| acc.min(l.bandwidth_mbps))
    }

    /// True if the path is a simple walk: consecutive hops share an
    /// endpoint, and no hop and its reverse both appear.
    pub fn is_well_formed(&self) -> bool {
        for w in self.links.windows(2) {
            if w[0].to != w[1].from {
                return false;
            }
        }
        for (i, a) in self.links.iter().enumerate() {
            let rev = a.reversed();
            if self.links[i + 1..].iter().any(|b| *b == rev) {
                return false;
            }
        }
        true
    }

    /// Compose two sub-paths, cancelling immediate U-turns.
    ///
    /// The longer of the two inputs is the base; the shorter is appended
    /// after cancellation. Any hop appearing in one operand and its reverse
    /// appearing in the other is removed from both. Identical hops appearing
    /// in both are deduplicated (kept once, from the longer operand).
    ///
    /// `merge(empty, p) == p == merge(p, empty)`, and `merge(p, reverse(p))`
    /// is empty for any simple path `p`.
    pub fn merge(path1: &Path, path2: &Path) -> Path {
        let (mut longer, mut shorter) = if path1.len() >= path2.len() {
            (path1.clone(), path2.clone())
        } else {
            (path2.clone(), path1.clone())
        };

        for l in longer.links.clone() {
            if let Some(pos) = shorter.links.iter().position(|x| *x == l) {
                shorter.links.remove(pos);
            }
            let rev = l.reversed();
            if let Some(pos) = shorter.links.iter().position(|x| *x == rev) {
                if let Some(lp) = longer.links.iter().position(|x| *x == l) {
                    longer.links.remove(lp);
                }
                shorter.links.remove(pos);
            }
        }

        longer.links.extend(shorter.links);
        longer
    }

    /// Reverse the path: same hops, opposite order and opposite orientation.
    pub fn reversed(&self) -> Path {
        Path {
            links: self.links.iter().rev().map(DirectedLink::reversed).collect(),
        }
    }
}
