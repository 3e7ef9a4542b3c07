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

//! Error types returned by the admin surface and the route calculator.

use thiserror::Error;

use crate::topology::SwitchName;

/// Configuration and planning errors surfaced synchronously to the caller.
///
/// Transport errors (a switch disconnecting mid flow-install) and per-pair
/// unreachability are *not* represented here: both are absorbed by the tick
/// loop and logged rather than surfaced as a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// An operation referenced a switch that was never registered.
    #[error("unknown switch: {0}")]
    UnknownSwitch(SwitchName),
    /// `registerLinkFailTime` or a link mutation referenced a link that does not exist.
    #[error("no link between {0} and {1}")]
    MissingLink(SwitchName, SwitchName),
    /// `addHostPair` named a client or server whose neighbor switch is not registered.
    #[error("unknown neighbor switch for host: {0}")]
    UnknownNeighbor(SwitchName),
    /// `addHostPair` was called twice with the same client name.
    #[error("duplicate host client: {0}")]
    DuplicateHostClient(String),
    /// The disaster-aware planner was asked to run with a non-positive interval.
    #[error("update_interval_sec must be greater than 0, got {0}")]
    InvalidUpdateInterval(i64),
    /// The disaster-aware planner was asked to run with a negative update index.
    #[error("nth_update must be greater than or equal to 0, got {0}")]
    InvalidNthUpdate(i64),
}
