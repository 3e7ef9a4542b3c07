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

//! Controller configuration. Built programmatically by a caller (there is no
//! mandated file format, matching the reference controller's in-code
//! topology), but `serde`-derived so the admin surface's JSON bodies can
//! (de)serialize through it directly.

use crate::error::ControllerError;
use crate::routing::RoutingStrategy;

/// How often, in seconds, the update loop recomputes and reinstalls routes.
pub const DEFAULT_UPDATE_INTERVAL_SEC: u32 = 30;

/// Controller configuration: which routing strategy to run and at what cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Which route-calculation strategy to run each tick.
    pub strategy: RoutingStrategy,
    /// Seconds between update-loop ticks. Must be greater than zero.
    pub update_interval_sec: u32,
}

impl Config {
    /// Build a config, rejecting a non-positive update interval up front so
    /// `Controller::new` never has to.
    pub fn new(strategy: RoutingStrategy, update_interval_sec: u32) -> Result<Self, ControllerError> {
        if update_interval_sec == 0 {
            return Err(ControllerError::InvalidUpdateInterval(0));
        }
        Ok(Self {
            strategy,
            update_interval_sec,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: RoutingStrategy::DisasterAware,
            update_interval_sec: DEFAULT_UPDATE_INTERVAL_SEC,
        }
    }
}
