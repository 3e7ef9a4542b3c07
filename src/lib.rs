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

//! `duskmesh` plans best-effort backup-traffic routes across an
//! SDN-controlled network ahead of predicted disasters.
//!
//! A [`controller::Controller`] owns a [`topology::Topology`]: switches,
//! links (with bandwidth and a predicted failure time), and the
//! client/server host pairs that need a path before their client fails. On
//! a fixed cadence it asks [`routing`] for a plan — either the classical
//! [`routing::RoutingStrategy::Dijkstra`] baseline or the
//! [`routing::RoutingStrategy::DisasterAware`] time-windowed widest-path
//! greedy — and turns the result into OpenFlow entries through [`flow`].
//!
//! The controller is the single critical section: every mutation and every
//! planning tick is meant to run with exclusive access to one `Controller`
//! value, e.g. behind one `Mutex` in an actual OpenFlow driver. This crate
//! does not provide that driver or the wire protocol underneath
//! [`flow::SwitchTransport`] — both are the embedding application's concern.

pub mod config;
pub mod controller;
pub mod error;
pub mod flow;
pub mod routing;
pub mod topology;

pub use config::Config;
pub use controller::Controller;
pub use error::ControllerError;
