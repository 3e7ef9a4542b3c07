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

//! The default MAC-learning bridge: installs exact-match destination flows
//! and floods unknown destinations, so the network works before any plan
//! exists and for any traffic the planner does not own.

use std::collections::HashMap;

use log::{debug, trace};

use crate::flow::{FlowAction, FlowEntry, FlowMatch, SwitchTransport, LEARNING_PRIORITY};
use crate::topology::SwitchName;

/// OpenFlow's reserved flood port, `OFPP_FLOOD`.
pub const FLOOD_PORT: u32 = 0xffff_fffb;

/// `eth_type` value marking an IPv6 frame.
const ETHERTYPE_IPV6: u16 = 0x86dd;

/// An Ethernet header's addressing fields, parsed out of a raw frame.
struct EthernetHeader {
    src: String,
    dst: String,
    ethertype: u16,
}

/// Parse the destination MAC, source MAC, and ethertype out of a raw
/// Ethernet II frame. Returns `None` if `data` is too short to carry a full
/// 14-byte header (dst[6] + src[6] + ethertype[2]).
fn parse_ethernet_header(data: &[u8]) -> Option<EthernetHeader> {
    if data.len() < 14 {
        return None;
    }
    Some(EthernetHeader {
        dst: mac_to_string(&data[0..6]),
        src: mac_to_string(&data[6..12]),
        ethertype: u16::from_be_bytes([data[12], data[13]]),
    })
}

fn mac_to_string(octets: &[u8]) -> String {
    octets.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":")
}

/// Per-switch learned `eth_src -> in_port` tables.
#[derive(Debug, Clone, Default)]
pub struct LearningBridge {
    mac_to_port: HashMap<SwitchName, HashMap<String, u32>>,
}

impl LearningBridge {
    /// A bridge with no learned state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all learned MAC tables (used by `init()`).
    pub fn reset(&mut self) {
        self.mac_to_port.clear();
    }

    /// Handle a packet-in for a frame that was not matched by any
    /// higher-priority rule. `data` is the raw frame as received from the
    /// switch; a frame too short to carry an Ethernet header, or an IPv6
    /// frame, is dropped silently. Everything else is learned and either
    /// forwarded to a learned port (installing a flow so the next packet
    /// skips the controller) or flooded.
    pub fn handle_packet_in(
        &mut self,
        transport: &mut dyn SwitchTransport,
        switch: &SwitchName,
        in_port: u32,
        buffer_id: Option<u32>,
        data: Vec<u8>,
    ) {
        let Some(header) = parse_ethernet_header(&data) else {
            trace!("dropping packet-in on {switch}: frame too short for an Ethernet header");
            return;
        };
        if header.ethertype == ETHERTYPE_IPV6 {
            trace!("dropping IPv6 frame on {switch}");
            return;
        }

        let table = self.mac_to_port.entry(switch.clone()).or_default();
        table.insert(header.src.clone(), in_port);
        let out_port = table.get(&header.dst).copied();

        debug!(
            "packet-in on {switch} in_port={in_port} src={} dst={} out_port={:?}",
            header.src, header.dst, out_port
        );

        if let Some(port) = out_port {
            let entry = FlowEntry {
                priority: LEARNING_PRIORITY,
                matching: FlowMatch::EthDst(header.dst),
                actions: vec![FlowAction::Output(port)],
            };
            if buffer_id.is_some() {
                if let Err(e) = transport.install_flow(switch, entry, buffer_id) {
                    log::warn!("failed to install learned flow on {switch}: {e}");
                }
                // the switch emits the buffered packet itself on install.
                return;
            }
            if let Err(e) = transport.install_flow(switch, entry, None) {
                log::warn!("failed to install learned flow on {switch}: {e}");
            }
            if let Err(e) = transport.packet_out(switch, in_port, vec![FlowAction::Output(port)], data) {
                log::warn!("failed to emit packet-out on {switch}: {e}");
            }
        } else if let Err(e) = transport.packet_out(switch, in_port, vec![FlowAction::Output(FLOOD_PORT)], data) {
            log::warn!("failed to emit packet-out on {switch}: {e}");
        }
    }
}
