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

//! Demo harness: builds a small diamond topology with two backup pairs, runs
//! a handful of update ticks against an in-memory fake switch transport, and
//! prints every flow entry it would have installed. Stands in for a real
//! OpenFlow/WSGI driver, which is out of scope for this crate.

use clap::Parser;
use log::info;

use duskmesh::flow::{FlowAction, FlowEntry, SwitchTransport, TransportError};
use duskmesh::routing::RoutingStrategy;
use duskmesh::topology::{HostClient, HostServer, SwitchName};
use duskmesh::Controller;

/// Run the duskmesh disaster-aware planner against an in-memory demo topology.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Seconds between planning ticks.
    #[arg(long, default_value_t = 30)]
    update_interval_sec: u32,

    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 3)]
    ticks: u32,

    /// Use the plain Dijkstra baseline instead of the disaster-aware planner.
    #[arg(long)]
    dijkstra: bool,
}

/// Prints every flow it would install instead of talking to real hardware.
struct PrintingSwitches;

impl SwitchTransport for PrintingSwitches {
    fn install_flow(&mut self, switch: &SwitchName, entry: FlowEntry, buffer_id: Option<u32>) -> Result<(), TransportError> {
        println!("  install on {switch}: priority={} match={:?} actions={:?} buffer_id={buffer_id:?}", entry.priority, entry.matching, entry.actions);
        Ok(())
    }

    fn packet_out(&mut self, switch: &SwitchName, in_port: u32, actions: Vec<FlowAction>, data: Vec<u8>) -> Result<(), TransportError> {
        println!("  packet-out on {switch} in_port={in_port} actions={actions:?} ({} bytes)", data.len());
        Ok(())
    }
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let strategy = if args.dijkstra { RoutingStrategy::Dijkstra } else { RoutingStrategy::DisasterAware };
    let mut controller = Controller::new(strategy, args.update_interval_sec).expect("valid update interval");
    let mut transport = PrintingSwitches;

    for s in ["s1", "s2", "s3", "s4"] {
        controller.on_switch_features(&mut transport, s);
    }
    controller.add_link("s1", 1, "s2", 1, 100.0).unwrap();
    controller.add_link("s1", 2, "s3", 1, 1.0).unwrap();
    controller.add_link("s2", 2, "s4", 1, 10.0).unwrap();
    controller.add_link("s3", 2, "s4", 2, 100.0).unwrap();

    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h1c", "s4", 1000, 20.0),
            "10.0.0.1".parse().unwrap(),
            10,
            HostServer::new("h1s", "s1"),
            "10.0.0.2".parse().unwrap(),
            10,
        )
        .expect("valid host pair");
    controller
        .add_host_pair(
            &mut transport,
            HostClient::new("h2c", "s2", 500, 20.0),
            "10.0.1.1".parse().unwrap(),
            11,
            HostServer::new("h2s", "s3"),
            "10.0.1.2".parse().unwrap(),
            11,
        )
        .expect("valid host pair");

    info!("starting update loop with strategy {strategy:?}");
    controller.start_update_path(&mut transport);
    for i in 1..args.ticks {
        println!("-- tick {i} --");
        if !controller.tick(&mut transport) {
            info!("update loop stopped after {i} ticks");
            break;
        }
    }
}
