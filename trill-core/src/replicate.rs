//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use trill_utils::mac_addr::MacAddr;

use crate::context::Context;
use crate::error::{fail, Error};
use crate::forward::Forwarder;
use crate::nickname::Nickname;
use crate::packet::Frame;
use crate::types::Vid;

/// Distribution-tree replication for multi-destination frames, with
/// source-pruning and the "defer the first adjacency" one-copy-avoidance
/// optimisation (spec.md §4.6).
pub struct Replicator<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> Replicator<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Replicator<'a> {
        Replicator { ctx }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn replicate(
        &self,
        frame: Frame,
        egress: Nickname,
        ingress: Nickname,
        source_outer_mac: Option<MacAddr>,
        vid: Vid,
        free_on_exhaustion: bool,
    ) -> Result<(), Error> {
        let neighbors = self.ctx.state.neighbors();
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();
        let forwarder = Forwarder::new(self.ctx);

        let root = match neighbors.lookup(egress) {
            Some(n) => n,
            None => return Err(fail(counters, sites, Error::UnknownNeighbor(egress), true)),
        };

        let mut deferred: Option<Nickname> = None;

        for &adjacency in &root.info().adjacencies {
            if !adjacency.is_valid() || adjacency == ingress {
                continue;
            }
            let adj_node = match neighbors.lookup(adjacency) {
                Some(n) => n,
                None => continue,
            };
            if source_outer_mac == Some(adj_node.info().adj_snpa) {
                continue;
            }

            match deferred {
                None => deferred = Some(adjacency),
                Some(_) => {
                    let clone = frame.deep_clone();
                    // Forwarding errors (e.g. the adjacency having since been
                    // evicted) are already logged and counted by Forwarder.
                    let _ = forwarder.forward(clone, adjacency, vid);
                }
            }
        }

        match deferred {
            Some(nick) => forwarder.forward(frame, nick, vid),
            None => {
                if free_on_exhaustion {
                    Err(fail(counters, sites, Error::UnknownNeighbor(egress), true))
                } else {
                    Ok(())
                }
            }
        }
    }
}
