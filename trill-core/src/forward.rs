//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::consts::TRILL_ETHERTYPE;
use crate::context::Context;
use crate::error::{fail, Error};
use crate::nickname::Nickname;
use crate::packet::Frame;
use crate::types::Vid;

/// Unicast next-hop resolution and hand-off (spec.md §4.5).
pub struct Forwarder<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> Forwarder<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Forwarder<'a> {
        Forwarder { ctx }
    }

    pub fn forward(&self, mut frame: Frame, egress: Nickname, vid: Vid) -> Result<(), Error> {
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();

        // 1. Resolve the egress neighbour.
        let neighbor = match self.ctx.state.neighbors().lookup(egress) {
            Some(n) => n,
            None => return Err(fail(counters, sites, Error::UnknownNeighbor(egress), true)),
        };

        // 2. Decrement hop count in place.
        let mut header = frame.trill_header()?;
        header.hop_count = header.hop_count.saturating_sub(1);
        frame.set_trill_header(&header);

        // 3. Rewrite outer addresses: our MAC, then the neighbour's SNPA.
        let own_mac = device.own_mac();
        frame.set_outer_header(neighbor.info().adj_snpa, own_mac, TRILL_ETHERTYPE);

        // 4. Consult the fdb for the inner destination; prefer a per-port
        // forward, fall back to TRILL flood.
        let inner_dst = inner_dst_mac(&frame, header.trh_size());

        match inner_dst.and_then(|mac| device.get(mac, vid).map(|entry| (mac, entry))) {
            Some((mac, entry)) => {
                device.update(entry.port, mac, vid);
                frame.set_outer_src(own_mac);
                device.forward(entry.port, frame);
            }
            None => device.trill_flood_forward(frame),
        }

        // 5. `neighbor`'s reference is released when this function returns.
        Ok(())
    }
}

fn inner_dst_mac(frame: &Frame, trh_size: usize) -> Option<trill_utils::mac_addr::MacAddr> {
    let offset = frame.trill_payload_offset(trh_size);
    let bytes = frame.as_bytes();
    if bytes.len() < offset + 6 {
        return None;
    }
    Some(trill_utils::mac_addr::MacAddr::from([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
        bytes[offset + 4],
        bytes[offset + 5],
    ]))
}
