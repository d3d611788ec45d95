//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::context::Context;
use crate::error::{fail, Error};
use crate::nickname::Nickname;
use crate::packet::Frame;
use crate::types::{PortId, Vid};

/// Strips TRILL and outer Ethernet headers and delivers the recovered
/// inner frame locally (spec.md §4.7).
pub struct Decapsulator<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> Decapsulator<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Decapsulator<'a> {
        Decapsulator { ctx }
    }

    /// `frame_vni` is the VNI carried by the frame's (about to be stripped)
    /// VNT extension, if any — the caller extracts it before calling in.
    pub fn decapsulate(
        &self,
        port: PortId,
        mut frame: Frame,
        trh_size: usize,
        ingress_nick: Nickname,
        vid: Vid,
        frame_vni: Option<u32>,
    ) -> Result<(), Error> {
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();

        // 1-2. Strip TRILL + extensions and the outer Ethernet header; the
        // inner Ethernet frame becomes the current packet.
        let strip_len = frame.trill_payload_offset(trh_size);
        frame.advance_front(strip_len);
        frame.clear_encapsulated();

        let inner_src = frame.outer_src();
        let inner_dst = frame.outer_dst();
        let (inner_src, inner_dst) = match (inner_src, inner_dst) {
            (Some(s), Some(d)) => (s, d),
            _ => {
                return Err(fail(
                    counters,
                    sites,
                    Error::MalformedHeader(crate::error::MalformedReason::ShortBuffer),
                    false,
                ))
            }
        };

        // 3. Learning hint.
        device.update_with_nick(port, inner_src, vid, ingress_nick);

        // 4. Local delivery.
        match device.get(inner_dst, vid) {
            Some(entry) => {
                if let (Some(vni), Some(frame_vni)) = (entry.vni, frame_vni) {
                    if vni != frame_vni {
                        return Err(fail(counters, sites, Error::VniMismatch, false));
                    }
                }
                device.deliver(entry.port, frame);
            }
            None => match (self.ctx.vni, frame_vni) {
                (Some(vni_collab), Some(vni_id)) => match vni_collab.find_vni(vni_id) {
                    Some(handle) => vni_collab.vni_flood_deliver(handle, frame, true),
                    None => device.endstation_deliver(frame),
                },
                _ => device.endstation_deliver(frame),
            },
        }

        Ok(())
    }
}
