//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::BytesMut;

use crate::consts::TRILL_ETHERTYPE;
use crate::context::Context;
use crate::error::{fail, Error};
use crate::forward::Forwarder;
use crate::nickname::Nickname;
use crate::packet::header::{Header, TrillOpt, TrillVntExtension};
use crate::packet::Frame;
use crate::replicate::Replicator;
use crate::types::{PortId, Vid};

/// Pushes the TRILL and outer Ethernet headers onto an end-station frame
/// and dispatches it to unicast forward or multi-destination replication
/// (spec.md §4.4).
pub struct Encapsulator<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> Encapsulator<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Encapsulator<'a> {
        Encapsulator { ctx }
    }

    pub fn encapsulate(
        &self,
        frame: Frame,
        egress: Option<Nickname>,
        ingress_port: PortId,
        vid: Vid,
    ) -> Result<(), Error> {
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();
        let local_nick = self.ctx.state.local_nick();

        // 1. The bridge must have a nickname assigned.
        if !local_nick.is_valid() {
            return Err(fail(counters, sites, Error::NotEnabled, true));
        }

        match egress {
            None => self.encapsulate_multi_destination(frame, local_nick, ingress_port, vid),
            Some(egress) => {
                if !egress.is_valid() {
                    return Err(fail(counters, sites, Error::InvalidNickname(egress), true));
                }
                let mut frame = frame;
                self.push_headers(&mut frame, local_nick, egress, false, ingress_port);
                Forwarder::new(self.ctx).forward(frame, egress, vid)
            }
        }
    }

    fn encapsulate_multi_destination(
        &self,
        frame: Frame,
        local_nick: Nickname,
        ingress_port: PortId,
        vid: Vid,
    ) -> Result<(), Error> {
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();
        let neighbors = self.ctx.state.neighbors();

        let root = match neighbors.lookup(local_nick) {
            Some(local_node) if !local_node.info().dt_roots.is_empty() => {
                local_node.info().dt_roots[0]
            }
            _ => self.ctx.state.tree_root(),
        };
        if !root.is_valid() {
            return Err(fail(counters, sites, Error::InvalidNickname(root), true));
        }

        // Clone for local delivery before the original is encapsulated.
        let local_copy = frame.deep_clone();
        self.deliver_locally(local_copy, ingress_port, vid);

        let mut frame = frame;
        self.push_headers(&mut frame, local_nick, root, true, ingress_port);
        Replicator::new(self.ctx).replicate(frame, root, local_nick, None, vid, true)
    }

    fn deliver_locally(&self, frame: Frame, ingress_port: PortId, _vid: Vid) {
        let device = self.ctx.state.bridge_device();
        match (self.ctx.vni, device.port_vni_id(ingress_port)) {
            (Some(vni_collab), Some(vni_id)) => match vni_collab.find_vni(vni_id) {
                Some(handle) => vni_collab.vni_flood_deliver(handle, frame, false),
                None => device.endstation_deliver(frame),
            },
            _ => device.endstation_deliver(frame),
        }
    }

    fn push_headers(
        &self,
        frame: &mut Frame,
        local_nick: Nickname,
        egress: Nickname,
        multi_destination: bool,
        ingress_port: PortId,
    ) {
        let device = self.ctx.state.bridge_device();
        let vni_id = device.port_vni_id(ingress_port);
        let opt_len = match vni_id {
            Some(_) if self.ctx.vni.is_some() => 3,
            _ => 0,
        };

        if let Some(vni_id) = vni_id.filter(|_| self.ctx.vni.is_some()) {
            let mut ext = BytesMut::new();
            TrillVntExtension { vni: vni_id }.encode(&mut ext);
            frame.push_front(&ext);
            let mut opt = BytesMut::new();
            TrillOpt {
                opt_flag: 0,
                opt_flow: 0,
            }
            .encode(&mut opt);
            frame.push_front(&opt);
        }

        let header = Header {
            version: crate::consts::TRILL_VERSION,
            multi_destination,
            opt_len,
            hop_count: self.ctx.config.initial_hop_count,
            egress,
            ingress: local_nick,
        };
        let mut encoded = BytesMut::new();
        header.encode(&mut encoded);
        frame.push_front(&encoded);

        frame.push_eth_header(TRILL_ETHERTYPE);
        frame.mark_encapsulated();
    }
}
