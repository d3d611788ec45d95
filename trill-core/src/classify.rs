//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::bridge::Vni;
use crate::config::CoreConfig;
use crate::consts::{BPDU_GROUP_ADDR, ETH_HLEN, TRILL_ETHERTYPE, TRILL_OPT_LEN};
use crate::context::Context;
use crate::decap::Decapsulator;
use crate::encap::Encapsulator;
use crate::error::{fail, Error, LoopKind, MalformedReason};
use crate::forward::Forwarder;
use crate::packet::header::{Header, TrillOpt, TrillVntExtension};
use crate::packet::Frame;
use crate::replicate::Replicator;
use crate::state::Bridge;
use crate::types::{PortId, Vid};

/// Outcome of a receive-entry-point invocation (spec.md §5). `Consumed`
/// covers both a successful hand-off and a drop; `Pass` returns the frame
/// to the caller's standard (non-TRILL) receive path.
pub enum Disposition {
    Consumed,
    Pass(Frame),
}

/// Receive entry point (spec.md §4.8). Looks up the bridge's current
/// `RbrState` and, if TRILL is enabled, builds a `Context` and delegates to
/// `IngressClassifier`.
pub fn receive(
    bridge: &Bridge,
    config: &CoreConfig,
    vni: Option<&dyn Vni>,
    port: PortId,
    frame: Frame,
    is_loopback: bool,
) -> Disposition {
    let state = match bridge.rbr_state() {
        Some(state) => state,
        None => return Disposition::Pass(frame),
    };
    if is_loopback {
        return Disposition::Pass(frame);
    }

    let ctx = match vni {
        Some(vni) => Context::new(&state, config).with_vni(vni),
        None => Context::new(&state, config),
    };
    IngressClassifier::new(&ctx).receive(port, frame)
}

pub struct IngressClassifier<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> IngressClassifier<'a> {
    pub fn new(ctx: &'a Context<'a>) -> IngressClassifier<'a> {
        IngressClassifier { ctx }
    }

    pub fn receive(&self, port: PortId, mut frame: Frame) -> Disposition {
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();

        // 3. Validate the inner source MAC (guest-frame pre-encapsulation
        // check; for fabric frames this reads the outer source, which is
        // validated again once the TRILL header is parsed).
        let src = match frame.outer_src() {
            Some(mac) if !mac.is_multicast() => mac,
            _ => {
                fail(counters, sites, Error::InvalidSourceMac, false);
                return Disposition::Consumed;
            }
        };

        // 4. VLAN ingress policy.
        let vid = match device.allowed_ingress(port, &frame) {
            Some(vid) => vid,
            None => {
                fail(counters, sites, Error::VlanIngressDenied, false);
                return Disposition::Consumed;
            }
        };

        let dst = frame.outer_dst();

        // 5. TRILL BPDUs are learned from but never forwarded.
        if dst == Some(BPDU_GROUP_ADDR) {
            device.update(port, src, vid);
            return Disposition::Consumed;
        }

        if device.trill_flag(port) {
            self.receive_guest(port, frame, src, dst, vid)
        } else {
            self.receive_fabric(port, frame, dst, vid)
        }
    }

    fn receive_guest(
        &self,
        port: PortId,
        frame: Frame,
        src: trill_utils::mac_addr::MacAddr,
        dst: Option<trill_utils::mac_addr::MacAddr>,
        vid: Vid,
    ) -> Disposition {
        let device = self.ctx.state.bridge_device();
        let counters = device.counters();
        let sites = self.ctx.state.error_sites();
        let dst = match dst {
            Some(dst) => dst,
            None => {
                fail(counters, sites, Error::InvalidSourceMac, false);
                return Disposition::Consumed;
            }
        };

        if device.is_local_guest_port(port, dst, vid) {
            device.update(port, src, vid);
            if let Some(entry) = device.get(dst, vid) {
                if let (Some(src_vni), Some(dst_vni)) =
                    (device.port_vni_id(port), entry.vni)
                {
                    if src_vni != dst_vni {
                        fail(counters, sites, Error::VniMismatch, false);
                        return Disposition::Consumed;
                    }
                }
                device.deliver(entry.port, frame);
            } else {
                device.endstation_deliver(frame);
            }
            return Disposition::Consumed;
        }

        let egress_nick = device.lookup_nick_from_mac(port, dst, vid);
        device.update(port, src, vid);
        let egress = if egress_nick.is_valid() {
            Some(egress_nick)
        } else {
            None
        };
        let _ = Encapsulator::new(self.ctx).encapsulate(frame, egress, port, vid);
        Disposition::Consumed
    }

    fn receive_fabric(
        &self,
        port: PortId,
        frame: Frame,
        dst: Option<trill_utils::mac_addr::MacAddr>,
        vid: Vid,
    ) -> Disposition {
        let device = self.ctx.state.bridge_device();

        match frame.outer_ethertype() {
            Some(TRILL_ETHERTYPE) => {
                let _ = receive_trill(self.ctx, port, frame, vid);
                Disposition::Consumed
            }
            _ if dst == Some(device.own_mac()) => {
                device.endstation_deliver(frame);
                Disposition::Consumed
            }
            _ => Disposition::Consumed,
        }
    }
}

/// TRILL receive path (spec.md §4.9): entered for a fabric-port frame whose
/// outer EtherType is the TRILL protocol value.
pub fn receive_trill(
    ctx: &Context<'_>,
    port: PortId,
    mut frame: Frame,
    vid: Vid,
) -> Result<(), Error> {
    let device = ctx.state.bridge_device();
    let counters = device.counters();
    let sites = ctx.state.error_sites();
    let neighbors = ctx.state.neighbors();

    // 1. Outer-MAC drop rule: load-bearing, see spec.md §9. Without it,
    // flooded TRILL frames circulate until hop-count exhaustion.
    if frame.outer_dst() != Some(device.own_mac()) {
        return Err(fail(counters, sites, Error::WrongAdjacency, false));
    }
    let outer_src = frame
        .outer_src()
        .ok_or_else(|| fail(counters, sites, Error::MalformedHeader(MalformedReason::ShortBuffer), false))?;

    // 2-3. Parse the header and ensure the full extension area is present.
    let header = frame.trill_header()?;
    let trh_size = header.trh_size();
    if frame.len() < ETH_HLEN + trh_size {
        return Err(fail(
            counters,
            sites,
            Error::MalformedHeader(MalformedReason::ShortBuffer),
            false,
        ));
    }

    // 4. The buffer now carries a fully-parsed TRILL header.
    frame.mark_encapsulated();

    // 5. Validate.
    if !header.egress.is_valid() || !header.ingress.is_valid() {
        let bad = if !header.egress.is_valid() {
            header.egress
        } else {
            header.ingress
        };
        return Err(fail(counters, sites, Error::InvalidNickname(bad), false));
    }
    header
        .validate_version()
        .map_err(|e| fail(counters, sites, e, false))?;
    let local_nick = ctx.state.local_nick();
    if header.ingress == local_nick {
        return Err(fail(
            counters,
            sites,
            Error::LoopDetected(LoopKind::SelfIngress),
            false,
        ));
    }

    let frame_vni = match header.opt_len {
        0 => None,
        n if ctx.vni.is_some() && n as usize * 4 == TRILL_OPT_LEN + TrillVntExtension::LEN => {
            let mut reader = frame.trill_extension_reader();
            let _opt = TrillOpt::decode(&mut reader)
                .map_err(|e| fail(counters, sites, e, false))?;
            let vnt = TrillVntExtension::decode(&mut reader)
                .map_err(|e| fail(counters, sites, e, false))?;
            Some(vnt.vni)
        }
        _ => {
            return Err(fail(
                counters,
                sites,
                Error::MalformedHeader(MalformedReason::UnexpectedOptLen),
                false,
            ))
        }
    };

    if header.multi_destination {
        receive_multi_destination(ctx, port, frame, header, outer_src, vid, frame_vni)
    } else {
        receive_unicast(ctx, port, frame, header, vid, frame_vni)
    }
}

fn receive_unicast(
    ctx: &Context<'_>,
    port: PortId,
    frame: Frame,
    header: Header,
    vid: Vid,
    frame_vni: Option<u32>,
) -> Result<(), Error> {
    let device = ctx.state.bridge_device();
    let counters = device.counters();
    let sites = ctx.state.error_sites();
    let local_nick = ctx.state.local_nick();

    if header.egress == header.ingress {
        return Err(fail(
            counters,
            sites,
            Error::LoopDetected(LoopKind::EgressEqualsIngress),
            false,
        ));
    }
    if header.egress == local_nick {
        return Decapsulator::new(ctx).decapsulate(
            port,
            frame,
            header.trh_size(),
            header.ingress,
            vid,
            frame_vni,
        );
    }
    if header.hop_count > 1 {
        if let Some(outer_src) = frame.outer_src() {
            device.update(port, outer_src, vid);
        }
        return Forwarder::new(ctx).forward(frame, header.egress, vid);
    }
    Err(fail(counters, sites, Error::HopCountExhausted, false))
}

#[allow(clippy::too_many_arguments)]
fn receive_multi_destination(
    ctx: &Context<'_>,
    port: PortId,
    frame: Frame,
    header: Header,
    outer_src: trill_utils::mac_addr::MacAddr,
    vid: Vid,
    frame_vni: Option<u32>,
) -> Result<(), Error> {
    let device = ctx.state.bridge_device();
    let counters = device.counters();
    let sites = ctx.state.error_sites();
    let neighbors = ctx.state.neighbors();

    let dest = match neighbors.lookup(header.egress) {
        Some(dest) => dest,
        None => return Err(fail(counters, sites, Error::UnknownNeighbor(header.egress), false)),
    };

    let adjacency_ok = dest.info().adjacencies.iter().any(|&a| {
        neighbors
            .lookup(a)
            .is_some_and(|node| node.info().adj_snpa == outer_src)
    });
    if !adjacency_ok {
        return Err(fail(counters, sites, Error::WrongAdjacency, false));
    }

    let rpf_ok = match neighbors.lookup(header.ingress) {
        Some(ingress_node) if !ingress_node.info().dt_roots.is_empty() => {
            ingress_node.info().dt_roots.contains(&header.egress)
        }
        _ => header.egress == ctx.state.tree_root(),
    };
    if !rpf_ok {
        return Err(fail(counters, sites, Error::FailedRpf, false));
    }

    if header.hop_count == 0 {
        return Err(fail(counters, sites, Error::HopCountExhausted, false));
    }

    let clone = frame.deep_clone();
    let _ = Replicator::new(ctx).replicate(
        clone,
        header.egress,
        header.ingress,
        Some(outer_src),
        vid,
        false,
    );
    Decapsulator::new(ctx).decapsulate(port, frame, header.trh_size(), header.ingress, vid, frame_vni)
}
