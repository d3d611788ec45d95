//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::atomic::{AtomicU64, Ordering};

use trill_utils::mac_addr::MacAddr;

use crate::nickname::Nickname;
use crate::packet::Frame;
use crate::types::{FdbEntry, PortId, Vid, VniHandle};

#[cfg(any(test, feature = "testing"))]
pub mod fake;

/// MAC address forwarding database (spec.md §6 `bridge_fdb`). Owned and
/// maintained by the host bridge; the core only reads and posts learning
/// hints.
pub trait Fdb {
    fn get(&self, mac: MacAddr, vid: Vid) -> Option<FdbEntry>;
    fn update(&self, port: PortId, mac: MacAddr, vid: Vid);
    fn update_with_nick(&self, port: PortId, mac: MacAddr, vid: Vid, ingress_nick: Nickname);
}

/// Outbound delivery primitives (spec.md §6 `bridge_forward`).
pub trait BridgeForward {
    fn forward(&self, port: PortId, frame: Frame);
    fn deliver(&self, port: PortId, frame: Frame);
    fn endstation_deliver(&self, frame: Frame);
    fn trill_flood_forward(&self, frame: Frame);
    fn handle_frame_finish(&self, frame: Frame);
    fn allowed_ingress(&self, port: PortId, frame: &Frame) -> Option<Vid>;
}

/// Port-classification primitives (spec.md §6 `bridge_port`).
pub trait BridgePort {
    fn port_of(&self, frame: &Frame) -> Option<PortId>;
    fn is_local_guest_port(&self, port: PortId, mac: MacAddr, vid: Vid) -> bool;
    fn trill_flag(&self, port: PortId) -> bool;
    fn port_vni_id(&self, port: PortId) -> Option<u32>;
}

/// Spanning tree control (spec.md §6 `stp`). TRILL and STP are mutually
/// exclusive on a bridge (spec.md §3 invariant 1).
pub trait Stp {
    fn stop(&self);
}

/// Control-plane-maintained MAC-to-nickname mapping (spec.md §6
/// `nick_resolution`).
pub trait NickResolution {
    fn lookup_nick_from_mac(&self, port: PortId, mac: MacAddr, vid: Vid) -> Nickname;
}

/// Virtual-network tagging collaborator, supplied only when VNT is in use
/// (spec.md §6 `vni`).
pub trait Vni {
    fn find_vni(&self, vni_id: u32) -> Option<VniHandle>;
    fn vni_flood_deliver(&self, vni: VniHandle, frame: Frame, free_on_exhaustion: bool);
}

/// Per-bridge drop/error accounting (spec.md §7 policy: "bumps the
/// corresponding rx/tx-dropped counter").
#[derive(Debug, Default)]
pub struct Counters {
    pub rx_dropped: AtomicU64,
    pub tx_dropped: AtomicU64,
}

impl Counters {
    pub fn bump_rx_dropped(&self) {
        self.rx_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bump_tx_dropped(&self) {
        self.tx_dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// The full external-collaborator surface a host bridge implements to embed
/// this crate (spec.md §6). Bundles the narrow traits above plus the two
/// scalars (own MAC, statistics) `RbrState`'s back-reference grants.
pub trait BridgeDevice: Fdb + BridgeForward + BridgePort + Stp + NickResolution + Send + Sync {
    fn own_mac(&self) -> MacAddr;
    fn counters(&self) -> &Counters;
}
