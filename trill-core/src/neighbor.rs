//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use trill_utils::mac_addr::MacAddr;

use crate::nickname::Nickname;

/// Control-plane-supplied descriptor for one remote RBridge (spec.md §3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NeighborInfo {
    /// Outer-Ethernet MAC of the directly adjacent RBridge.
    pub adj_snpa: MacAddr,
    /// Nicknames reachable through this node when used as a distribution
    /// tree root.
    pub adjacencies: Vec<Nickname>,
    /// Distribution-tree root nicknames this node advertises as using.
    pub dt_roots: Vec<Nickname>,
}

impl NeighborInfo {
    pub fn new(adj_snpa: MacAddr) -> NeighborInfo {
        NeighborInfo {
            adj_snpa,
            adjacencies: Vec::new(),
            dt_roots: Vec::new(),
        }
    }
}

/// A reference-counted neighbor record. The `Arc` itself is the spec's
/// refcount: a lookup hands out a clone of the `Arc`, and dropping it is the
/// "release" the spec calls for.
#[derive(Debug, Eq, PartialEq)]
pub struct RbrNode(pub NeighborInfo);

impl RbrNode {
    pub fn new(info: NeighborInfo) -> Arc<RbrNode> {
        Arc::new(RbrNode(info))
    }

    pub fn info(&self) -> &NeighborInfo {
        &self.0
    }
}

/// Fixed-size mapping from the full 16-bit nickname space to an optional
/// neighbor record. Indices `0` (`Nickname::NONE`) and `0xffff`
/// (`Nickname::RESERVED`) are permanently empty (spec.md §3 invariant 2).
///
/// Lookup is wait-free: `ArcSwapOption::load_full` is an atomic acquire-load
/// that hands back an owned `Arc`, so a reader never blocks a concurrent
/// writer and vice versa. Writers serialize externally, under the owning
/// bridge's lock (spec.md §4.1).
#[derive(Debug)]
pub struct NeighborTable {
    slots: Box<[ArcSwapOption<RbrNode>]>,
}

impl NeighborTable {
    pub fn new() -> NeighborTable {
        let mut slots = Vec::with_capacity(1 << 16);
        slots.resize_with(1 << 16, ArcSwapOption::empty);
        NeighborTable {
            slots: slots.into_boxed_slice(),
        }
    }

    /// Returns `None` if `nick` is not a valid nickname or the slot is
    /// empty; otherwise an owned handle whose `Drop` releases one reference.
    pub fn lookup(&self, nick: Nickname) -> Option<Arc<RbrNode>> {
        if !nick.is_valid() {
            return None;
        }
        self.slots[nick.value() as usize].load_full()
    }

    /// Requires `nick.is_valid()`. Replaces the slot, releasing the prior
    /// occupant's table-held reference.
    pub fn install(&self, nick: Nickname, node: Arc<RbrNode>) {
        debug_assert!(nick.is_valid());
        if !nick.is_valid() {
            return;
        }
        self.slots[nick.value() as usize].store(Some(node));
    }

    /// Requires `nick.is_valid()`. Clears the slot and releases the
    /// table-held reference.
    pub fn evict(&self, nick: Nickname) {
        debug_assert!(nick.is_valid());
        if !nick.is_valid() {
            return;
        }
        self.slots[nick.value() as usize].store(None);
    }

    /// Evicts every non-empty slot in the valid nickname range.
    pub fn evict_all(&self) {
        for nick in 1..0xffffu32 {
            let slot = &self.slots[nick as usize];
            if slot.load().is_some() {
                slot.store(None);
            }
        }
    }
}

impl Default for NeighborTable {
    fn default() -> NeighborTable {
        NeighborTable::new()
    }
}
