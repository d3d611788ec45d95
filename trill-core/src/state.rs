//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;

use crate::bridge::BridgeDevice;
use crate::control::ControlError;
use crate::error::ErrorSites;
use crate::neighbor::NeighborTable;
use crate::nickname::Nickname;

/// Per-bridge TRILL state (spec.md §3). Created on `Bridge::enable`,
/// destroyed on `Bridge::disable`. `local_nick` and `tree_root` are read by
/// the data plane without locks (spec.md §5): a writer updates them under
/// the owning `Bridge`'s mutex, a reader loads with `Ordering::Relaxed` and
/// accepts a stale read as "not yet configured".
pub struct RbrState {
    local_nick: AtomicU16,
    tree_root: AtomicU16,
    neighbors: NeighborTable,
    bridge_device: Arc<dyn BridgeDevice>,
    error_sites: ErrorSites,
}

impl RbrState {
    fn new(bridge_device: Arc<dyn BridgeDevice>) -> RbrState {
        RbrState {
            local_nick: AtomicU16::new(Nickname::NONE.value()),
            tree_root: AtomicU16::new(Nickname::NONE.value()),
            neighbors: NeighborTable::new(),
            bridge_device,
            error_sites: ErrorSites::default(),
        }
    }

    pub fn local_nick(&self) -> Nickname {
        Nickname::new(self.local_nick.load(Ordering::Relaxed))
    }

    pub fn set_local_nick(&self, nick: Nickname) {
        self.local_nick.store(nick.value(), Ordering::Release);
    }

    pub fn tree_root(&self) -> Nickname {
        Nickname::new(self.tree_root.load(Ordering::Relaxed))
    }

    /// Fails with `NotFound` if `!nick.is_valid()`; a no-op store when the
    /// root is unchanged (spec.md §4.2, idempotence tested in §8).
    pub fn set_tree_root(&self, nick: Nickname) -> Result<(), ControlError> {
        if !nick.is_valid() {
            return Err(ControlError::NotFound);
        }
        self.tree_root.store(nick.value(), Ordering::Release);
        Ok(())
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn bridge_device(&self) -> &Arc<dyn BridgeDevice> {
        &self.bridge_device
    }

    pub fn error_sites(&self) -> &ErrorSites {
        &self.error_sites
    }
}

/// Host bridge: owns the `RbrState` attach point and the external-device
/// handle. "Enabled" is represented structurally — the `ArcSwapOption` slot
/// is `Some` — rather than by a separate boolean (spec.md §3 `enabled`
/// field realized via slot occupancy).
pub struct Bridge {
    device: Arc<dyn BridgeDevice>,
    state: ArcSwapOption<RbrState>,
    // Stands in for "the bridge's spin lock" (spec.md §5): held only around
    // slot swaps and neighbor-table writes, never around packet handling.
    lock: Mutex<()>,
}

impl Bridge {
    pub fn new(device: Arc<dyn BridgeDevice>) -> Bridge {
        Bridge {
            device,
            state: ArcSwapOption::empty(),
            lock: Mutex::new(()),
        }
    }

    pub fn device(&self) -> &Arc<dyn BridgeDevice> {
        &self.device
    }

    /// Single lock-free read primitive every data-plane entry point uses.
    /// `None` is exactly "TRILL disabled" (spec.md §4.8 step 1).
    pub fn rbr_state(&self) -> Option<Arc<RbrState>> {
        self.state.load_full()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.load().is_some()
    }

    /// Stops STP, allocates fresh `RbrState`, and attaches it under the
    /// bridge lock. A bridge that's already enabled is left unchanged
    /// (spec.md §4.2 doesn't define re-enabling; treated as a no-op).
    pub fn enable(&self) {
        let _guard = self.lock.lock().unwrap();
        if self.state.load().is_some() {
            return;
        }
        self.device.stop();
        let fresh = Arc::new(RbrState::new(self.device.clone()));
        self.state.store(Some(fresh));
    }

    /// Detaches `RbrState` under the bridge lock, then evicts every
    /// neighbour before the state is dropped (spec.md §3 invariant 4,
    /// §4.2). Readers that captured a neighbour handle before eviction keep
    /// it valid until they release it (spec.md §5).
    pub fn disable(&self) {
        let _guard = self.lock.lock().unwrap();
        let detached = self.state.swap(None);
        if let Some(state) = detached {
            state.neighbors().evict_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::fake::FakeBridge;
    use trill_utils::mac_addr::MacAddr;

    fn bridge() -> Bridge {
        Bridge::new(Arc::new(FakeBridge::new(MacAddr::from([1, 2, 3, 4, 5, 6]))))
    }

    #[test]
    fn disabled_bridge_has_no_state() {
        let bridge = bridge();
        assert!(bridge.rbr_state().is_none());
    }

    #[test]
    fn enable_disable_cycle_starts_fresh_each_time() {
        let bridge = bridge();
        bridge.enable();
        assert!(bridge.rbr_state().is_some());
        assert_eq!(bridge.rbr_state().unwrap().local_nick(), Nickname::NONE);

        bridge.disable();
        assert!(bridge.rbr_state().is_none());
    }

    #[test]
    fn disable_evicts_every_neighbor() {
        let bridge = bridge();
        bridge.enable();
        let state = bridge.rbr_state().unwrap();
        state.neighbors().install(
            Nickname::new(1),
            crate::neighbor::RbrNode::new(crate::neighbor::NeighborInfo::new(MacAddr::ZERO)),
        );
        assert!(state.neighbors().lookup(Nickname::new(1)).is_some());

        bridge.disable();
        // The handle we still hold stays valid even though the table slot
        // was cleared (spec.md §3 invariant 3).
        assert!(state.neighbors().lookup(Nickname::new(1)).is_none());
    }

    #[test]
    fn set_tree_root_rejects_invalid_and_is_idempotent() {
        let bridge = bridge();
        bridge.enable();
        let state = bridge.rbr_state().unwrap();

        assert_eq!(state.set_tree_root(Nickname::NONE), Err(ControlError::NotFound));

        assert!(state.set_tree_root(Nickname::new(5)).is_ok());
        assert_eq!(state.tree_root(), Nickname::new(5));
        assert!(state.set_tree_root(Nickname::new(5)).is_ok());
        assert_eq!(state.tree_root(), Nickname::new(5));
    }
}
