//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

/// Opaque handle to a bridge port, meaningful only to the host bridge's
/// `BridgeDevice` implementation.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct PortId(pub u32);

/// 802.1Q VLAN id the frame was classified into.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Vid(pub u16);

/// Opaque handle to a virtual network, returned by `Vni::find_vni` and
/// passed back unchanged to `Vni::vni_flood_deliver`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VniHandle(pub u32);

/// An fdb hit: the port an inner destination MAC is reachable through, plus
/// the VNI that port is a member of (when VNT is in use).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FdbEntry {
    pub port: PortId,
    pub vni: Option<u32>,
}
