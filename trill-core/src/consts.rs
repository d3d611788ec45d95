//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use trill_utils::mac_addr::MacAddr;

/// EtherType carried by the outer Ethernet header of a TRILL frame.
pub const TRILL_ETHERTYPE: u16 = 0x22f3;

/// Group MAC address used by TRILL BPDUs; frames addressed to it are
/// learned from but never forwarded through the TRILL encapsulation path.
pub const BPDU_GROUP_ADDR: MacAddr = MacAddr::from_const([0x01, 0x80, 0xc2, 0x00, 0x00, 0x00]);

/// Fixed TRILL protocol version carried in every header.
pub const TRILL_VERSION: u8 = 0;

/// Default hop count written into a freshly encapsulated frame.
pub const DEFAULT_HOP_COUNT: u8 = 63;

/// Size in octets of the base TRILL shim header (flags word + egress +
/// ingress nicknames).
pub const TRILL_HDR_LEN: usize = 6;

/// Size in octets of one `opt_len` unit.
pub const OPT_LEN_UNIT: usize = 4;

/// Size in octets of the `TrillOpt` extension (`opt_flag` + `opt_flow`).
pub const TRILL_OPT_LEN: usize = 8;

/// Size in octets of the VNT extension.
pub const VNT_EXT_LEN: usize = 4;

/// Ethernet header length (dst + src + ethertype), untagged.
pub const ETH_HLEN: usize = 14;
