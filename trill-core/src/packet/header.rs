//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::consts::{OPT_LEN_UNIT, TRILL_HDR_LEN, TRILL_OPT_LEN, TRILL_VERSION, VNT_EXT_LEN};
use crate::error::{Error, MalformedReason};
use crate::nickname::Nickname;

const VNT_EXTENSION_TYPE: u16 = 0x4000;
const VNT_EXTENSION_TYPE_MASK: u16 = 0xc000;

/// The base TRILL shim header (spec.md §4.3): a 16-bit flags word followed
/// by the egress and ingress nicknames.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    pub version: u8,
    pub multi_destination: bool,
    pub opt_len: u8,
    pub hop_count: u8,
    pub egress: Nickname,
    pub ingress: Nickname,
}

impl Header {
    /// Number of 4-octet units in the optional extension area.
    pub fn trh_size(&self) -> usize {
        TRILL_HDR_LEN + self.opt_len as usize * OPT_LEN_UNIT
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        let flags = pack_flags(
            self.version,
            self.multi_destination,
            self.opt_len,
            self.hop_count,
        );
        buf.put_u16(flags);
        buf.put_u16(self.egress.value());
        buf.put_u16(self.ingress.value());
    }

    pub fn decode(buf: &mut Bytes) -> Result<Header, Error> {
        if buf.remaining() < TRILL_HDR_LEN {
            return Err(Error::MalformedHeader(MalformedReason::ShortBuffer));
        }
        let flags = buf.get_u16();
        let (version, multi_destination, opt_len, hop_count) = unpack_flags(flags);
        let egress = Nickname::new(buf.get_u16());
        let ingress = Nickname::new(buf.get_u16());
        Ok(Header {
            version,
            multi_destination,
            opt_len,
            hop_count,
            egress,
            ingress,
        })
    }

    pub fn validate_version(&self) -> Result<(), Error> {
        if self.version != TRILL_VERSION {
            Err(Error::MalformedHeader(MalformedReason::VersionMismatch))
        } else {
            Ok(())
        }
    }
}

// flags word layout: version(2) reserved(2) multi_destination(1) opt_len(5)
// hop_count(6), most-significant bit first.
fn pack_flags(version: u8, multi_destination: bool, opt_len: u8, hop_count: u8) -> u16 {
    let mut flags: u16 = 0;
    flags |= (version as u16 & 0b11) << 14;
    flags |= (multi_destination as u16) << 11;
    flags |= (opt_len as u16 & 0b1_1111) << 6;
    flags |= hop_count as u16 & 0b11_1111;
    flags
}

fn unpack_flags(flags: u16) -> (u8, bool, u8, u8) {
    let version = ((flags >> 14) & 0b11) as u8;
    let multi_destination = (flags >> 11) & 0b1 != 0;
    let opt_len = ((flags >> 6) & 0b1_1111) as u8;
    let hop_count = (flags & 0b11_1111) as u8;
    (version, multi_destination, opt_len, hop_count)
}

/// The fixed 8-octet option header present whenever `opt_len > 0`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrillOpt {
    pub opt_flag: u32,
    pub opt_flow: u32,
}

impl TrillOpt {
    pub const LEN: usize = TRILL_OPT_LEN;

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.opt_flag);
        buf.put_u32(self.opt_flow);
    }

    pub fn decode(buf: &mut Bytes) -> Result<TrillOpt, Error> {
        if buf.remaining() < Self::LEN {
            return Err(Error::MalformedHeader(MalformedReason::ShortBuffer));
        }
        Ok(TrillOpt {
            opt_flag: buf.get_u32(),
            opt_flow: buf.get_u32(),
        })
    }
}

/// The optional VNT (virtual-network tagging) extension: a 4-octet
/// `{flags16, reserved16}` pair with the 24-bit VNI split across the low 14
/// bits of `flags` and the high 10 bits of `reserved` (spec.md §4.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrillVntExtension {
    pub vni: u32,
}

const VNI_HI_BITS: u32 = 14;
const VNI_LO_MASK: u32 = (1 << VNI_HI_BITS) - 1;

impl TrillVntExtension {
    pub const LEN: usize = VNT_EXT_LEN;

    pub fn encode(&self, buf: &mut BytesMut) {
        let vni = self.vni & 0x00ff_ffff;
        let vni_hi = (vni >> 10) & VNI_LO_MASK;
        let vni_lo = vni & 0x3ff;
        let flags = VNT_EXTENSION_TYPE | vni_hi as u16;
        let reserved = (vni_lo as u16) << 6;
        buf.put_u16(flags);
        buf.put_u16(reserved);
    }

    pub fn decode(buf: &mut Bytes) -> Result<TrillVntExtension, Error> {
        if buf.remaining() < Self::LEN {
            return Err(Error::MalformedHeader(MalformedReason::ShortBuffer));
        }
        let flags = buf.get_u16();
        // Open question (spec.md §9) resolved per the intended semantics:
        // compare the extension-type accessor's result, not a boolean.
        if flags & VNT_EXTENSION_TYPE_MASK != VNT_EXTENSION_TYPE {
            return Err(Error::MalformedHeader(MalformedReason::UnknownExtensionType));
        }
        let reserved = buf.get_u16();
        let vni_hi = (flags & VNI_LO_MASK as u16) as u32;
        let vni_lo = (reserved >> 6) as u32 & 0x3ff;
        let vni = (vni_hi << 10) | vni_lo;
        Ok(TrillVntExtension { vni })
    }
}
