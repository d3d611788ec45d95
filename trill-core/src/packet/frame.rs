//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::{Buf, Bytes, BytesMut};
use trill_utils::bytes::BytesMutExt;
use trill_utils::mac_addr::MacAddr;

use crate::consts::{ETH_HLEN, TRILL_HDR_LEN};
use crate::error::{Error, MalformedReason};
use crate::packet::header::Header;

/// A borrowed packet buffer, owned for the duration of one handler
/// invocation (spec.md §5). Wraps `BytesMut` the way the teacher wraps wire
/// buffers for its PDU codecs, adding a `push_front` a raw `BytesMut` cannot
/// do in place (there is no kernel skb headroom to reserve into — see
/// `push_front`).
#[derive(Clone, Debug)]
pub struct Frame {
    buf: BytesMut,
    // Set once a TRILL header has been pushed (encap) or while one is still
    // present and parsed (in-flight on the receive path). Mirrors the
    // source's "packet is currently TRILL-encapsulated" bit.
    encapsulated: bool,
}

impl Frame {
    pub fn new(buf: BytesMut) -> Frame {
        Frame {
            buf,
            encapsulated: false,
        }
    }

    pub fn from_bytes(bytes: Bytes) -> Frame {
        Frame::new(BytesMut::from(&bytes[..]))
    }

    pub fn is_encapsulated(&self) -> bool {
        self.encapsulated
    }

    pub fn mark_encapsulated(&mut self) {
        self.encapsulated = true;
    }

    pub fn clear_encapsulated(&mut self) {
        self.encapsulated = false;
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn into_bytes_mut(self) -> BytesMut {
        self.buf
    }

    /// A `bytes::Buf` cursor over the whole frame, positioned at the start,
    /// for the header codec to parse from without mutating the frame.
    pub fn reader(&self) -> Bytes {
        self.buf.clone().freeze()
    }

    /// Prepends `header` to the buffer. `bytes::BytesMut` has no in-place
    /// headroom reservation (unlike a Linux skb's `skb_push`); see
    /// `trill_utils::bytes::BytesMutExt::push_front`.
    pub fn push_front(&mut self, header: &[u8]) {
        self.buf.push_front(header);
    }

    /// Strips `n` octets from the front (decapsulation / header parse
    /// advance). Panics if `n > self.len()`, matching `Buf::advance`.
    pub fn advance_front(&mut self, n: usize) {
        self.buf.advance(n);
    }

    /// A true deep copy: multi-destination replication rewrites outer
    /// addresses per hop, so every replicated copy must own independent
    /// storage rather than share a buffer (spec.md §4.6, §9).
    pub fn deep_clone(&self) -> Frame {
        Frame {
            buf: BytesMut::from(&self.buf[..]),
            encapsulated: self.encapsulated,
        }
    }

    fn require_eth_header(&self) -> Result<(), ()> {
        if self.buf.len() < ETH_HLEN {
            Err(())
        } else {
            Ok(())
        }
    }

    pub fn outer_dst(&self) -> Option<MacAddr> {
        self.require_eth_header().ok()?;
        Some(MacAddr::from([
            self.buf[0],
            self.buf[1],
            self.buf[2],
            self.buf[3],
            self.buf[4],
            self.buf[5],
        ]))
    }

    pub fn outer_src(&self) -> Option<MacAddr> {
        self.require_eth_header().ok()?;
        Some(MacAddr::from([
            self.buf[6],
            self.buf[7],
            self.buf[8],
            self.buf[9],
            self.buf[10],
            self.buf[11],
        ]))
    }

    pub fn outer_ethertype(&self) -> Option<u16> {
        self.require_eth_header().ok()?;
        Some(u16::from_be_bytes([self.buf[12], self.buf[13]]))
    }

    pub fn set_outer_dst(&mut self, mac: MacAddr) {
        self.buf[0..6].copy_from_slice(&mac.as_bytes());
    }

    pub fn set_outer_src(&mut self, mac: MacAddr) {
        self.buf[6..12].copy_from_slice(&mac.as_bytes());
    }

    pub fn set_outer_ethertype(&mut self, ethertype: u16) {
        self.buf[12..14].copy_from_slice(&ethertype.to_be_bytes());
    }

    pub fn set_outer_header(&mut self, dst: MacAddr, src: MacAddr, ethertype: u16) {
        self.set_outer_dst(dst);
        self.set_outer_src(src);
        self.set_outer_ethertype(ethertype);
    }

    /// Appends a freshly built outer Ethernet header in front of the
    /// current contents; used by the Encapsulator before the TRILL header
    /// is pushed. Addresses are placeholders, rewritten per hop by the
    /// Forwarder.
    pub fn push_eth_header(&mut self, ethertype: u16) {
        let mut header = [0u8; ETH_HLEN];
        header[12..14].copy_from_slice(&ethertype.to_be_bytes());
        self.push_front(&header);
    }

    /// Decodes the TRILL shim header immediately following the outer
    /// Ethernet header. Assumes the outer header is already present (true
    /// for every caller: Forwarder/Replicator act on already-encapsulated
    /// frames, and the receive path parses the header before these helpers
    /// are used).
    pub fn trill_header(&self) -> Result<Header, Error> {
        if self.buf.len() < ETH_HLEN + TRILL_HDR_LEN {
            return Err(Error::MalformedHeader(MalformedReason::ShortBuffer));
        }
        let mut reader = Bytes::copy_from_slice(&self.buf[ETH_HLEN..]);
        Header::decode(&mut reader)
    }

    /// Overwrites the TRILL shim header in place with `header`'s encoding.
    pub fn set_trill_header(&mut self, header: &Header) {
        let mut encoded = BytesMut::new();
        header.encode(&mut encoded);
        self.buf[ETH_HLEN..ETH_HLEN + TRILL_HDR_LEN].copy_from_slice(&encoded);
    }

    /// Offset of the first byte past the TRILL header and its extensions,
    /// i.e. where the inner (or next-extension) content begins.
    pub fn trill_payload_offset(&self, trh_size: usize) -> usize {
        ETH_HLEN + trh_size
    }

    /// A cursor over the extension area, positioned right after the base
    /// 6-octet TRILL header.
    pub fn trill_extension_reader(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf[ETH_HLEN + TRILL_HDR_LEN..])
    }
}
