//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::BytesMut;

// Extension methods for `BytesMut`.
pub trait BytesMutExt {
    /// Prepends `header` to the front of `self`, shifting existing content
    /// back. Used to push outer protocol headers onto a frame in the same
    /// spirit as an in-place `skb_push`.
    fn push_front(&mut self, header: &[u8]);
}

impl BytesMutExt for BytesMut {
    fn push_front(&mut self, header: &[u8]) {
        let mut new_buf = BytesMut::with_capacity(header.len() + self.len());
        new_buf.extend_from_slice(header);
        new_buf.unsplit(std::mem::take(self));
        *self = new_buf;
    }
}
