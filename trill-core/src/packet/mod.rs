//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod frame;
pub mod header;

pub use frame::Frame;
pub use header::{Header, TrillOpt, TrillVntExtension};
