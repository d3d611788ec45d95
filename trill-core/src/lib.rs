//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

//! RBridge data-plane core: per-bridge TRILL state, the nickname-indexed
//! neighbour database, ingress classification, encapsulation of frames
//! from local end stations, forwarding of transit TRILL frames by
//! nickname, multi-destination replication with reverse-path-forwarding
//! checks, and decapsulation of frames destined to the local RBridge.
//!
//! The bridge's FDB, VLAN ingress filtering, STP, and the control-plane
//! daemon that populates nicknames and neighbour topology are external
//! collaborators, reached through the trait family in [`bridge`].

pub mod bridge;
pub mod classify;
pub mod config;
pub mod consts;
pub mod context;
pub mod control;
pub mod decap;
pub mod encap;
pub mod error;
pub mod forward;
pub mod neighbor;
pub mod nickname;
pub mod packet;
pub mod replicate;
pub mod state;
pub mod types;

pub use classify::{receive, Disposition};
pub use config::CoreConfig;
pub use context::Context;
pub use nickname::Nickname;
pub use state::{Bridge, RbrState};
