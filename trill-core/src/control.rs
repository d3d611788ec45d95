//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

//! Control-plane surface (spec.md §6): enable/disable TRILL, set the local
//! and tree-root nicknames, and install/evict neighbours. Exposed as a
//! plain synchronous API rather than a YANG/gRPC management plane — see
//! SPEC_FULL.md's note on why the teacher's northbound stack has no
//! counterpart here.

use crate::neighbor::{NeighborInfo, RbrNode};
use crate::nickname::Nickname;
use crate::state::RbrState;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlError {
    /// The supplied nickname is `NICK_NONE`, the reserved sentinel, or (for
    /// eviction) not currently installed.
    NotFound,
    /// Allocation of a new `RbrNode` failed. The standard allocator aborts
    /// the process on allocation failure rather than returning an error, so
    /// this variant exists for API parity with spec.md §6 and is otherwise
    /// unreachable on this platform.
    NoMemory,
}

impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::NotFound => write!(f, "not found"),
            ControlError::NoMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for ControlError {}

/// Sets the RBridge's own nickname. Spec.md doesn't further constrain this
/// beyond `valid()`, matching the relaxed validation `holo_isis`'s
/// northbound configuration applies to simple scalar leaves.
pub fn set_local_nick(state: &RbrState, nick: Nickname) -> Result<(), ControlError> {
    if !nick.is_valid() {
        return Err(ControlError::NotFound);
    }
    state.set_local_nick(nick);
    tracing::debug!(%nick, "local nickname updated");
    Ok(())
}

pub fn set_tree_root(state: &RbrState, nick: Nickname) -> Result<(), ControlError> {
    state.set_tree_root(nick)?;
    tracing::debug!(%nick, "distribution tree root updated");
    Ok(())
}

/// Installs (or replaces) the neighbour descriptor for `nick`.
pub fn install_neighbor(
    state: &RbrState,
    nick: Nickname,
    info: NeighborInfo,
) -> Result<(), ControlError> {
    if !nick.is_valid() {
        return Err(ControlError::NotFound);
    }
    state.neighbors().install(nick, RbrNode::new(info));
    tracing::debug!(%nick, "neighbor installed");
    Ok(())
}

/// Evicts the neighbour descriptor for `nick`.
pub fn evict_neighbor(state: &RbrState, nick: Nickname) -> Result<(), ControlError> {
    if !nick.is_valid() {
        return Err(ControlError::NotFound);
    }
    state.neighbors().evict(nick);
    tracing::debug!(%nick, "neighbor evicted");
    Ok(())
}
