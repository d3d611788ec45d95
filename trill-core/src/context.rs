//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::bridge::Vni;
use crate::config::CoreConfig;
use crate::state::RbrState;

/// Bundles the handles every data-plane component needs: the attached
/// `RbrState`, the tunable constants, and the optional VNT collaborator.
/// Built once per packet (or once per batch) by the caller and passed by
/// reference to `Encapsulator`/`Forwarder`/`Replicator`/`Decapsulator`/
/// `IngressClassifier`.
pub struct Context<'a> {
    pub state: &'a RbrState,
    pub config: &'a CoreConfig,
    pub vni: Option<&'a dyn Vni>,
}

impl<'a> Context<'a> {
    pub fn new(state: &'a RbrState, config: &'a CoreConfig) -> Context<'a> {
        Context {
            state,
            config,
            vni: None,
        }
    }

    pub fn with_vni(mut self, vni: &'a dyn Vni) -> Context<'a> {
        self.vni = Some(vni);
        self
    }
}
