//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use trill_utils::ratelimit::RateLimiter;

use crate::bridge::Counters;
use crate::nickname::Nickname;

// Data-plane errors. Every variant represents a dropped buffer; none is ever
// propagated to a peer (spec.md §7).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidNickname(Nickname),
    UnknownNeighbor(Nickname),
    HopCountExhausted,
    LoopDetected(LoopKind),
    FailedRpf,
    WrongAdjacency,
    MalformedHeader(MalformedReason),
    AllocationFailure,
    VlanIngressDenied,
    InvalidSourceMac,
    NotEnabled,
    /// Decapsulated frame's VNI does not match the resolved destination
    /// port's VNI (spec.md §4.7).
    VniMismatch,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopKind {
    // Ingress nickname equals the local RBridge's own nickname.
    SelfIngress,
    // Egress nickname equals ingress nickname on a unicast frame.
    EgressEqualsIngress,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MalformedReason {
    ShortBuffer,
    VersionMismatch,
    UnexpectedOptLen,
    UnknownExtensionType,
    OptLenOverflow,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidNickname(nick) => {
                write!(f, "invalid nickname {nick}")
            }
            Error::UnknownNeighbor(nick) => {
                write!(f, "unknown neighbor for nickname {nick}")
            }
            Error::HopCountExhausted => write!(f, "hop count exhausted"),
            Error::LoopDetected(LoopKind::SelfIngress) => {
                write!(f, "loop detected: ingress nickname is local")
            }
            Error::LoopDetected(LoopKind::EgressEqualsIngress) => {
                write!(f, "loop detected: egress equals ingress")
            }
            Error::FailedRpf => write!(f, "reverse-path-forwarding check failed"),
            Error::WrongAdjacency => {
                write!(f, "frame did not arrive from an expected adjacency")
            }
            Error::MalformedHeader(reason) => {
                write!(f, "malformed TRILL header: {reason}")
            }
            Error::AllocationFailure => write!(f, "buffer allocation failed"),
            Error::VlanIngressDenied => write!(f, "VLAN ingress policy denied frame"),
            Error::InvalidSourceMac => write!(f, "invalid inner source MAC address"),
            Error::NotEnabled => write!(f, "TRILL is not enabled on this bridge"),
            Error::VniMismatch => write!(f, "destination port VNI does not match frame VNI"),
        }
    }
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::ShortBuffer => write!(f, "buffer shorter than header size"),
            MalformedReason::VersionMismatch => write!(f, "protocol version mismatch"),
            MalformedReason::UnexpectedOptLen => write!(f, "opt_len set without VNT support"),
            MalformedReason::UnknownExtensionType => write!(f, "unknown extension type"),
            MalformedReason::OptLenOverflow => write!(f, "opt_len exceeds remaining header"),
        }
    }
}

impl std::error::Error for Error {}

/// Default window used by the data-plane's rate-limited warning sites.
pub const DEFAULT_RATELIMIT_WINDOW: Duration = Duration::from_secs(1);

/// One rate limiter per logical drop site, shared for the lifetime of an
/// [`crate::state::RbrState`]. Keyed by coarse call site rather than by flow,
/// matching spec.md §7 ("emits one rate-limited warning line naming the
/// site").
#[derive(Debug)]
pub struct ErrorSites {
    pub encap_no_local_nick: RateLimiter,
    pub encap_no_tree_root: RateLimiter,
    pub encap_invalid_egress: RateLimiter,
    pub forward_unknown_neighbor: RateLimiter,
    pub forward_alloc_failure: RateLimiter,
    pub replicate_alloc_failure: RateLimiter,
    pub classify_vlan_denied: RateLimiter,
    pub classify_invalid_src_mac: RateLimiter,
    pub receive_malformed: RateLimiter,
    pub receive_loop: RateLimiter,
    pub receive_rpf: RateLimiter,
    pub receive_adjacency: RateLimiter,
    pub receive_ttl: RateLimiter,
    pub decap_vni_mismatch: RateLimiter,
}

impl Error {
    // Rate-limited warning naming the drop site, per spec.md §7. Called at
    // every drop exit point alongside the matching counter bump.
    pub fn log(&self, sites: &ErrorSites) {
        match self {
            Error::InvalidNickname(_) => {
                trill_utils::warn_ratelimited!(sites.encap_invalid_egress, "{self}")
            }
            Error::UnknownNeighbor(_) => {
                trill_utils::warn_ratelimited!(sites.forward_unknown_neighbor, "{self}")
            }
            Error::HopCountExhausted => {
                trill_utils::warn_ratelimited!(sites.receive_ttl, "{self}")
            }
            Error::LoopDetected(_) => {
                trill_utils::warn_ratelimited!(sites.receive_loop, "{self}")
            }
            Error::FailedRpf => {
                trill_utils::warn_ratelimited!(sites.receive_rpf, "{self}")
            }
            Error::WrongAdjacency => {
                trill_utils::warn_ratelimited!(sites.receive_adjacency, "{self}")
            }
            Error::MalformedHeader(_) => {
                trill_utils::warn_ratelimited!(sites.receive_malformed, "{self}")
            }
            Error::AllocationFailure => {
                trill_utils::warn_ratelimited!(sites.forward_alloc_failure, "{self}")
            }
            Error::VlanIngressDenied => {
                trill_utils::warn_ratelimited!(sites.classify_vlan_denied, "{self}")
            }
            Error::InvalidSourceMac => {
                trill_utils::warn_ratelimited!(sites.classify_invalid_src_mac, "{self}")
            }
            Error::NotEnabled => {
                trill_utils::warn_ratelimited!(sites.encap_no_local_nick, "{self}")
            }
            Error::VniMismatch => {
                trill_utils::warn_ratelimited!(sites.decap_vni_mismatch, "{self}")
            }
        }
    }
}

impl Default for ErrorSites {
    fn default() -> ErrorSites {
        ErrorSites {
            encap_no_local_nick: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            encap_no_tree_root: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            encap_invalid_egress: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            forward_unknown_neighbor: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            forward_alloc_failure: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            replicate_alloc_failure: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            classify_vlan_denied: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            classify_invalid_src_mac: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            receive_malformed: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            receive_loop: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            receive_rpf: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            receive_adjacency: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            receive_ttl: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
            decap_vni_mismatch: RateLimiter::new(DEFAULT_RATELIMIT_WINDOW),
        }
    }
}

/// Every drop exit point funnels through here: log the rate-limited
/// warning, bump the appropriate counter, and return the error so the
/// caller can propagate it (spec.md §7 policy). `tx` distinguishes an
/// egress-side drop (tx-dropped) from an ingress-side one (rx-dropped).
pub fn fail(counters: &Counters, sites: &ErrorSites, err: Error, tx: bool) -> Error {
    err.log(sites);
    if tx {
        counters.bump_tx_dropped();
    } else {
        counters.bump_rx_dropped();
    }
    err
}
