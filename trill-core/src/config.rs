//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_HOP_COUNT;
use crate::error::DEFAULT_RATELIMIT_WINDOW;

/// Tunables an integrator may want to change when embedding this crate in a
/// host bridge. There is no wider "configuration" surface beyond these
/// constants (no YANG module, no file format of its own) — see
/// SPEC_FULL.md's note on the ambient configuration layer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Initial hop count written into a freshly encapsulated frame
    /// (spec.md §4.3, §4.4).
    pub initial_hop_count: u8,
    /// Whether the VNT extension codec is active for this bridge (spec.md
    /// §9: "a runtime feature... togglable without altering the base
    /// path").
    pub vnt_enabled: bool,
    /// Window used by every rate-limited warning site (spec.md §7).
    #[serde(with = "duration_secs")]
    pub ratelimit_window: Duration,
}

impl Default for CoreConfig {
    fn default() -> CoreConfig {
        CoreConfig {
            initial_hop_count: DEFAULT_HOP_COUNT,
            vnt_enabled: false,
            ratelimit_window: DEFAULT_RATELIMIT_WINDOW,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
