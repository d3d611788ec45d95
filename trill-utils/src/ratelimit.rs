//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A per-site token bucket used to rate-limit warning logs on hot data-plane
/// paths. Every drop/error path in the core logs through one of these so a
/// misbehaving neighbor or a storm of malformed frames produces one warning
/// per window instead of one per packet.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    last: Option<Instant>,
    suppressed: u64,
}

impl RateLimiter {
    pub const fn new(window: Duration) -> RateLimiter {
        RateLimiter {
            window,
            state: Mutex::new(State {
                last: None,
                suppressed: 0,
            }),
        }
    }

    /// Returns `Some(suppressed_count)` if the caller should emit a log line
    /// now (the count is how many prior calls were swallowed since the last
    /// emission), or `None` if this call falls within the current window and
    /// should stay silent.
    pub fn allow(&self) -> Option<u64> {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();
        match state.last {
            Some(last) if now.duration_since(last) < self.window => {
                state.suppressed += 1;
                None
            }
            _ => {
                let suppressed = state.suppressed;
                state.last = Some(now);
                state.suppressed = 0;
                Some(suppressed)
            }
        }
    }
}

/// Logs `$msg` (a `tracing::warn!`-style call) through `$limiter`,
/// appending the suppressed-count when prior occurrences were swallowed.
#[macro_export]
macro_rules! warn_ratelimited {
    ($limiter:expr, $($arg:tt)*) => {
        if let Some(suppressed) = $limiter.allow() {
            if suppressed > 0 {
                tracing::warn!(suppressed, $($arg)*);
            } else {
                tracing::warn!($($arg)*);
            }
        }
    };
}
