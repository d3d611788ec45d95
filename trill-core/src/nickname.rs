//
// Copyright (c) The TRILL RBridge Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

/// 16-bit RBridge nickname.
///
/// Two values are reserved and never address a real RBridge:
/// [`Nickname::NONE`] (no nickname assigned yet) and [`Nickname::RESERVED`]
/// (the all-ones sentinel).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Nickname(u16);

impl Nickname {
    /// No nickname has been assigned.
    pub const NONE: Nickname = Nickname(0x0000);
    /// All-ones sentinel, never assignable to a real RBridge.
    pub const RESERVED: Nickname = Nickname(0xffff);

    pub const fn new(value: u16) -> Nickname {
        Nickname(value)
    }

    pub const fn value(&self) -> u16 {
        self.0
    }

    /// A nickname is valid iff it isn't [`Nickname::NONE`] or
    /// [`Nickname::RESERVED`].
    pub const fn is_valid(&self) -> bool {
        self.0 != Self::NONE.0 && self.0 != Self::RESERVED.0
    }
}

impl From<u16> for Nickname {
    fn from(value: u16) -> Nickname {
        Nickname(value)
    }
}

impl std::fmt::Display for Nickname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
