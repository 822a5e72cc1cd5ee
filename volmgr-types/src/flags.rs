// SPDX-License-Identifier: GPL-3.0-only

use enumflags2::{BitFlags, bitflags};
use serde::{Deserialize, Serialize};

/// Options attached to a state-change request.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateFlag {
    /// Permit transitions that are otherwise unsafe.
    Force = 0b01,
    /// Save the configuration once the change has been applied.
    Persist = 0b10,
}

pub type StateFlags = BitFlags<StateFlag>;

/// Build a flag set from the two administrative switches.
pub fn state_flags(force: bool, persist: bool) -> StateFlags {
    let mut flags = StateFlags::empty();
    if force {
        flags |= StateFlag::Force;
    }
    if persist {
        flags |= StateFlag::Persist;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_map_to_flags() {
        assert!(state_flags(false, false).is_empty());
        assert_eq!(state_flags(true, false), StateFlag::Force);
        assert!(state_flags(true, true).contains(StateFlag::Force | StateFlag::Persist));
        assert!(!state_flags(false, true).contains(StateFlag::Force));
    }
}
