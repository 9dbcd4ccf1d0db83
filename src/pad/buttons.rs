//! Logical button bitmask shared with the input layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Button set reported by an extension pad, one bit per button.
///
/// The wire protocol is active-low; by the time a `Buttons` value exists
/// the polarity has been normalized, so a set bit means pressed.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Buttons(u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const UP: Buttons = Buttons(1 << 0);
    pub const DOWN: Buttons = Buttons(1 << 1);
    pub const LEFT: Buttons = Buttons(1 << 2);
    pub const RIGHT: Buttons = Buttons(1 << 3);
    pub const SELECT: Buttons = Buttons(1 << 4);
    pub const START: Buttons = Buttons(1 << 5);
    pub const A: Buttons = Buttons(1 << 6);
    pub const B: Buttons = Buttons(1 << 7);

    /// Every button at once. No pad can physically report this; the
    /// decoder uses it to reject garbage frames.
    pub const ALL: Buttons = Buttons(0xff);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        Buttons(bits)
    }

    pub fn contains(self, other: Buttons) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Buttons) {
        self.0 |= rhs.0;
    }
}

const NAMES: [(Buttons, &str); 8] = [
    (Buttons::UP, "UP"),
    (Buttons::DOWN, "DOWN"),
    (Buttons::LEFT, "LEFT"),
    (Buttons::RIGHT, "RIGHT"),
    (Buttons::SELECT, "SELECT"),
    (Buttons::START, "START"),
    (Buttons::A, "A"),
    (Buttons::B, "B"),
];

impl fmt::Debug for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct_bits() {
        let mut seen = 0u8;
        for (flag, _) in NAMES {
            assert_eq!(seen & flag.bits(), 0);
            seen |= flag.bits();
        }
        assert_eq!(seen, Buttons::ALL.bits());
    }

    #[test]
    fn formats_pressed_set() {
        let set = Buttons::UP | Buttons::START;
        assert_eq!(format!("{set:?}"), "UP|START");
        assert_eq!(format!("{:?}", Buttons::NONE), "(none)");
    }
}
