use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// State of a cell in the next generation, given its current state and its number of
    /// live neighbours.
    pub fn next(&self, alive: bool, neighbours: u8) -> bool {
        let Some(bit) = 1u16.checked_shl(neighbours as u32) else {
            return false;
        };

        let set = if alive {
            self.survivals()
        } else {
            self.births()
        };

        set & bit == bit
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("neighbour count {got} is out of range, expected 0 to 8")]
    OutOfRange { got: u32 },

    #[error("unexpected character '{got}' in rule string")]
    InvalidChar { got: char },

    #[error("rule string has no birth section")]
    NoBirths,
}

impl FromStr for RuleSet {
    type Err = RuleError;

    /// Parses rules that look like `B3/S23` or `b3s23`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[derive(Clone, Copy)]
        enum State {
            Start,
            Birth,
            Survival,
        }

        let mut state = State::Start;
        let (mut b, mut s_mask) = (0u16, 0u16);

        for c in s.trim().chars() {
            match (c, state) {
                ('b' | 'B', State::Start) => state = State::Birth,
                ('s' | 'S', State::Birth) => state = State::Survival,
                ('/', State::Birth) => {}
                (n, State::Birth | State::Survival) if n.is_ascii_digit() => {
                    let n = n.to_digit(10).unwrap_or_default();
                    if n > 8 {
                        return Err(RuleError::OutOfRange { got: n });
                    }

                    match state {
                        State::Birth => b |= 1 << n,
                        _ => s_mask |= 1 << n,
                    }
                }
                (c, _) => return Err(RuleError::InvalidChar { got: c }),
            }
        }

        if let State::Start = state {
            return Err(RuleError::NoBirths);
        }

        Ok(RuleSet::new(b, s_mask))
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |mask: u16| -> String {
            (0..=8u8)
                .filter(|n| mask & (1 << n) != 0)
                .map(|n| char::from(b'0' + n))
                .collect()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}
