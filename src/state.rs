//! Immutable encoder states explored by the high-level encoder.

use crate::bits::BitBuffer;
use crate::error::AztecError;
use crate::tables::{self, Mode, FLG_N};
use crate::token::{TokenArena, TokenId};

/// Longest binary run a single B/S token can hold (11-bit length + 31).
pub const MAX_BINARY_SHIFT_BYTES: usize = 2047 + 31;

/// A partial encoding: current mode, emitted tokens and their bit cost.
///
/// Every transition returns a new state and pushes any new tokens into the
/// shared [`TokenArena`]; the receiver is left untouched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct State {
    mode: Mode,
    token: Option<TokenId>,
    binary_shift_byte_count: usize,
    bit_count: usize,
}

impl State {
    /// Nothing encoded yet, UPPER mode.
    pub const INITIAL: State = State {
        mode: Mode::Upper,
        token: None,
        binary_shift_byte_count: 0,
        bit_count: 0,
    };

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn token(&self) -> Option<TokenId> {
        self.token
    }

    pub fn binary_shift_byte_count(&self) -> usize {
        self.binary_shift_byte_count
    }

    /// Total bits this state will emit, including the open binary run.
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Header overhead already charged for the open binary run.
    pub fn binary_shift_cost(&self) -> usize {
        binary_shift_cost(self.binary_shift_byte_count)
    }

    /// Prefixes an FLG(n) ECI designator announcing `eci`.
    pub fn append_flg_n(&self, arena: &mut TokenArena, eci: u32) -> Result<State, AztecError> {
        if eci > 999_999 {
            return Err(AztecError::InvalidArgument(format!(
                "ECI code must be between 0 and 999999, got {}",
                eci
            )));
        }
        let result = self.shift_and_append(arena, Mode::Punct, FLG_N);
        let digits = eci.to_string();
        let mut token = arena.add(result.token, digits.len() as u32, 3);
        for d in digits.bytes() {
            token = arena.add(Some(token), u32::from(d - b'0') + 2, 4);
        }
        Ok(State {
            token: Some(token),
            bit_count: result.bit_count + 3 + digits.len() * 4,
            ..result
        })
    }

    /// Latches to `mode` (if not already there) and appends `value` in that mode.
    pub fn latch_and_append(&self, arena: &mut TokenArena, mode: Mode, value: u32) -> State {
        let mut bit_count = self.bit_count;
        let mut token = self.token;
        if mode != self.mode {
            let (latch_bits, latch) = tables::latch(self.mode, mode);
            token = Some(arena.add(token, latch, latch_bits));
            bit_count += usize::from(latch_bits);
        }
        let width = mode.bit_width();
        let token = arena.add(token, value, width);
        State {
            mode,
            token: Some(token),
            binary_shift_byte_count: 0,
            bit_count: bit_count + usize::from(width),
        }
    }

    /// Shifts into `mode` for the single character `value`; the mode is kept.
    ///
    /// # Panics
    ///
    /// Panics if no shift exists from the current mode into `mode`.
    pub fn shift_and_append(&self, arena: &mut TokenArena, mode: Mode, value: u32) -> State {
        let width = self.mode.bit_width();
        let shift = tables::shift(self.mode, mode).expect("No shift between these modes");
        // Shift targets are UPPER and PUNCT, both 5 bits wide
        let token = arena.add(self.token, shift, width);
        let token = arena.add(Some(token), value, 5);
        State {
            mode: self.mode,
            token: Some(token),
            binary_shift_byte_count: 0,
            bit_count: self.bit_count + usize::from(width) + 5,
        }
    }

    /// Adds the byte at `index` to the open binary run, opening one if needed.
    pub fn add_binary_shift_char(&self, arena: &mut TokenArena, index: usize) -> State {
        let mut token = self.token;
        let mut mode = self.mode;
        let mut bit_count = self.bit_count;
        if mode == Mode::Punct || mode == Mode::Digit {
            let (latch_bits, latch) = tables::latch(mode, Mode::Upper);
            token = Some(arena.add(token, latch, latch_bits));
            bit_count += usize::from(latch_bits);
            mode = Mode::Upper;
        }
        let delta = match self.binary_shift_byte_count {
            0 | 31 => 18,
            62 => 9,
            _ => 8,
        };
        let result = State {
            mode,
            token,
            binary_shift_byte_count: self.binary_shift_byte_count + 1,
            bit_count: bit_count + delta,
        };
        if result.binary_shift_byte_count == MAX_BINARY_SHIFT_BYTES {
            result.end_binary_shift(arena, index + 1)
        } else {
            result
        }
    }

    /// Closes the open binary run, if any; `index` is one past its last byte.
    pub fn end_binary_shift(&self, arena: &mut TokenArena, index: usize) -> State {
        if self.binary_shift_byte_count == 0 {
            return *self;
        }
        let token = arena.add_binary_shift(
            self.token,
            index - self.binary_shift_byte_count,
            self.binary_shift_byte_count
        );
        State {
            token: Some(token),
            binary_shift_byte_count: 0,
            ..*self
        }
    }

    /// True when this state can reach `other`'s situation for no more bits,
    /// so `other` may be discarded.
    pub fn is_better_than_or_equal_to(&self, other: &State) -> bool {
        let mut new_mode_bit_count = self.bit_count + tables::latch_cost(self.mode, other.mode);
        if self.binary_shift_byte_count < other.binary_shift_byte_count {
            new_mode_bit_count += other.binary_shift_cost() - self.binary_shift_cost();
        } else if
            self.binary_shift_byte_count > other.binary_shift_byte_count &&
            other.binary_shift_byte_count > 0
        {
            // Worst case: this run crosses the 31 byte boundary, other's does not
            new_mode_bit_count += 10;
        }
        new_mode_bit_count <= other.bit_count
    }

    /// Closes any open run and flattens the token chain.
    pub fn to_bit_buffer(&self, arena: &mut TokenArena, text: &[u8]) -> BitBuffer {
        let end = self.end_binary_shift(arena, text.len());
        arena.to_bit_buffer(end.token, text)
    }
}

fn binary_shift_cost(byte_count: usize) -> usize {
    match byte_count {
        0 => 0,
        1..=31 => 10,
        32..=62 => 20,
        _ => 21,
    }
}
