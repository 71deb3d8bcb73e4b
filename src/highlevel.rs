//! Mode-optimal high-level encoding of bytes into Aztec code words.
//!
//! The encoder keeps a small frontier of [`State`]s, one per promising way of
//! encoding the input seen so far. Each input byte (or punctuation pair)
//! expands every state into its possible successors, after which any state
//! that another one dominates is dropped. The cheapest survivor at the end of
//! the input is the encoding.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::bits::BitBuffer;
use crate::error::AztecError;
use crate::state::State;
use crate::tables::{
    self,
    Mode,
    PAIR_COLON_SPACE,
    PAIR_COMMA_SPACE,
    PAIR_CR_LF,
    PAIR_PERIOD_SPACE,
};
use crate::token::TokenArena;

/// Converts a byte sequence into the shortest Aztec bit stream.
///
/// # Example
///
/// ```rust
/// use aztecrust::highlevel::HighLevelEncoder;
///
/// let bits = HighLevelEncoder::new(b"A").encode().unwrap();
/// assert_eq!(bits.to_string(), "...X.");
/// ```
pub struct HighLevelEncoder<'a> {
    text: &'a [u8],
    eci: Option<u32>,
}

impl<'a> HighLevelEncoder<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        Self { text, eci: None }
    }

    /// Prefixes the stream with an FLG(n) designator for `eci`.
    pub fn with_eci(mut self, eci: Option<u32>) -> Self {
        self.eci = eci;
        self
    }

    /// Returns the encoded bit stream.
    pub fn encode(&self) -> Result<BitBuffer, AztecError> {
        let mut arena = TokenArena::new();
        let states = self.final_states(&mut arena, true)?;
        let min_state = states
            .iter()
            .min_by_key(|s| s.bit_count())
            .copied()
            .unwrap_or(State::INITIAL);
        let bits = min_state.to_bit_buffer(&mut arena, self.text);
        debug!(
            "high-level encoded {} bytes into {} bits ({} tokens)",
            self.text.len(),
            bits.len(),
            arena.len()
        );
        Ok(bits)
    }

    /// Runs the search over the whole input and returns the last frontier.
    /// Without `prune`, every candidate is kept.
    fn final_states(&self, arena: &mut TokenArena, prune: bool) -> Result<Vec<State>, AztecError> {
        let initial = match self.eci {
            Some(eci) => State::INITIAL.append_flg_n(arena, eci)?,
            None => State::INITIAL,
        };
        let mut states: Vec<State> = vec![initial];
        let mut index = 0;
        while index < self.text.len() {
            let next_char = self.text.get(index + 1).copied().unwrap_or(0);
            let pair_code = match (self.text[index], next_char) {
                (b'\r', b'\n') => PAIR_CR_LF,
                (b'.', b' ') => PAIR_PERIOD_SPACE,
                (b',', b' ') => PAIR_COMMA_SPACE,
                (b':', b' ') => PAIR_COLON_SPACE,
                _ => 0,
            };
            let mut candidates = Vec::with_capacity(states.len() * 4);
            if pair_code > 0 {
                for state in &states {
                    Self::update_state_for_pair(arena, state, index, pair_code, &mut candidates);
                }
                index += 1;
            } else {
                for state in &states {
                    self.update_state_for_char(arena, state, index, &mut candidates);
                }
            }
            states = if prune { simplify_states(candidates) } else { candidates };
            trace!("after byte {}: {} states", index, states.len());
            index += 1;
        }
        Ok(states)
    }

    fn update_state_for_char(
        &self,
        arena: &mut TokenArena,
        state: &State,
        index: usize,
        result: &mut Vec<State>
    ) {
        let ch = self.text[index];
        let char_in_current_table = tables::char_code(state.mode(), ch) > 0;
        let mut state_no_binary: Option<State> = None;
        for mode in Mode::ALL {
            let char_in_mode = tables::char_code(mode, ch);
            if char_in_mode == 0 {
                continue;
            }
            let base = *state_no_binary.get_or_insert_with(|| state.end_binary_shift(arena, index));
            // DIGIT is cheap enough to always try
            if !char_in_current_table || mode == state.mode() || mode == Mode::Digit {
                result.push(base.latch_and_append(arena, mode, char_in_mode));
            }
            if !char_in_current_table && tables::shift(state.mode(), mode).is_some() {
                result.push(base.shift_and_append(arena, mode, char_in_mode));
            }
        }
        // Also covers bytes no mode can represent
        if state.binary_shift_byte_count() > 0 || !char_in_current_table {
            result.push(state.add_binary_shift_char(arena, index));
        }
    }

    fn update_state_for_pair(
        arena: &mut TokenArena,
        state: &State,
        index: usize,
        pair_code: u32,
        result: &mut Vec<State>
    ) {
        let state_no_binary = state.end_binary_shift(arena, index);
        result.push(state_no_binary.latch_and_append(arena, Mode::Punct, pair_code));
        if state.mode() != Mode::Punct {
            result.push(state_no_binary.shift_and_append(arena, Mode::Punct, pair_code));
        }
        if pair_code == PAIR_PERIOD_SPACE || pair_code == PAIR_COMMA_SPACE {
            // '.' is 13 and ',' is 12 in DIGIT, as is the space
            let digit_state = state_no_binary
                .latch_and_append(arena, Mode::Digit, 16 - pair_code)
                .latch_and_append(arena, Mode::Digit, 1);
            result.push(digit_state);
        }
        if state.binary_shift_byte_count() > 0 {
            let binary_state = state
                .add_binary_shift_char(arena, index)
                .add_binary_shift_char(arena, index + 1);
            result.push(binary_state);
        }
    }
}

/// Drops every state that another state is better than or equal to.
fn simplify_states(states: Vec<State>) -> Vec<State> {
    let mut result: VecDeque<State> = VecDeque::new();
    for new_state in states {
        let mut add = true;
        let mut i = 0;
        while i < result.len() {
            let old_state = &result[i];
            if old_state.is_better_than_or_equal_to(&new_state) {
                add = false;
                break;
            }
            if new_state.is_better_than_or_equal_to(old_state) {
                result.remove(i);
            } else {
                i += 1;
            }
        }
        if add {
            result.push_front(new_state);
        }
    }
    result.into()
}
