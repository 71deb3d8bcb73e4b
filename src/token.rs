//! Emission chain of the high-level encoder.
//!
//! Tokens are never modified after they are pushed. Each one points back at
//! its predecessor, so encoder states that branch from a common prefix share
//! that prefix instead of copying it.

use crate::bits::BitBuffer;
use crate::tables::BINARY_SHIFT;

/// Index of a token inside a [`TokenArena`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TokenId(u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// Exactly `bit_count` bits of `value`.
    Simple { value: u32, bit_count: u8 },
    /// A B/S header followed by `byte_count` raw bytes of the input starting at `start`.
    BinaryShift { start: usize, byte_count: usize },
}

#[derive(Clone, Copy, Debug)]
struct Token {
    kind: TokenKind,
    previous: Option<TokenId>,
}

/// Owns every token created during one encode call.
#[derive(Default, Debug)]
pub struct TokenArena {
    tokens: Vec<Token>,
}

impl TokenArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Appends `bit_count` bits of `value` after `previous`.
    pub fn add(&mut self, previous: Option<TokenId>, value: u32, bit_count: u8) -> TokenId {
        self.push(previous, TokenKind::Simple { value, bit_count })
    }

    /// Appends a binary run of `byte_count` input bytes after `previous`.
    pub fn add_binary_shift(
        &mut self,
        previous: Option<TokenId>,
        start: usize,
        byte_count: usize
    ) -> TokenId {
        self.push(previous, TokenKind::BinaryShift { start, byte_count })
    }

    fn push(&mut self, previous: Option<TokenId>, kind: TokenKind) -> TokenId {
        let id = TokenId(self.tokens.len() as u32);
        self.tokens.push(Token { kind, previous });
        id
    }

    pub fn kind(&self, id: TokenId) -> TokenKind {
        self.tokens[id.0 as usize].kind
    }

    pub fn previous(&self, id: TokenId) -> Option<TokenId> {
        self.tokens[id.0 as usize].previous
    }

    /// Returns the chain ending at `tail`, oldest token first.
    pub fn chain(&self, tail: Option<TokenId>) -> Vec<TokenKind> {
        let mut kinds = Vec::new();
        let mut cursor = tail;
        while let Some(id) = cursor {
            kinds.push(self.kind(id));
            cursor = self.previous(id);
        }
        kinds.reverse();
        kinds
    }

    /// Materializes the chain ending at `tail` into a flat bit stream.
    pub fn to_bit_buffer(&self, tail: Option<TokenId>, text: &[u8]) -> BitBuffer {
        let mut bb = BitBuffer::new();
        for kind in self.chain(tail) {
            kind.append_to(&mut bb, text);
        }
        bb
    }
}

impl TokenKind {
    pub fn append_to(&self, bb: &mut BitBuffer, text: &[u8]) {
        match *self {
            TokenKind::Simple { value, bit_count } => bb.append_bits(value, bit_count),
            TokenKind::BinaryShift { start, byte_count } => {
                for i in 0..byte_count {
                    // Headers precede byte 0, and byte 31 when the short form is used twice
                    if i == 0 || (i == 31 && byte_count <= 62) {
                        bb.append_bits(BINARY_SHIFT, 5);
                        if byte_count > 62 {
                            bb.append_bits((byte_count - 31) as u32, 16);
                        } else if i == 0 {
                            bb.append_bits(byte_count.min(31) as u32, 5);
                        } else {
                            bb.append_bits((byte_count - 31) as u32, 5);
                        }
                    }
                    bb.append_bits(text[start + i].into(), 8);
                }
            }
        }
    }
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            TokenKind::Simple { value, bit_count } => {
                write!(f, "<{:0width$b}>", value, width = usize::from(bit_count))
            }
            TokenKind::BinaryShift { start, byte_count } => {
                write!(f, "::{}::{}", start, start + byte_count - 1)
            }
        }
    }
}
