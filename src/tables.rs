//! Static character tables for the five Aztec text modes.

/// A character encoding mode of the Aztec high-level encoder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Mode {
    Upper,
    Lower,
    Digit,
    Mixed,
    Punct,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Upper, Mode::Lower, Mode::Digit, Mode::Mixed, Mode::Punct];

    /// Returns the table index in the range 0 to 4.
    pub fn ordinal(self) -> usize {
        use Mode::*;
        match self {
            Upper => 0,
            Lower => 1,
            Digit => 2,
            Mixed => 3,
            Punct => 4,
        }
    }

    /// Width of a code word while this mode is active.
    pub fn bit_width(self) -> u8 {
        match self {
            Mode::Digit => 4,
            _ => 5,
        }
    }
}

/// Code 31 in UPPER, LOWER and MIXED: binary shift.
pub const BINARY_SHIFT: u32 = 31;

/// Pair codes in PUNCT.
pub const PAIR_CR_LF: u32 = 2;
pub const PAIR_PERIOD_SPACE: u32 = 3;
pub const PAIR_COMMA_SPACE: u32 = 4;
pub const PAIR_COLON_SPACE: u32 = 5;

/// Code 0 in PUNCT: FLG(n), announces an ECI or FNC1.
pub const FLG_N: u32 = 0;

/// Characters of MIXED by code; code 0 is P/S.
const MIXED_TABLE: [u8; 28] = [
    0, b' ', 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 27, 28, 29, 30, 31, b'@', b'\\', b'^',
    b'_', b'`', b'|', b'~', 127,
];

/// Characters of PUNCT by code; codes 0 and 2..=5 have no single character.
const PUNCT_TABLE: [u8; 31] = [
    0, b'\r', 0, 0, 0, 0, b'!', b'"', b'#', b'$', b'%', b'&', b'\'', b'(', b')', b'*', b'+', b',',
    b'-', b'.', b'/', b':', b';', b'<', b'=', b'>', b'?', b'[', b']', b'{', b'}',
];

static CHAR_MAP: [[u8; 256]; 5] = build_char_map();

const fn build_char_map() -> [[u8; 256]; 5] {
    let mut map = [[0u8; 256]; 5];
    map[0][b' ' as usize] = 1;
    map[1][b' ' as usize] = 1;
    map[2][b' ' as usize] = 1;
    let mut c = 0;
    while c < 26 {
        map[0][(b'A' + c) as usize] = c + 2;
        map[1][(b'a' + c) as usize] = c + 2;
        c += 1;
    }
    let mut d = 0;
    while d < 10 {
        map[2][(b'0' + d) as usize] = d + 2;
        d += 1;
    }
    map[2][b',' as usize] = 12;
    map[2][b'.' as usize] = 13;
    let mut i = 1;
    while i < MIXED_TABLE.len() {
        map[3][MIXED_TABLE[i] as usize] = i as u8;
        i += 1;
    }
    let mut i = 0;
    while i < PUNCT_TABLE.len() {
        if PUNCT_TABLE[i] > 0 {
            map[4][PUNCT_TABLE[i] as usize] = i as u8;
        }
        i += 1;
    }
    map
}

/// Returns the code of `byte` in `mode`, or 0 if the mode cannot represent it.
pub fn char_code(mode: Mode, byte: u8) -> u32 {
    u32::from(CHAR_MAP[mode.ordinal()][usize::from(byte)])
}

/// A latch sequence packed as `(bit_count << 16) | bits`.
const fn latch_entry(bit_count: u32, bits: u32) -> u32 {
    (bit_count << 16) | bits
}

static LATCH_TABLE: [[u32; 5]; 5] = [
    [
        0,
        latch_entry(5, 28),                          // UPPER -> LOWER
        latch_entry(5, 30),                          // UPPER -> DIGIT
        latch_entry(5, 29),                          // UPPER -> MIXED
        latch_entry(10, (29 << 5) | 30),             // UPPER -> MIXED -> PUNCT
    ],
    [
        latch_entry(9, (30 << 4) | 14),              // LOWER -> DIGIT -> UPPER
        0,
        latch_entry(5, 30),                          // LOWER -> DIGIT
        latch_entry(5, 29),                          // LOWER -> MIXED
        latch_entry(10, (29 << 5) | 30),             // LOWER -> MIXED -> PUNCT
    ],
    [
        latch_entry(4, 14),                          // DIGIT -> UPPER
        latch_entry(9, (14 << 5) | 28),              // DIGIT -> UPPER -> LOWER
        0,
        latch_entry(9, (14 << 5) | 29),              // DIGIT -> UPPER -> MIXED
        latch_entry(14, (14 << 10) | (29 << 5) | 30), // DIGIT -> UPPER -> MIXED -> PUNCT
    ],
    [
        latch_entry(5, 29),                          // MIXED -> UPPER
        latch_entry(5, 28),                          // MIXED -> LOWER
        latch_entry(10, (29 << 5) | 30),             // MIXED -> UPPER -> DIGIT
        0,
        latch_entry(5, 30),                          // MIXED -> PUNCT
    ],
    [
        latch_entry(5, 31),                          // PUNCT -> UPPER
        latch_entry(10, (31 << 5) | 28),             // PUNCT -> UPPER -> LOWER
        latch_entry(10, (31 << 5) | 30),             // PUNCT -> UPPER -> DIGIT
        latch_entry(10, (31 << 5) | 29),             // PUNCT -> UPPER -> MIXED
        0,
    ],
];

/// Returns `(bit_count, bits)` of the cheapest latch sequence from `from` to `to`.
pub fn latch(from: Mode, to: Mode) -> (u8, u32) {
    let entry = LATCH_TABLE[from.ordinal()][to.ordinal()];
    ((entry >> 16) as u8, entry & 0xffff)
}

/// Bit cost of [`latch`] alone.
pub fn latch_cost(from: Mode, to: Mode) -> usize {
    usize::from(latch(from, to).0)
}

/// Returns the code that shifts from `from` into `to` for a single character.
pub fn shift(from: Mode, to: Mode) -> Option<u32> {
    use Mode::*;
    match (from, to) {
        (Upper, Punct) | (Lower, Punct) | (Mixed, Punct) | (Digit, Punct) => Some(0),
        (Lower, Upper) => Some(28),
        (Digit, Upper) => Some(15),
        _ => None,
    }
}
