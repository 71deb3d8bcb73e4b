//! A minimal Aztec reader used to check encoder output.
//!
//! It works on the clean module grid, not on images: it reads the mode
//! message, collects the data layers, verifies every check word, removes the
//! stuffed bits and expands the character codes back into bytes.

#![allow(dead_code)]

use aztecrust::reedsolomon::{GaloisField, ReedSolomonGenerator};
use aztecrust::{AztecCode, BitMatrix};

#[derive(Debug, PartialEq, Eq)]
pub struct Decoded {
    pub layers: usize,
    pub data_words: usize,
    pub eci: Option<u32>,
    pub bytes: Vec<u8>,
}

pub fn word_size(layers: usize) -> usize {
    match layers {
        1..=2 => 6,
        3..=8 => 8,
        9..=22 => 10,
        _ => 12,
    }
}

fn to_number(bits: &[bool]) -> u32 {
    bits.iter().fold(0, |acc, &b| (acc << 1) | u32::from(b))
}

fn to_words(bits: &[bool], word_size: usize) -> Vec<u16> {
    bits.chunks(word_size).map(|c| to_number(c) as u16).collect()
}

/// Panics unless the trailing `check_words` of `words` are the Reed-Solomon
/// check words of the leading ones.
pub fn verify_check_words(words: &[u16], check_words: usize, word_size: u8) {
    let field = GaloisField::for_word_size(word_size).unwrap();
    let rs = ReedSolomonGenerator::new(&field, check_words);
    let (data, ecc) = words.split_at(words.len() - check_words);
    let mut expected = vec![0u16; check_words];
    rs.compute_remainder(data, &mut expected);
    assert_eq!(ecc, &expected[..], "check words do not match");
}

fn read_mode_message(matrix: &BitMatrix, compact: bool) -> (usize, usize) {
    let center = matrix.width() / 2;
    let mut bits = vec![false; if compact { 28 } else { 40 }];
    if compact {
        for i in 0..7 {
            let offset = center - 3 + i;
            bits[i] = matrix.get(offset, center - 5);
            bits[i + 7] = matrix.get(center + 5, offset);
            bits[20 - i] = matrix.get(offset, center + 5);
            bits[27 - i] = matrix.get(center - 5, offset);
        }
    } else {
        for i in 0..10 {
            let offset = center - 5 + i + i / 5;
            bits[i] = matrix.get(offset, center - 7);
            bits[i + 10] = matrix.get(center + 7, offset);
            bits[29 - i] = matrix.get(offset, center + 7);
            bits[39 - i] = matrix.get(center - 7, offset);
        }
    }
    let words = to_words(&bits, 4);
    let data_words = if compact { 2 } else { 4 };
    verify_check_words(&words, words.len() - data_words, 4);
    if compact {
        (to_number(&bits[0..2]) as usize + 1, to_number(&bits[2..8]) as usize + 1)
    } else {
        (to_number(&bits[0..5]) as usize + 1, to_number(&bits[5..16]) as usize + 1)
    }
}

/// Module coordinates of the data layer bits, outermost layer first.
///
/// Each layer is a two module wide ring read counterclockwise in four
/// sides: down the left, along the bottom, up the right, then back along
/// the top. Every side reads one domino (two modules across the ring) at a
/// time, and starts in the corner the previous side ended in.
pub fn data_positions(size: usize, compact: bool, layers: usize) -> Vec<(usize, usize)> {
    let base = (if compact { 11 } else { 14 }) + layers * 4;
    let mut map: Vec<usize> = (0..base).collect();
    if !compact {
        let center = size / 2;
        let orig_center = base / 2;
        for i in 0..orig_center {
            let offset = i + i / 15;
            map[orig_center - i - 1] = center - offset - 1;
            map[orig_center + i] = center + offset + 1;
        }
    }
    let mut positions = Vec::new();
    for i in 0..layers {
        let side_length = (layers - i) * 4 + if compact { 9 } else { 12 };
        let near = |t: usize| map[i * 2 + t];
        let far = |t: usize| map[base - 1 - i * 2 - t];
        for side in 0..4 {
            for j in 0..side_length {
                for k in 0..2 {
                    positions.push(match side {
                        0 => (near(k), near(j)),
                        1 => (near(j), far(k)),
                        2 => (far(k), far(j)),
                        _ => (far(j), near(k)),
                    });
                }
            }
        }
    }
    positions
}

fn read_layers(matrix: &BitMatrix, compact: bool, layers: usize) -> Vec<bool> {
    data_positions(matrix.width(), compact, layers)
        .into_iter()
        .map(|(x, y)| matrix.get(x, y))
        .collect()
}

/// Reverses bit stuffing: a word with uniform upper bits carries only those.
pub fn unstuff(words: &[u16], word_size: usize) -> Vec<bool> {
    let mask = (1u16 << word_size) - 2;
    let mut bits = Vec::new();
    for &w in words {
        let keep = if w & mask == mask || w & mask == 0 { word_size - 1 } else { word_size };
        for i in 0..keep {
            bits.push((w >> (word_size - 1 - i)) & 1 == 1);
        }
    }
    bits
}

/// Reads the symbol back, panicking on any structural or check word error.
pub fn read_symbol(code: &AztecCode) -> Decoded {
    let matrix = code.matrix();
    let compact = code.is_compact();
    let (layers, data_words) = read_mode_message(matrix, compact);
    assert_eq!(layers, code.layers());
    assert_eq!(data_words, code.codewords());

    let raw = read_layers(matrix, compact, layers);
    let ws = word_size(layers);
    let words = to_words(&raw[raw.len() % ws..], ws);
    assert!(raw[..raw.len() % ws].iter().all(|b| !b), "start padding must be light");
    verify_check_words(&words, words.len() - data_words, ws as u8);
    let (eci, bytes) = decode_stream(&unstuff(&words[..data_words], ws));
    Decoded { layers, data_words, eci, bytes }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Table {
    Upper,
    Lower,
    Mixed,
    Digit,
    Punct,
    Binary,
}

enum Code {
    Text(Vec<u8>),
    Shift(Table),
    Latch(Table),
    Flg,
}

const PUNCTUATION: &[u8] = b"!\"#$%&'()*+,-./:;<=>?[]{}";

fn lookup(table: Table, code: u32) -> Code {
    let byte = |b: u8| Code::Text(vec![b]);
    match (table, code) {
        (Table::Upper | Table::Lower | Table::Mixed | Table::Digit, 0) => Code::Shift(Table::Punct),
        (Table::Upper | Table::Lower | Table::Mixed | Table::Digit, 1) => byte(b' '),
        (Table::Upper | Table::Lower | Table::Mixed, 31) => Code::Shift(Table::Binary),
        (Table::Upper, 2..=27) => byte(b'A' + (code - 2) as u8),
        (Table::Upper, 28) => Code::Latch(Table::Lower),
        (Table::Upper, 29) => Code::Latch(Table::Mixed),
        (Table::Upper, 30) => Code::Latch(Table::Digit),
        (Table::Lower, 2..=27) => byte(b'a' + (code - 2) as u8),
        (Table::Lower, 28) => Code::Shift(Table::Upper),
        (Table::Lower, 29) => Code::Latch(Table::Mixed),
        (Table::Lower, 30) => Code::Latch(Table::Digit),
        (Table::Mixed, 2..=14) => byte((code - 1) as u8),
        (Table::Mixed, 15..=19) => byte((code + 12) as u8),
        (Table::Mixed, 20..=26) => byte(b"@\\^_`|~"[(code - 20) as usize]),
        (Table::Mixed, 27) => byte(127),
        (Table::Mixed, 28) => Code::Latch(Table::Lower),
        (Table::Mixed, 29) => Code::Latch(Table::Upper),
        (Table::Mixed, 30) => Code::Latch(Table::Punct),
        (Table::Digit, 2..=11) => byte(b'0' + (code - 2) as u8),
        (Table::Digit, 12) => byte(b','),
        (Table::Digit, 13) => byte(b'.'),
        (Table::Digit, 14) => Code::Latch(Table::Upper),
        (Table::Digit, 15) => Code::Shift(Table::Upper),
        (Table::Punct, 0) => Code::Flg,
        (Table::Punct, 1) => byte(b'\r'),
        (Table::Punct, 2) => Code::Text(b"\r\n".to_vec()),
        (Table::Punct, 3) => Code::Text(b". ".to_vec()),
        (Table::Punct, 4) => Code::Text(b", ".to_vec()),
        (Table::Punct, 5) => Code::Text(b": ".to_vec()),
        (Table::Punct, 6..=30) => byte(PUNCTUATION[(code - 6) as usize]),
        (Table::Punct, 31) => Code::Latch(Table::Upper),
        _ => panic!("no code {} in {:?}", code, table),
    }
}

/// Expands the unstuffed character codes into bytes. Stops when too few
/// bits remain for another code, which swallows the trailing padding.
fn decode_stream(bits: &[bool]) -> (Option<u32>, Vec<u8>) {
    let end = bits.len();
    let mut index = 0;
    let read = |index: &mut usize, n: usize| {
        let v = to_number(&bits[*index..*index + n]);
        *index += n;
        v
    };
    let mut latch = Table::Upper;
    let mut shift = Table::Upper;
    let mut eci = None;
    let mut out = Vec::new();
    while index < end {
        if shift == Table::Binary {
            if end - index < 5 {
                break;
            }
            let mut length = read(&mut index, 5) as usize;
            if length == 0 {
                if end - index < 11 {
                    break;
                }
                length = read(&mut index, 11) as usize + 31;
            }
            for _ in 0..length {
                if end - index < 8 {
                    index = end;
                    break;
                }
                out.push(read(&mut index, 8) as u8);
            }
            shift = latch;
            continue;
        }
        let size = if shift == Table::Digit { 4 } else { 5 };
        if end - index < size {
            break;
        }
        match lookup(shift, read(&mut index, size)) {
            Code::Text(text) => {
                out.extend(text);
                shift = latch;
            }
            Code::Shift(table) => shift = table,
            Code::Latch(table) => {
                latch = table;
                shift = table;
            }
            Code::Flg => {
                if end - index < 3 {
                    break;
                }
                let n = read(&mut index, 3) as usize;
                if end - index < 4 * n {
                    break;
                }
                let mut value = 0;
                for _ in 0..n {
                    value = value * 10 + (read(&mut index, 4) - 2);
                }
                if n > 0 {
                    eci = Some(value);
                }
                shift = latch;
            }
        }
    }
    (eci, out)
}
