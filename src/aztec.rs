//! Aztec symbol assembly.
//!
//! This module turns the high-level bit stream into a finished symbol: it
//! picks the smallest compact or full-range size that holds the data, stuffs
//! the stream into codewords, appends Reed-Solomon check words and paints the
//! data layers, the mode message, the bullseye and the alignment grid.

use log::debug;

use crate::bits::{BitBuffer, BitMatrix};
use crate::error::AztecError;
use crate::highlevel::HighLevelEncoder;
use crate::reedsolomon::{GaloisField, ReedSolomonGenerator};

/// Default minimal percentage of error check words.
pub const DEFAULT_EC_PERCENT: u32 = 33;

/// Layer count that lets the encoder choose the symbol size.
pub const DEFAULT_AZTEC_LAYERS: i32 = 0;

const MAX_LAYERS: usize = 32;
const MAX_COMPACT_LAYERS: usize = 4;

/// Codeword size in bits, indexed by layer count.
static WORD_SIZE: [u8; 33] = [
    4, 6, 6, 8, 8, 8, 8, 8, 8, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 12, 12, 12,
    12, 12, 12, 12, 12, 12, 12,
];

/// An Aztec symbol: a square grid of dark and light modules plus the
/// parameters it was built with. Instances are immutable after creation.
///
/// # Example
///
/// ```rust
/// use aztecrust::{AztecCode, AztecOptions};
///
/// let code = AztecCode::encode_text("Hello, World!", &AztecOptions::default()).unwrap();
/// assert!(code.is_compact());
/// println!("{} layers, {}x{} modules", code.layers(), code.size(), code.size());
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AztecCode {
    compact: bool,
    size: usize,
    layers: usize,
    codewords: usize,
    matrix: BitMatrix,
}

impl AztecCode {
    /// Encodes a text string into an Aztec symbol.
    ///
    /// The text is converted to bytes with the charset from `options`
    /// (ISO-8859-1 when none is given). An explicit charset is also announced
    /// in the symbol with an ECI designator.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to encode.
    /// * `options` - Error correction percentage, layer count and charset.
    ///
    /// # Returns
    ///
    /// The symbol, or an error if a character has no representation in the
    /// charset or the data does not fit.
    pub fn encode_text(text: &str, options: &AztecOptions) -> Result<Self, AztecError> {
        let charset = options.charset.unwrap_or_default();
        let bytes = charset.encode(text)?;
        Self::encode_binary(&bytes, options)
    }

    /// Encodes raw bytes into an Aztec symbol.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes to encode.
    /// * `options` - Error correction percentage, layer count and charset.
    pub fn encode_binary(data: &[u8], options: &AztecOptions) -> Result<Self, AztecError> {
        let bits = HighLevelEncoder::new(data)
            .with_eci(options.charset.map(Charset::eci))
            .encode()?;
        Self::encode_bits(&bits, options.ecc_percent, options.layers)
    }

    /// Builds a symbol around an already high-level encoded bit stream.
    ///
    /// This is a low-level API; most users want [`encode_text`](Self::encode_text).
    ///
    /// # Arguments
    ///
    /// * `bits` - The high-level encoded message.
    /// * `min_ecc_percent` - Minimal share of the symbol reserved for check words.
    /// * `user_specified_layers` - 0 to pick the smallest symbol, a negative value
    ///   for that many compact layers, a positive one for full-range layers.
    pub fn encode_bits(
        bits: &BitBuffer,
        min_ecc_percent: u32,
        user_specified_layers: i32
    ) -> Result<Self, AztecError> {
        let ecc_bits = (bits.len() * (min_ecc_percent as usize)) / 100 + 11;
        let total_size_bits = bits.len() + ecc_bits;
        let layout = if user_specified_layers != DEFAULT_AZTEC_LAYERS {
            Self::check_user_layers(bits, ecc_bits, user_specified_layers)?
        } else {
            Self::find_smallest_symbol(bits, ecc_bits, total_size_bits)?
        };
        let SymbolLayout { compact, layers, word_size, total_bits_in_layer, stuffed_bits } = layout;

        let message_bits = generate_check_words(&stuffed_bits, total_bits_in_layer, word_size)?;
        let message_size_in_words = stuffed_bits.len() / usize::from(word_size);
        let mode_message = generate_mode_message(compact, layers, message_size_in_words)?;
        debug!(
            "selected {} symbol: {} layers, {}-bit words, {} data codewords",
            if compact { "compact" } else { "full" },
            layers,
            word_size,
            message_size_in_words
        );

        let base_matrix_size = base_matrix_size(compact, layers);
        let alignment_map = alignment_map(compact, base_matrix_size);
        let matrix_size = matrix_size(compact, base_matrix_size);
        let mut matrix = BitMatrix::new(matrix_size);
        draw_data(&mut matrix, &message_bits, &alignment_map, compact, layers);
        draw_mode_message(&mut matrix, compact, matrix_size, &mode_message);
        if compact {
            draw_bulls_eye(&mut matrix, matrix_size / 2, 5);
        } else {
            draw_bulls_eye(&mut matrix, matrix_size / 2, 7);
            draw_reference_grid(&mut matrix, base_matrix_size, matrix_size);
        }

        Ok(Self {
            compact,
            size: matrix_size,
            layers,
            codewords: message_size_in_words,
            matrix,
        })
    }

    /// Returns true for a compact symbol, false for a full-range one.
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Returns the width and height of the symbol in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of data layers, 1 to 4 (compact) or 1 to 32.
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Returns the number of data codewords, check words excluded.
    pub fn codewords(&self) -> usize {
        self.codewords
    }

    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> BitMatrix {
        self.matrix
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules.
    /// Coordinates outside the symbol return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        self.matrix.get_module(x, y)
    }

    fn check_user_layers(
        bits: &BitBuffer,
        ecc_bits: usize,
        user_specified_layers: i32
    ) -> Result<SymbolLayout, AztecError> {
        let compact = user_specified_layers < 0;
        let layers = user_specified_layers.unsigned_abs() as usize;
        let max_layers = if compact { MAX_COMPACT_LAYERS } else { MAX_LAYERS };
        if layers > max_layers {
            return Err(AztecError::InvalidArgument(format!(
                "Illegal value {} for layers",
                user_specified_layers
            )));
        }
        let total_bits_in_layer = total_bits_in_layer(layers, compact);
        let word_size = WORD_SIZE[layers];
        let usable_bits_in_layers = total_bits_in_layer - (total_bits_in_layer % usize::from(word_size));
        let stuffed_bits = stuff_bits(bits, word_size);
        if stuffed_bits.len() + ecc_bits > usable_bits_in_layers {
            return Err(AztecError::CapacityExceeded {
                bits: stuffed_bits.len() + ecc_bits,
                capacity: usable_bits_in_layers,
            });
        }
        if compact && stuffed_bits.len() > usize::from(word_size) * 64 {
            return Err(AztecError::CapacityExceeded {
                bits: stuffed_bits.len(),
                capacity: usize::from(word_size) * 64,
            });
        }
        Ok(SymbolLayout { compact, layers, word_size, total_bits_in_layer, stuffed_bits })
    }

    fn find_smallest_symbol(
        bits: &BitBuffer,
        ecc_bits: usize,
        total_size_bits: usize
    ) -> Result<SymbolLayout, AztecError> {
        let mut stuffed: Option<(u8, BitBuffer)> = None;
        for i in 0..=MAX_LAYERS {
            let compact = i <= 3;
            let layers = if compact { i + 1 } else { i };
            let total_bits_in_layer = total_bits_in_layer(layers, compact);
            if total_size_bits > total_bits_in_layer {
                continue;
            }
            let word_size = WORD_SIZE[layers];
            // Stuffing depends only on the word size
            let stuffed_bits = match stuffed.take() {
                Some((ws, sb)) if ws == word_size => sb,
                _ => stuff_bits(bits, word_size),
            };
            let usable_bits_in_layers = total_bits_in_layer - (total_bits_in_layer % usize::from(word_size));
            let fits = !(compact && stuffed_bits.len() > usize::from(word_size) * 64) &&
                stuffed_bits.len() + ecc_bits <= usable_bits_in_layers;
            if fits {
                return Ok(SymbolLayout { compact, layers, word_size, total_bits_in_layer, stuffed_bits });
            }
            stuffed = Some((word_size, stuffed_bits));
        }
        Err(AztecError::CapacityExceeded {
            bits: total_size_bits,
            capacity: total_bits_in_layer(MAX_LAYERS, false),
        })
    }
}

/// The symbol parameters chosen for one encode call.
struct SymbolLayout {
    compact: bool,
    layers: usize,
    word_size: u8,
    total_bits_in_layer: usize,
    stuffed_bits: BitBuffer,
}

/// Character set used to turn text into bytes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Charset {
    /// One byte per character, U+0000 to U+00FF.
    #[default]
    Iso8859_1,
    Utf8,
}

impl Charset {
    /// Returns the ECI assignment number of this charset.
    pub fn eci(self) -> u32 {
        match self {
            Charset::Iso8859_1 => 3,
            Charset::Utf8 => 26,
        }
    }

    /// Converts `text` to bytes.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, AztecError> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        AztecError::InvalidArgument(format!(
                            "Character {:?} cannot be encoded in ISO-8859-1",
                            c
                        ))
                    })
                })
                .collect(),
        }
    }
}

/// Encoding parameters.
///
/// # Example
///
/// ```rust
/// use aztecrust::{AztecOptions, Charset};
///
/// let options = AztecOptions::default()
///     .with_ecc_percent(50)
///     .with_layers(-2)
///     .with_charset(Charset::Utf8);
/// assert_eq!(options.layers, -2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AztecOptions {
    /// Minimal percentage of the symbol used for error correction.
    pub ecc_percent: u32,
    /// 0 for automatic sizing, negative for compact, positive for full-range.
    pub layers: i32,
    /// Charset for text input; `None` means ISO-8859-1 without an ECI designator.
    pub charset: Option<Charset>,
}

impl Default for AztecOptions {
    fn default() -> Self {
        Self {
            ecc_percent: DEFAULT_EC_PERCENT,
            layers: DEFAULT_AZTEC_LAYERS,
            charset: None,
        }
    }
}

impl AztecOptions {
    pub fn with_ecc_percent(mut self, ecc_percent: u32) -> Self {
        self.ecc_percent = ecc_percent;
        self
    }

    pub fn with_layers(mut self, layers: i32) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }
}

/// Encodes `data` with the given error correction percentage and layer count.
///
/// `layers` is 0 for automatic sizing, negative for a compact symbol of that
/// many layers, positive for a full-range one.
pub fn encode(data: &[u8], ecc_percent: u32, layers: i32) -> Result<AztecCode, AztecError> {
    AztecCode::encode_binary(data, &AztecOptions { ecc_percent, layers, charset: None })
}

/// Number of data bits a symbol with `layers` layers holds.
pub fn total_bits_in_layer(layers: usize, compact: bool) -> usize {
    ((if compact { 88 } else { 112 }) + 16 * layers) * layers
}

/// Splits `bits` into `word_size` codewords so that none is all zeros or all
/// ones. A word whose upper bits are uniform gets its last bit forced to the
/// opposite value and the input bit it displaced starts the next word. The
/// final word is padded with ones.
pub fn stuff_bits(bits: &BitBuffer, word_size: u8) -> BitBuffer {
    let mut out = BitBuffer::with_capacity(bits.len() + bits.len() / usize::from(word_size));
    let n = bits.len();
    let ws = usize::from(word_size);
    let mask: u32 = (1 << word_size) - 2;
    let mut i = 0;
    while i < n {
        let mut word: u32 = 0;
        for j in 0..ws {
            if i + j >= n || bits.get(i + j) {
                word |= 1 << (ws - 1 - j);
            }
        }
        if word & mask == mask {
            out.append_bits(word & mask, word_size);
            i += ws - 1;
        } else if word & mask == 0 {
            out.append_bits(word | 1, word_size);
            i += ws - 1;
        } else {
            out.append_bits(word, word_size);
            i += ws;
        }
    }
    out
}

/// Builds the protected mode message that tells a reader the layer count
/// and the number of data codewords.
pub fn generate_mode_message(
    compact: bool,
    layers: usize,
    message_size_in_words: usize
) -> Result<BitBuffer, AztecError> {
    let mut mode_message = BitBuffer::new();
    let (layer_bits, size_bits, total_bits) = if compact { (2, 6, 28) } else { (5, 11, 40) };
    mode_message.append_bits((layers - 1) as u32, layer_bits);
    // Wraps to the field maximum for an empty message
    let size_field = (message_size_in_words as u32).wrapping_sub(1) & ((1 << size_bits) - 1);
    mode_message.append_bits(size_field, size_bits);
    generate_check_words(&mode_message, total_bits, 4)
}

/// Appends check words so the result fills exactly `total_bits`, left padded
/// with zeros up to a whole number of words.
fn generate_check_words(
    bits: &BitBuffer,
    total_bits: usize,
    word_size: u8
) -> Result<BitBuffer, AztecError> {
    let ws = usize::from(word_size);
    debug_assert_eq!(bits.len() % ws, 0);
    let field = GaloisField::for_word_size(word_size)?;
    let message_size_in_words = bits.len() / ws;
    let total_words = total_bits / ws;
    let mut message_words = bits_to_words(bits, word_size, total_words);
    let rs = ReedSolomonGenerator::new(&field, total_words - message_size_in_words);
    rs.encode(&mut message_words);
    let start_pad = total_bits % ws;
    let mut message_bits = BitBuffer::with_capacity(total_bits);
    message_bits.append_bits(0, start_pad as u8);
    for word in message_words {
        message_bits.append_bits(word.into(), word_size);
    }
    debug_assert_eq!(message_bits.len(), total_bits);
    Ok(message_bits)
}

fn bits_to_words(bits: &BitBuffer, word_size: u8, total_words: usize) -> Vec<u16> {
    let ws = usize::from(word_size);
    let mut message = vec![0u16; total_words];
    for (i, word) in message.iter_mut().enumerate().take(bits.len() / ws) {
        *word = bits.read_bits(i * ws, word_size) as u16;
    }
    message
}

fn base_matrix_size(compact: bool, layers: usize) -> usize {
    (if compact { 11 } else { 14 }) + layers * 4
}

fn matrix_size(compact: bool, base_matrix_size: usize) -> usize {
    if compact {
        base_matrix_size
    } else {
        base_matrix_size + 1 + 2 * ((base_matrix_size / 2 - 1) / 15)
    }
}

/// Maps positions of the gapless layout onto the matrix, leaving a free row
/// and column for the reference grid every 15 modules out from the center.
fn alignment_map(compact: bool, base_matrix_size: usize) -> Vec<usize> {
    if compact {
        return (0..base_matrix_size).collect();
    }
    let mut map = vec![0usize; base_matrix_size];
    let matrix_size = matrix_size(compact, base_matrix_size);
    let orig_center = base_matrix_size / 2;
    let center = matrix_size / 2;
    for i in 0..orig_center {
        let new_offset = i + i / 15;
        map[orig_center - i - 1] = center - new_offset - 1;
        map[orig_center + i] = center + new_offset + 1;
    }
    map
}

/// Lays the message out in two-module-wide rings, innermost layer first,
/// going around the top, right, bottom and left sides in turn.
fn draw_data(
    matrix: &mut BitMatrix,
    message_bits: &BitBuffer,
    alignment_map: &[usize],
    compact: bool,
    layers: usize
) {
    let base = alignment_map.len();
    let map = alignment_map;
    let mut row_offset = 0;
    for i in 0..layers {
        let row_size = (layers - i) * 4 + if compact { 9 } else { 12 };
        for j in 0..row_size {
            let column_offset = j * 2;
            for k in 0..2 {
                if message_bits.get(row_offset + column_offset + k) {
                    matrix.set(map[i * 2 + k], map[i * 2 + j]);
                }
                if message_bits.get(row_offset + row_size * 2 + column_offset + k) {
                    matrix.set(map[i * 2 + j], map[base - 1 - i * 2 - k]);
                }
                if message_bits.get(row_offset + row_size * 4 + column_offset + k) {
                    matrix.set(map[base - 1 - i * 2 - k], map[base - 1 - i * 2 - j]);
                }
                if message_bits.get(row_offset + row_size * 6 + column_offset + k) {
                    matrix.set(map[base - 1 - i * 2 - j], map[i * 2 + k]);
                }
            }
        }
        row_offset += row_size * 8;
    }
}

fn draw_bulls_eye(matrix: &mut BitMatrix, center: usize, size: usize) {
    for i in (0..size).step_by(2) {
        for j in center - i..=center + i {
            matrix.set(j, center - i);
            matrix.set(j, center + i);
            matrix.set(center - i, j);
            matrix.set(center + i, j);
        }
    }
    // Orientation marks
    matrix.set(center - size, center - size);
    matrix.set(center - size + 1, center - size);
    matrix.set(center - size, center - size + 1);
    matrix.set(center + size, center - size);
    matrix.set(center + size, center - size + 1);
    matrix.set(center + size, center + size - 1);
}

fn draw_mode_message(matrix: &mut BitMatrix, compact: bool, matrix_size: usize, mode_message: &BitBuffer) {
    let center = matrix_size / 2;
    if compact {
        for i in 0..7 {
            let offset = center - 3 + i;
            if mode_message.get(i) {
                matrix.set(offset, center - 5);
            }
            if mode_message.get(i + 7) {
                matrix.set(center + 5, offset);
            }
            if mode_message.get(20 - i) {
                matrix.set(offset, center + 5);
            }
            if mode_message.get(27 - i) {
                matrix.set(center - 5, offset);
            }
        }
    } else {
        for i in 0..10 {
            // Skips the reference grid line through the center
            let offset = center - 5 + i + i / 5;
            if mode_message.get(i) {
                matrix.set(offset, center - 7);
            }
            if mode_message.get(i + 10) {
                matrix.set(center + 7, offset);
            }
            if mode_message.get(29 - i) {
                matrix.set(offset, center + 7);
            }
            if mode_message.get(39 - i) {
                matrix.set(center - 7, offset);
            }
        }
    }
}

fn draw_reference_grid(matrix: &mut BitMatrix, base_matrix_size: usize, matrix_size: usize) {
    let center = matrix_size / 2;
    let lines = (0..base_matrix_size / 2 - 1).step_by(15).count();
    for j in (0..lines).map(|n| n * 16) {
        for k in ((center & 1)..matrix_size).step_by(2) {
            matrix.set(center - j, k);
            matrix.set(center + j, k);
            matrix.set(k, center - j);
            matrix.set(k, center + j);
        }
    }
}
