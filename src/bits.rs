//! Bit containers used by the encoder: a growable [`BitBuffer`] for the
//! encoded message and a fixed square [`BitMatrix`] for the finished symbol.

/// An appendable sequence of bits, packed most significant bit first.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity((bits + 7) / 8),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns bit `i`, counted from the first bit appended.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not less than [`len`](Self::len).
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.length, "Bit index out of range");
        get_bit(self.data[i >> 3].into(), 7 - ((i as u8) & 7))
    }

    /// Appends the low `len` bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 32 && (len == 32 || (val >> len) == 0));
        for i in (0..len).rev() {
            let shift: u8 = 7 - ((self.length as u8) & 7);
            let bit: u8 = ((val >> i) as u8) & 1;
            if shift == 7 {
                self.data.push(bit << shift);
            } else {
                let index: usize = self.length >> 3;
                self.data[index] |= bit << shift;
            }
            self.length += 1;
        }
    }

    pub fn append_bit(&mut self, bit: bool) {
        self.append_bits(u32::from(bit), 1);
    }

    /// Reads `len` bits starting at `offset` as an unsigned big-endian value.
    pub fn read_bits(&self, offset: usize, len: u8) -> u32 {
        (0..usize::from(len)).fold(0u32, |acc, j| (acc << 1) | u32::from(self.get(offset + j)))
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(move |i| self.get(i))
    }
}

impl core::fmt::Display for BitBuffer {
    /// Groups of eight, `X` for set and `.` for clear.
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for i in 0..self.length {
            if i > 0 && i % 8 == 0 {
                f.write_str(" ")?;
            }
            f.write_str(if self.get(i) { "X" } else { "." })?;
        }
        Ok(())
    }
}

/// A square grid of modules (`true` = dark), packed bitwise into bytes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BitMatrix {
    size: usize,
    modules: Vec<u8>,
}

impl BitMatrix {
    /// Creates an all-light matrix of `size` x `size` modules.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            modules: vec![0u8; (size * size + 7) / 8],
        }
    }

    pub fn width(&self) -> usize {
        self.size
    }

    pub fn height(&self) -> usize {
        self.size
    }

    /// Returns the color of the module at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates lie outside the matrix.
    pub fn get(&self, x: usize, y: usize) -> bool {
        let index = self.index(x, y);
        get_bit(self.modules[index >> 3].into(), (index & 7) as u8)
    }

    /// Like [`get`](Self::get), but coordinates outside the matrix read as light.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size as i32;
        range.contains(&x) && range.contains(&y) && self.get(x as usize, y as usize)
    }

    /// Marks the module at column `x`, row `y` dark.
    pub fn set(&mut self, x: usize, y: usize) {
        let index = self.index(x, y);
        self.modules[index >> 3] |= 1u8 << (index & 7);
    }

    pub fn unset(&mut self, x: usize, y: usize) {
        let index = self.index(x, y);
        self.modules[index >> 3] &= !(1u8 << (index & 7));
    }

    /// Number of dark modules.
    pub fn count_dark(&self) -> usize {
        self.modules.iter().map(|x| x.count_ones() as usize).sum()
    }

    fn index(&self, x: usize, y: usize) -> usize {
        let range = 0..self.size;
        assert!(range.contains(&x) && range.contains(&y), "Module out of range");
        y * self.size + x
    }
}

impl core::fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                f.write_str(if self.get(x, y) { "X " } else { "  " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub(crate) fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_back() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b101, 3);
        bb.append_bits(0xABCD, 16);
        bb.append_bit(true);
        assert_eq!(bb.len(), 20);
        assert_eq!(bb.read_bits(0, 3), 0b101);
        assert_eq!(bb.read_bits(3, 16), 0xABCD);
        assert!(bb.get(19));
    }

    #[test]
    fn test_display_groups_bytes() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b1000_0001_1, 9);
        assert_eq!(bb.to_string(), "X......X X");
    }

    #[test]
    fn test_matrix_set_get() {
        let mut m = BitMatrix::new(15);
        m.set(3, 7);
        m.set(14, 14);
        assert!(m.get(3, 7));
        assert!(!m.get(7, 3));
        assert!(m.get_module(14, 14));
        assert!(!m.get_module(-1, 0));
        assert!(!m.get_module(15, 0));
        m.unset(3, 7);
        assert!(!m.get(3, 7));
        assert_eq!(m.count_dark(), 1);
    }
}
