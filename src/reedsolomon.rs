//! Reed-Solomon check words over the Galois fields used by Aztec.
//!
//! Aztec protects its mode message with 4-bit words and its data with 6, 8,
//! 10 or 12-bit words depending on the layer count. Every field uses the
//! primitive element 2 and a generator polynomial whose roots start at α¹.

use crate::error::AztecError;

/// Word size in bits paired with the field's primitive polynomial.
static FIELD_POLYNOMIALS: [(u8, u32); 5] = [
    (4, 0x13),     // x^4 + x + 1 (mode message)
    (6, 0x43),     // x^6 + x + 1
    (8, 0x12d),    // x^8 + x^5 + x^3 + x^2 + 1
    (10, 0x409),   // x^10 + x^3 + 1
    (12, 0x1069),  // x^12 + x^6 + x^5 + x^3 + 1
];

/// A GF(2^n) field with precomputed exponent and logarithm tables.
#[derive(Clone, Debug)]
pub struct GaloisField {
    word_size: u8,
    exp: Vec<u16>,
    log: Vec<u16>,
}

impl GaloisField {
    /// Returns the field Aztec uses for codewords of `word_size` bits.
    ///
    /// Fails with [`AztecError::InvalidArgument`] for any size other than
    /// 4, 6, 8, 10 or 12.
    pub fn for_word_size(word_size: u8) -> Result<Self, AztecError> {
        FIELD_POLYNOMIALS
            .iter()
            .find(|&&(ws, _)| ws == word_size)
            .map(|&(ws, poly)| Self::new(ws, poly))
            .ok_or_else(|| AztecError::InvalidArgument(format!("Unsupported word size {}", word_size)))
    }

    fn new(word_size: u8, primitive: u32) -> Self {
        let size: usize = 1 << word_size;
        let mut exp = vec![0u16; size];
        let mut log = vec![0u16; size];
        let mut x: u32 = 1;
        for i in 0..size {
            exp[i] = x as u16;
            x <<= 1;
            if x as usize >= size {
                x ^= primitive;
            }
        }
        for i in 0..size - 1 {
            log[usize::from(exp[i])] = i as u16;
        }
        Self { word_size, exp, log }
    }

    pub fn word_size(&self) -> u8 {
        self.word_size
    }

    /// Number of elements, `2^word_size`.
    pub fn size(&self) -> usize {
        self.exp.len()
    }

    /// Returns α^`power`.
    pub fn exp(&self, power: usize) -> u16 {
        self.exp[power % (self.size() - 1)]
    }

    pub fn multiply(&self, x: u16, y: u16) -> u16 {
        if x == 0 || y == 0 {
            return 0;
        }
        let order = self.size() - 1;
        let power = usize::from(self.log[usize::from(x)]) + usize::from(self.log[usize::from(y)]);
        self.exp[power % order]
    }
}

/// Computes Reed-Solomon remainders for a fixed number of check words.
pub struct ReedSolomonGenerator<'f> {
    field: &'f GaloisField,
    divisor: Vec<u16>,
}

impl<'f> ReedSolomonGenerator<'f> {
    /// Builds the generator polynomial `(x - α¹)(x - α²)…(x - α^degree)`.
    pub fn new(field: &'f GaloisField, degree: usize) -> Self {
        assert!(degree < field.size(), "Degree out of range");
        let mut divisor = vec![0u16; degree];
        if degree > 0 {
            // Coefficients from highest to lowest power, leading 1 omitted
            divisor[degree - 1] = 1;
            let mut root: u16 = field.exp(1);
            for _ in 0..degree {
                for j in 0..degree {
                    divisor[j] = field.multiply(divisor[j], root);
                    if j + 1 < degree {
                        divisor[j] ^= divisor[j + 1];
                    }
                }
                root = field.multiply(root, field.exp(1));
            }
        }
        Self { field, divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Writes the check words for `data` into `result`, which must hold
    /// exactly [`degree`](Self::degree) words.
    pub fn compute_remainder(&self, data: &[u16], result: &mut [u16]) {
        assert_eq!(result.len(), self.degree());
        result.fill(0);
        if result.is_empty() {
            return;
        }
        for &b in data {
            let factor: u16 = b ^ result[0];
            result.copy_within(1.., 0);
            result[result.len() - 1] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= self.field.multiply(y, factor);
            }
        }
    }

    /// Fills the last `degree` entries of `words` with check words computed
    /// over the entries before them.
    pub fn encode(&self, words: &mut [u16]) {
        assert!(words.len() >= self.degree());
        let (data, ecc) = words.split_at_mut(words.len() - self.degree());
        self.compute_remainder(data, ecc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Evaluates the codeword polynomial (highest power first) at `x`.
    fn evaluate(field: &GaloisField, words: &[u16], x: u16) -> u16 {
        words.iter().fold(0, |acc, &w| field.multiply(acc, x) ^ w)
    }

    #[test]
    fn test_unsupported_word_size() {
        assert!(matches!(GaloisField::for_word_size(7), Err(AztecError::InvalidArgument(_))));
        assert!(GaloisField::for_word_size(0).is_err());
    }

    #[test]
    fn test_field_tables_cover_every_nonzero_element() {
        for &(ws, _) in FIELD_POLYNOMIALS.iter() {
            let field = GaloisField::for_word_size(ws).unwrap();
            let mut seen = vec![false; field.size()];
            for i in 0..field.size() - 1 {
                seen[usize::from(field.exp(i))] = true;
            }
            assert!(!seen[0]);
            assert!(seen[1..].iter().all(|&s| s), "field {} is not primitive", ws);
        }
    }

    #[test]
    fn test_multiply_matches_shift_and_add() {
        let field = GaloisField::for_word_size(8).unwrap();
        for x in [0u16, 1, 2, 0x53, 0xca, 0xff] {
            for y in [0u16, 1, 3, 0x80, 0xfe] {
                let mut z: u32 = 0;
                for i in (0..8).rev() {
                    z <<= 1;
                    if z & 0x100 != 0 {
                        z ^= 0x12d;
                    }
                    z ^= ((u32::from(y) >> i) & 1) * u32::from(x);
                }
                assert_eq!(field.multiply(x, y), z as u16);
            }
        }
    }

    #[test]
    fn test_eight_bit_check_words() {
        // The 8-bit Aztec field is shared with Data Matrix; these are the
        // codewords of "AIMAIM" in a 12x12 data region.
        let field = GaloisField::for_word_size(8).unwrap();
        let rs = ReedSolomonGenerator::new(&field, 10);
        let mut words: Vec<u16> = vec![66, 74, 78, 66, 74, 78, 129, 56, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        rs.encode(&mut words);
        assert_eq!(
            words,
            vec![66, 74, 78, 66, 74, 78, 129, 56, 35, 102, 192, 96, 226, 100, 156, 1, 107, 221]
        );

        let rs = ReedSolomonGenerator::new(&field, 5);
        let mut ecc = [0u16; 5];
        rs.compute_remainder(&[142, 164, 186], &mut ecc);
        assert_eq!(ecc, [114, 25, 5, 88, 102]);
    }

    #[test]
    fn test_codewords_vanish_at_generator_roots() {
        for &(ws, _) in FIELD_POLYNOMIALS.iter() {
            let field = GaloisField::for_word_size(ws).unwrap();
            let mask = (field.size() - 1) as u16;
            let degree = 7;
            let rs = ReedSolomonGenerator::new(&field, degree);
            let mut words: Vec<u16> = (0..20u16).map(|i| (i * 37 + 5) & mask).collect();
            words.extend(std::iter::repeat(0).take(degree));
            rs.encode(&mut words);
            for i in 1..=degree {
                assert_eq!(evaluate(&field, &words, field.exp(i)), 0, "word size {} root {}", ws, i);
            }
        }
    }

    #[test]
    fn test_zero_degree_is_noop() {
        let field = GaloisField::for_word_size(4).unwrap();
        let rs = ReedSolomonGenerator::new(&field, 0);
        let mut words = [3u16, 4];
        rs.encode(&mut words);
        assert_eq!(words, [3, 4]);
    }
}
