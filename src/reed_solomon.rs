/// Reed-Solomon error correction over GF(2^8).
///
/// Both matrix symbologies use the same remainder computation but disagree on
/// the field and on the generator roots: QR Code reduces by `x^8 + x^4 + x^3 +
/// x^2 + 1` (0x11D) and starts at `α^0`, Data Matrix reduces by `x^8 + x^5 +
/// x^3 + x^2 + 1` (0x12D) and starts at `α^1`.

/// Finite field parameters for a Reed-Solomon code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Reducing polynomial including the `x^8` term.
    pub polynomial: u16,
    /// Exponent of the first generator root.
    pub first_root: u8,
}

impl Field {
    /// `x^8 + x^4 + x^3 + x^2 + 1`, roots from α^0.
    pub const QR_CODE: Field = Field {
        polynomial: 0x11D,
        first_root: 0,
    };

    /// `x^8 + x^5 + x^3 + x^2 + 1`, roots from α^1.
    pub const DATA_MATRIX: Field = Field {
        polynomial: 0x12D,
        first_root: 1,
    };

    fn multiply(self, x: u8, y: u8) -> u8 {
        // Russian peasant multiplication, reducing after every shift
        let reduce = (self.polynomial & 0xFF) as u8;
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * reduce);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

/// Computes error correction codewords for one block of data.
pub struct ReedSolomonGenerator {
    field: Field,
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Largest block of error correction codewords used by either symbology.
    pub const MAX_DEGREE: usize = 68;

    /// Builds the generator polynomial of the given degree.
    ///
    /// # Panics
    ///
    /// Panics if `degree` is outside `1..=68`.
    pub fn new(field: Field, degree: usize) -> Self {
        assert!(
            (1..=Self::MAX_DEGREE).contains(&degree),
            "Degree out of range"
        );
        // Coefficients from highest to lowest power, leading 1 omitted
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;

        let mut root: u8 = 1;
        for _ in 0..field.first_root {
            root = field.multiply(root, 0x02);
        }
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = field.multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = field.multiply(root, 0x02);
        }
        Self { field, divisor }
    }

    /// Number of error correction codewords produced per block.
    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Returns the error correction codewords for `data`.
    pub fn remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.divisor.len()];
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            let last = result.len() - 1;
            result[last] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= self.field.multiply(y, factor);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_matrix_reference_codewords() {
        // "123456" in a 10x10 symbol
        let rs = ReedSolomonGenerator::new(Field::DATA_MATRIX, 5);
        assert_eq!(rs.remainder(&[142, 164, 186]), vec![114, 25, 5, 88, 102]);
    }

    #[test]
    fn remainder_of_zero_data_is_zero() {
        let rs = ReedSolomonGenerator::new(Field::QR_CODE, 10);
        assert_eq!(rs.remainder(&[0; 16]), vec![0; 10]);
        assert_eq!(rs.degree(), 10);
    }

    #[test]
    fn multiply_by_one_is_identity() {
        for field in [Field::QR_CODE, Field::DATA_MATRIX] {
            for x in 0..=255u8 {
                assert_eq!(field.multiply(x, 1), x);
            }
        }
    }

    #[test]
    #[should_panic(expected = "Degree out of range")]
    fn rejects_zero_degree() {
        ReedSolomonGenerator::new(Field::QR_CODE, 0);
    }
}
