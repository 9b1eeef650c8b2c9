//! Data Matrix ECC 200 encoding.
//!
//! Square symbols only, from 10×10 to 144×144 modules, with ASCII encodation. Digit pairs are
//! packed into a single codeword and bytes above 127 go through the upper shift.

use crate::error::{Error, Result};
use crate::reed_solomon::{Field, ReedSolomonGenerator};
use crate::symbology;

const PAD: u8 = 129;
const UPPER_SHIFT: u8 = 235;
const ECI: u8 = 241;
/// ECI 000026 (UTF-8); assignments below 127 are written as value + 1.
const ECI_UTF8: u8 = 27;

/// A Data Matrix symbol including its finder and timing borders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataMatrix {
    size: usize,
    modules: Vec<bool>,
}

#[derive(Clone, Copy, Debug)]
struct SymbolSize {
    /// Modules per side including borders.
    size: usize,
    /// Data modules per region side.
    region: usize,
    /// Regions per side.
    regions: usize,
    data_codewords: usize,
    ecc_codewords: usize,
    blocks: usize,
}

const fn symbol(
    size: usize,
    region: usize,
    regions: usize,
    data_codewords: usize,
    ecc_codewords: usize,
    blocks: usize,
) -> SymbolSize {
    SymbolSize {
        size,
        region,
        regions,
        data_codewords,
        ecc_codewords,
        blocks,
    }
}

static SYMBOL_SIZES: [SymbolSize; 24] = [
    symbol(10, 8, 1, 3, 5, 1),
    symbol(12, 10, 1, 5, 7, 1),
    symbol(14, 12, 1, 8, 10, 1),
    symbol(16, 14, 1, 12, 12, 1),
    symbol(18, 16, 1, 18, 14, 1),
    symbol(20, 18, 1, 22, 18, 1),
    symbol(22, 20, 1, 30, 20, 1),
    symbol(24, 22, 1, 36, 24, 1),
    symbol(26, 24, 1, 44, 28, 1),
    symbol(32, 14, 2, 62, 36, 1),
    symbol(36, 16, 2, 86, 42, 1),
    symbol(40, 18, 2, 114, 48, 1),
    symbol(44, 20, 2, 144, 56, 1),
    symbol(48, 22, 2, 174, 68, 1),
    symbol(52, 24, 2, 204, 84, 2),
    symbol(64, 14, 4, 280, 112, 2),
    symbol(72, 16, 4, 368, 144, 4),
    symbol(80, 18, 4, 456, 192, 4),
    symbol(88, 20, 4, 576, 224, 4),
    symbol(96, 22, 4, 696, 272, 4),
    symbol(104, 24, 4, 816, 336, 6),
    symbol(120, 18, 6, 1050, 408, 6),
    symbol(132, 20, 6, 1304, 496, 8),
    symbol(144, 22, 6, 1558, 620, 10),
];

impl DataMatrix {
    /// Encodes `text` into the smallest square symbol that holds it.
    ///
    /// Text that fits ISO-8859-1, the default character set of readers, is written as such.
    /// Anything else is written as UTF-8 behind an ECI designator.
    pub fn encode_text(text: &str) -> Result<Self> {
        DataMatrix::from_codewords(text_codewords(text))
    }

    /// Encodes raw bytes, which readers interpret as ISO-8859-1.
    pub fn encode_bytes(data: &[u8]) -> Result<Self> {
        DataMatrix::from_codewords(encode_ascii(data))
    }

    fn from_codewords(mut codewords: Vec<u8>) -> Result<Self> {
        let layout = SYMBOL_SIZES
            .iter()
            .find(|s| s.data_codewords >= codewords.len())
            .ok_or_else(|| {
                Error::DataTooLong(format!(
                    "{} codewords, Data Matrix holds at most {}",
                    codewords.len(),
                    SYMBOL_SIZES[SYMBOL_SIZES.len() - 1].data_codewords
                ))
            })?;
        pad(&mut codewords, layout.data_codewords);
        let all = add_ecc_and_interleave(&codewords, layout);

        let mapping = Placement::run(&all, layout.region * layout.regions);
        Ok(DataMatrix::assemble(layout, &mapping))
    }

    /// Modules per side, borders included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` for dark modules. Coordinates outside the symbol are light.
    pub fn get_module(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    fn assemble(layout: &SymbolSize, mapping: &[bool]) -> Self {
        let size = layout.size;
        let block = layout.region + 2;
        let mut modules = vec![false; size * size];

        for y in 0..size {
            for x in 0..size {
                let (by, bx) = (y % block, x % block);
                modules[y * size + x] = if bx == 0 || by == block - 1 {
                    // Solid L finder
                    true
                } else if by == 0 {
                    bx % 2 == 0
                } else if bx == block - 1 {
                    by % 2 == 1
                } else {
                    let row = (y / block) * layout.region + by - 1;
                    let col = (x / block) * layout.region + bx - 1;
                    mapping[row * layout.region * layout.regions + col]
                };
            }
        }
        DataMatrix { size, modules }
    }
}

fn text_codewords(text: &str) -> Vec<u8> {
    match symbology::latin1(text) {
        Some(bytes) => encode_ascii(&bytes),
        None => {
            let mut codewords = vec![ECI, ECI_UTF8];
            codewords.extend(encode_ascii(text.as_bytes()));
            codewords
        }
    }
}

fn encode_ascii(data: &[u8]) -> Vec<u8> {
    let mut codewords = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        match data.get(i + 1) {
            Some(&next) if b.is_ascii_digit() && next.is_ascii_digit() => {
                codewords.push(130 + (b - b'0') * 10 + (next - b'0'));
                i += 2;
                continue;
            }
            _ => {}
        }
        if b < 128 {
            codewords.push(b + 1);
        } else {
            codewords.push(UPPER_SHIFT);
            codewords.push(b - 127);
        }
        i += 1;
    }
    codewords
}

fn pad(codewords: &mut Vec<u8>, capacity: usize) {
    if codewords.len() < capacity {
        codewords.push(PAD);
    }
    while codewords.len() < capacity {
        // 253-state randomization of the position (1-based)
        let position = codewords.len() + 1;
        let pseudo_random = (149 * position) % 253 + 1;
        let mut value = usize::from(PAD) + pseudo_random;
        if value > 254 {
            value -= 254;
        }
        codewords.push(value as u8);
    }
}

fn add_ecc_and_interleave(data: &[u8], layout: &SymbolSize) -> Vec<u8> {
    let blocks = layout.blocks;
    let ecc_per_block = layout.ecc_codewords / blocks;
    let rs = ReedSolomonGenerator::new(Field::DATA_MATRIX, ecc_per_block);

    let mut result = Vec::with_capacity(data.len() + layout.ecc_codewords);
    result.extend_from_slice(data);
    result.resize(data.len() + layout.ecc_codewords, 0);

    for b in 0..blocks {
        let block: Vec<u8> = data.iter().skip(b).step_by(blocks).copied().collect();
        for (j, cw) in rs.remainder(&block).into_iter().enumerate() {
            result[data.len() + j * blocks + b] = cw;
        }
    }
    result
}

/// The ECC 200 module placement over the mapping matrix (data regions without borders).
struct Placement<'a> {
    nrow: isize,
    ncol: isize,
    grid: Vec<Option<bool>>,
    codewords: &'a [u8],
}

impl<'a> Placement<'a> {
    fn run(codewords: &'a [u8], side: usize) -> Vec<bool> {
        let mut p = Placement {
            nrow: side as isize,
            ncol: side as isize,
            grid: vec![None; side * side],
            codewords,
        };
        let (nrow, ncol) = (p.nrow, p.ncol);

        let mut chr: usize = 0;
        let mut row: isize = 4;
        let mut col: isize = 0;
        loop {
            if row == nrow && col == 0 {
                p.corner(chr, &CORNER_1);
                chr += 1;
            }
            if row == nrow - 2 && col == 0 && ncol % 4 != 0 {
                p.corner(chr, &CORNER_2);
                chr += 1;
            }
            if row == nrow - 2 && col == 0 && ncol % 8 == 4 {
                p.corner(chr, &CORNER_3);
                chr += 1;
            }
            if row == nrow + 4 && col == 2 && ncol % 8 == 0 {
                p.corner(chr, &CORNER_4);
                chr += 1;
            }

            // Sweep up and to the right
            loop {
                if row < nrow && col >= 0 && p.is_unset(row, col) {
                    p.utah(row, col, chr);
                    chr += 1;
                }
                row -= 2;
                col += 2;
                if !(row >= 0 && col < ncol) {
                    break;
                }
            }
            row += 1;
            col += 3;

            // Sweep down and to the left
            loop {
                if row >= 0 && col < ncol && p.is_unset(row, col) {
                    p.utah(row, col, chr);
                    chr += 1;
                }
                row += 2;
                col -= 2;
                if !(row < nrow && col >= 0) {
                    break;
                }
            }
            row += 3;
            col += 1;

            if !(row < nrow || col < ncol) {
                break;
            }
        }

        // Fixed pattern in the lower right corner when it was left untouched
        if p.is_unset(nrow - 1, ncol - 1) {
            p.set(nrow - 1, ncol - 1, true);
            p.set(nrow - 2, ncol - 2, true);
            p.set(nrow - 1, ncol - 2, false);
            p.set(nrow - 2, ncol - 1, false);
        }

        p.grid.into_iter().map(|m| m.unwrap_or(false)).collect()
    }

    fn is_unset(&self, row: isize, col: isize) -> bool {
        (0..self.nrow).contains(&row)
            && (0..self.ncol).contains(&col)
            && self.grid[(row * self.ncol + col) as usize].is_none()
    }

    fn set(&mut self, row: isize, col: isize, dark: bool) {
        let idx = (row * self.ncol + col) as usize;
        self.grid[idx] = Some(dark);
    }

    /// Places bit `bit` (1 is the most significant) of codeword `chr`, wrapping around the edges.
    fn module(&mut self, mut row: isize, mut col: isize, chr: usize, bit: u8) {
        if row < 0 {
            row += self.nrow;
            col += 4 - ((self.nrow + 4) % 8);
        }
        if col < 0 {
            col += self.ncol;
            row += 4 - ((self.ncol + 4) % 8);
        }
        let dark = self
            .codewords
            .get(chr)
            .map_or(false, |cw| (cw >> (8 - bit)) & 1 == 1);
        self.set(row, col, dark);
    }

    fn utah(&mut self, row: isize, col: isize, chr: usize) {
        self.module(row - 2, col - 2, chr, 1);
        self.module(row - 2, col - 1, chr, 2);
        self.module(row - 1, col - 2, chr, 3);
        self.module(row - 1, col - 1, chr, 4);
        self.module(row - 1, col, chr, 5);
        self.module(row, col - 2, chr, 6);
        self.module(row, col - 1, chr, 7);
        self.module(row, col, chr, 8);
    }

    fn corner(&mut self, chr: usize, layout: &[CornerModule; 8]) {
        for (bit, &(r, c)) in (1u8..).zip(layout.iter()) {
            let row = r.resolve(self.nrow);
            let col = c.resolve(self.ncol);
            self.module(row, col, chr, bit);
        }
    }
}

/// Offset measured from the start or back from the end of an axis.
#[derive(Clone, Copy)]
enum Edge {
    Start(isize),
    End(isize),
}

impl Edge {
    fn resolve(self, len: isize) -> isize {
        match self {
            Edge::Start(n) => n,
            Edge::End(n) => len - n,
        }
    }
}

type CornerModule = (Edge, Edge);

use Edge::{End, Start};

const CORNER_1: [CornerModule; 8] = [
    (End(1), Start(0)),
    (End(1), Start(1)),
    (End(1), Start(2)),
    (Start(0), End(2)),
    (Start(0), End(1)),
    (Start(1), End(1)),
    (Start(2), End(1)),
    (Start(3), End(1)),
];

const CORNER_2: [CornerModule; 8] = [
    (End(3), Start(0)),
    (End(2), Start(0)),
    (End(1), Start(0)),
    (Start(0), End(4)),
    (Start(0), End(3)),
    (Start(0), End(2)),
    (Start(0), End(1)),
    (Start(1), End(1)),
];

const CORNER_3: [CornerModule; 8] = [
    (End(3), Start(0)),
    (End(2), Start(0)),
    (End(1), Start(0)),
    (Start(0), End(2)),
    (Start(0), End(1)),
    (Start(1), End(1)),
    (Start(2), End(1)),
    (Start(3), End(1)),
];

const CORNER_4: [CornerModule; 8] = [
    (End(1), Start(0)),
    (End(1), End(1)),
    (Start(0), End(3)),
    (Start(0), End(2)),
    (Start(0), End(1)),
    (Start(1), End(3)),
    (Start(1), End(2)),
    (Start(1), End(1)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_encodation_packs_digit_pairs() {
        assert_eq!(encode_ascii(b"123456"), vec![142, 164, 186]);
        assert_eq!(encode_ascii(b"A1"), vec![66, 50]);
        assert_eq!(encode_ascii(b"12A"), vec![142, 66]);
        assert_eq!(encode_ascii(&[0xE9]), vec![UPPER_SHIFT, 0xE9 - 127]);
    }

    #[test]
    fn latin1_text_avoids_utf8_bytes() {
        // é is a single upper-shifted byte, not the two UTF-8 bytes C3 A9
        assert_eq!(
            text_codewords("héllo"),
            vec![105, UPPER_SHIFT, 0xE9 - 127, 109, 109, 112]
        );
        assert_eq!(
            DataMatrix::encode_text("héllo").unwrap(),
            DataMatrix::encode_bytes(b"h\xe9llo").unwrap()
        );
    }

    #[test]
    fn other_text_is_utf8_behind_eci() {
        // € is E2 82 AC in UTF-8
        assert_eq!(
            text_codewords("h€"),
            vec![ECI, ECI_UTF8, 105, UPPER_SHIFT, 99, UPPER_SHIFT, 3, UPPER_SHIFT, 45]
        );
        assert_eq!(text_codewords("plain 12"), encode_ascii(b"plain 12"));
    }

    #[test]
    fn padding_is_randomized_after_first_pad() {
        let mut cw = vec![66];
        pad(&mut cw, 5);
        assert_eq!(cw[1], PAD);
        // position 3: 149 * 3 % 253 + 1 = 195, 129 + 195 - 254 = 70
        assert_eq!(cw[2], 70);
        assert_eq!(cw.len(), 5);
    }

    #[test]
    fn reference_symbol_codewords() {
        let layout = &SYMBOL_SIZES[0];
        let all = add_ecc_and_interleave(&encode_ascii(b"123456"), layout);
        assert_eq!(all, vec![142, 164, 186, 114, 25, 5, 88, 102]);
    }

    #[test]
    fn picks_smallest_symbol() {
        assert_eq!(DataMatrix::encode_text("123456").unwrap().size(), 10);
        assert_eq!(DataMatrix::encode_text("ABCD").unwrap().size(), 12);
        assert_eq!(DataMatrix::encode_text("").unwrap().size(), 10);
        assert_eq!(DataMatrix::encode_text(&"x".repeat(100)).unwrap().size(), 40);
    }

    #[test]
    fn finder_and_timing_borders() {
        let dm = DataMatrix::encode_text("www.codekraft.it").unwrap();
        let n = dm.size();
        for i in 0..n {
            assert!(dm.get_module(0, i), "left edge");
            assert!(dm.get_module(i, n - 1), "bottom edge");
            assert_eq!(dm.get_module(i, 0), i % 2 == 0, "top timing");
            assert_eq!(dm.get_module(n - 1, i), i % 2 == 1, "right timing");
        }
    }

    #[test]
    fn multi_region_symbols_have_inner_borders() {
        let dm = DataMatrix::encode_text(&"A".repeat(60)).unwrap();
        assert_eq!(dm.size(), 32);
        // Region blocks are 16 wide: column 16 is the left finder of the second block
        for y in 0..32 {
            assert!(dm.get_module(16, y));
            assert!(dm.get_module(y, 15));
        }
    }

    #[test]
    fn placement_fills_every_module() {
        for layout in &SYMBOL_SIZES[..4] {
            let side = layout.region * layout.regions;
            let cws = vec![0xFF; layout.data_codewords + layout.ecc_codewords];
            let grid = Placement::run(&cws, side);
            let dark = grid.iter().filter(|&&m| m).count();
            // All-ones codewords darken every data module; only the unused corner pattern has light ones
            assert!(dark >= side * side - 2, "{} of {}", dark, side * side);
        }
    }

    #[test]
    fn too_much_data_is_rejected() {
        let err = DataMatrix::encode_text(&"x".repeat(2000)).unwrap_err();
        assert!(matches!(err, Error::DataTooLong(_)));
    }
}
