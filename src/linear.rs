//! 1D barcodes: UPC-A, EAN-8, EAN-13, Code 128 and Codabar.

use crate::error::{Error, Result};
use crate::symbology::Format;

/// A run of unit-width modules (`true` is a bar) and the text printed under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bars {
    modules: Vec<bool>,
    text: String,
}

impl Bars {
    /// Modules from the first bar to the last, `true` is a bar. No quiet zone.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Human readable text, with any computed check digit.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Widths of alternating bar/space runs, starting with a bar.
    pub fn runs(&self) -> Vec<(bool, usize)> {
        let mut runs: Vec<(bool, usize)> = Vec::new();
        for &m in &self.modules {
            match runs.last_mut() {
                Some((dark, len)) if *dark == m => *len += 1,
                _ => runs.push((m, 1)),
            }
        }
        runs
    }
}

/// Encodes `text` with one of the 1D formats.
///
/// # Panics
///
/// Panics if `format` is a 2D symbology.
pub fn encode(format: Format, text: &str) -> Result<Bars> {
    match format {
        Format::Ean13 => ean13(text),
        Format::Ean8 => ean8(text),
        Format::Upc => upc_a(text),
        Format::Code128 => code128(text),
        Format::Codabar => codabar(text),
        Format::QrCode | Format::DataMatrix => panic!("{format} is not a linear symbology"),
    }
}

fn invalid(format: Format, reason: impl Into<String>) -> Error {
    Error::InvalidContents {
        format,
        reason: reason.into(),
    }
}

fn push_pattern(modules: &mut Vec<bool>, pattern: &str) {
    modules.extend(pattern.bytes().map(|b| b == b'1'));
}

/* ---- EAN / UPC ---- */

static EAN_L: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];

static EAN_G: [&str; 10] = [
    "0100111", "0110011", "0011011", "0100001", "0011101", "0111001", "0000101", "0010001",
    "0001001", "0010111",
];

static EAN_R: [&str; 10] = [
    "1110010", "1100110", "1101100", "1000010", "1011100", "1001110", "1010000", "1000100",
    "1001000", "1110100",
];

/// L/G parity of the left half, selected by the implicit first digit of an EAN-13.
static EAN13_PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

const GUARD: &str = "101";
const CENTER_GUARD: &str = "01010";

/// Modulo 10 check digit with weights 3, 1, 3, ... from the rightmost data digit.
pub fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Parses `text` as `data_len` digits (check digit appended) or `data_len + 1` digits (verified).
fn digits_with_check(format: Format, text: &str, data_len: usize) -> Result<Vec<u8>> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format, "only digits are allowed"));
    }
    let mut digits: Vec<u8> = text.bytes().map(|b| b - b'0').collect();
    if digits.len() == data_len {
        digits.push(check_digit(&digits));
        Ok(digits)
    } else if digits.len() == data_len + 1 {
        let expected = check_digit(&digits[..data_len]);
        if digits[data_len] == expected {
            Ok(digits)
        } else {
            Err(invalid(
                format,
                format!("check digit should be {expected}, got {}", digits[data_len]),
            ))
        }
    } else {
        Err(invalid(
            format,
            format!("expected {} or {} digits, got {}", data_len, data_len + 1, digits.len()),
        ))
    }
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

fn ean13(text: &str) -> Result<Bars> {
    let digits = digits_with_check(Format::Ean13, text, 12)?;
    Ok(Bars {
        modules: ean13_modules(&digits),
        text: digits_to_string(&digits),
    })
}

fn ean13_modules(digits: &[u8]) -> Vec<bool> {
    let parity = EAN13_PARITY[usize::from(digits[0])].as_bytes();
    let mut modules = Vec::with_capacity(95);
    push_pattern(&mut modules, GUARD);
    for (i, &d) in digits[1..7].iter().enumerate() {
        let table = if parity[i] == b'L' { &EAN_L } else { &EAN_G };
        push_pattern(&mut modules, table[usize::from(d)]);
    }
    push_pattern(&mut modules, CENTER_GUARD);
    for &d in &digits[7..13] {
        push_pattern(&mut modules, EAN_R[usize::from(d)]);
    }
    push_pattern(&mut modules, GUARD);
    modules
}

fn ean8(text: &str) -> Result<Bars> {
    let digits = digits_with_check(Format::Ean8, text, 7)?;
    let mut modules = Vec::with_capacity(67);
    push_pattern(&mut modules, GUARD);
    for &d in &digits[..4] {
        push_pattern(&mut modules, EAN_L[usize::from(d)]);
    }
    push_pattern(&mut modules, CENTER_GUARD);
    for &d in &digits[4..] {
        push_pattern(&mut modules, EAN_R[usize::from(d)]);
    }
    push_pattern(&mut modules, GUARD);
    Ok(Bars {
        modules,
        text: digits_to_string(&digits),
    })
}

fn upc_a(text: &str) -> Result<Bars> {
    let digits = digits_with_check(Format::Upc, text, 11)?;
    // UPC-A is an EAN-13 with a leading zero, which selects all-L parity
    let mut ean = Vec::with_capacity(13);
    ean.push(0);
    ean.extend_from_slice(&digits);
    Ok(Bars {
        modules: ean13_modules(&ean),
        text: digits_to_string(&digits),
    })
}

/* ---- Code 128 ---- */

static CODE128_PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CodeSet {
    A,
    B,
    C,
}

impl CodeSet {
    fn start(self) -> u8 {
        match self {
            CodeSet::A => START_A,
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }
    }

    fn switch(self) -> u8 {
        match self {
            CodeSet::A => CODE_A,
            CodeSet::B => CODE_B,
            CodeSet::C => CODE_C,
        }
    }

    /// Symbol value of an ASCII byte in set A or B.
    fn value(self, b: u8) -> Option<u8> {
        match (self, b) {
            (CodeSet::A, 0..=31) => Some(b + 64),
            (CodeSet::A, 32..=95) | (CodeSet::B, 32..=127) => Some(b - 32),
            _ => None,
        }
    }
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Set A or B for the next character, preferring the one that covers more of what follows.
fn letter_set(bytes: &[u8]) -> CodeSet {
    for &b in bytes {
        if b < 32 {
            return CodeSet::A;
        }
        if b >= 96 {
            return CodeSet::B;
        }
    }
    CodeSet::B
}

/// Symbol values between start and checksum, code sets chosen automatically.
fn code128_values(bytes: &[u8]) -> (CodeSet, Vec<u8>) {
    let leading_digits = digit_run(bytes);
    let start = if leading_digits >= 4 && (leading_digits % 2 == 0 || leading_digits == bytes.len()) {
        CodeSet::C
    } else if leading_digits >= 4 {
        // An odd run is split so set C gets the even tail
        letter_set(&bytes[1..])
    } else {
        letter_set(bytes)
    };

    let mut set = start;
    let mut values = Vec::with_capacity(bytes.len() + 4);
    let mut i = 0;
    while i < bytes.len() {
        let run = digit_run(&bytes[i..]);
        if set == CodeSet::C {
            if run >= 2 {
                values.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                i += 2;
                continue;
            }
            set = letter_set(&bytes[i..]);
            values.push(set.switch());
            continue;
        }
        if run >= 4 && run % 2 == 0 {
            set = CodeSet::C;
            values.push(CODE_C);
            continue;
        }
        let b = bytes[i];
        match set.value(b) {
            Some(v) => values.push(v),
            None => {
                set = if set == CodeSet::A { CodeSet::B } else { CodeSet::A };
                values.push(set.switch());
                continue;
            }
        }
        i += 1;
    }

    (start, values)
}

fn code128(text: &str) -> Result<Bars> {
    if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
        return Err(invalid(Format::Code128, format!("character {c:?} is not ASCII")));
    }
    let bytes = text.as_bytes();
    let (start, values) = code128_values(bytes);

    let checksum = values
        .iter()
        .enumerate()
        .fold(u32::from(start.start()), |acc, (i, &v)| {
            acc + u32::from(v) * (i as u32 + 1)
        })
        % 103;

    let mut modules = Vec::with_capacity((values.len() + 3) * 11 + 2);
    let symbols = std::iter::once(start.start())
        .chain(values.iter().copied())
        .chain([checksum as u8, STOP]);
    for value in symbols {
        push_widths(&mut modules, CODE128_PATTERNS[usize::from(value)]);
    }
    Ok(Bars {
        modules,
        text: text.to_string(),
    })
}

/// Expands a bar/space width string, starting with a bar.
fn push_widths(modules: &mut Vec<bool>, widths: &str) {
    for (i, w) in widths.bytes().enumerate() {
        let dark = i % 2 == 0;
        modules.extend(std::iter::repeat(dark).take(usize::from(w - b'0')));
    }
}

/* ---- Codabar ---- */

fn codabar_pattern(c: u8) -> Option<&'static str> {
    Some(match c {
        b'0' => "101010011",
        b'1' => "101011001",
        b'2' => "101001011",
        b'3' => "110010101",
        b'4' => "101101001",
        b'5' => "110101001",
        b'6' => "100101011",
        b'7' => "100101101",
        b'8' => "100110101",
        b'9' => "110100101",
        b'-' => "101001101",
        b'$' => "101100101",
        b':' => "1101011011",
        b'/' => "1101101011",
        b'.' => "1101101101",
        b'+' => "1011011011",
        b'A' => "1011001001",
        b'B' => "1001001011",
        b'C' => "1010010011",
        b'D' => "1010011001",
        _ => return None,
    })
}

fn is_codabar_data(b: u8) -> bool {
    b.is_ascii_digit() || b"-$:/.+".contains(&b)
}

fn is_codabar_guard(b: u8) -> bool {
    (b'A'..=b'D').contains(&b)
}

fn codabar(text: &str) -> Result<Bars> {
    let upper = text.to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let full: String = if !bytes.is_empty() && bytes.iter().all(|&b| is_codabar_data(b)) {
        format!("A{upper}A")
    } else if bytes.len() >= 3
        && is_codabar_guard(bytes[0])
        && is_codabar_guard(bytes[bytes.len() - 1])
        && bytes[1..bytes.len() - 1].iter().all(|&b| is_codabar_data(b))
    {
        upper.clone()
    } else {
        return Err(invalid(
            Format::Codabar,
            "expected digits and -$:/.+ optionally wrapped in start/stop characters A-D",
        ));
    };

    let mut modules = Vec::new();
    for (i, b) in full.bytes().enumerate() {
        if i > 0 {
            modules.push(false);
        }
        if let Some(pattern) = codabar_pattern(b) {
            push_pattern(&mut modules, pattern);
        }
    }
    // Start and stop characters are never printed
    let text = full[1..full.len() - 1].to_string();
    Ok(Bars { modules, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(bars: &Bars) -> String {
        bars.modules().iter().map(|&m| if m { '1' } else { '0' }).collect()
    }

    #[test]
    fn check_digits() {
        // 590123412345 -> 7
        assert_eq!(check_digit(&[5, 9, 0, 1, 2, 3, 4, 1, 2, 3, 4, 5]), 7);
        // UPC 03600029145 -> 2
        assert_eq!(check_digit(&[0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5]), 2);
        // EAN-8 9638507 -> 4
        assert_eq!(check_digit(&[9, 6, 3, 8, 5, 0, 7]), 4);
    }

    #[test]
    fn ean13_appends_check_digit() {
        let bars = encode(Format::Ean13, "590123412345").unwrap();
        assert_eq!(bars.text(), "5901234123457");
        assert_eq!(bars.modules().len(), 95);
        let b = bits(&bars);
        assert!(b.starts_with("101"));
        assert!(b.ends_with("101"));
        assert_eq!(&b[45..50], "01010");
        // First digit 5 selects LGGLLG, so the second digit 9 is L-coded
        assert_eq!(&b[3..10], EAN_L[9]);
        assert_eq!(&b[10..17], EAN_G[0]);
    }

    #[test]
    fn ean13_rejects_bad_check_digit() {
        let err = encode(Format::Ean13, "5901234123458").unwrap_err();
        assert!(err.to_string().contains("check digit should be 7"));
        assert!(encode(Format::Ean13, "59012341234").is_err());
        assert!(encode(Format::Ean13, "59012341234a").is_err());
    }

    #[test]
    fn ean8_and_upc_lengths() {
        let ean8 = encode(Format::Ean8, "9638507").unwrap();
        assert_eq!(ean8.text(), "96385074");
        assert_eq!(ean8.modules().len(), 67);

        let upc = encode(Format::Upc, "03600029145").unwrap();
        assert_eq!(upc.text(), "036000291452");
        assert_eq!(upc.modules().len(), 95);
        assert_eq!(&bits(&upc)[3..10], EAN_L[0]);
    }

    #[test]
    fn code128_patterns_are_eleven_modules() {
        for (i, p) in CODE128_PATTERNS.iter().enumerate() {
            let width: u32 = p.bytes().map(|b| u32::from(b - b'0')).sum();
            let expected = if i == usize::from(STOP) { 13 } else { 11 };
            assert_eq!(width, expected, "pattern {i}");
        }
    }

    #[test]
    fn code128_set_b_with_checksum() {
        // Start B, "P" (48), "J" (42), checksum (104 + 48 + 84) % 103 = 30, stop
        let bars = encode(Format::Code128, "PJ").unwrap();
        let mut expected = Vec::new();
        for v in [104u8, 48, 42, 30, STOP] {
            push_widths(&mut expected, CODE128_PATTERNS[usize::from(v)]);
        }
        assert_eq!(bars.modules(), expected.as_slice());
        assert_eq!(bars.modules().len(), 4 * 11 + 13);
    }

    #[test]
    fn code128_switches_to_set_c_for_digit_runs() {
        let (start, values) = code128_values(b"123456");
        assert_eq!(start, CodeSet::C);
        assert_eq!(values, vec![12, 34, 56]);

        let (start, values) = code128_values(b"AB1234");
        assert_eq!(start, CodeSet::B);
        assert_eq!(values, vec![33, 34, CODE_C, 12, 34]);

        let (start, values) = code128_values(b"12345");
        assert_eq!(start, CodeSet::C);
        assert_eq!(values, vec![12, 34, CODE_B, 21]);

        let (start, values) = code128_values(b"12345X");
        assert_eq!(start, CodeSet::B);
        assert_eq!(values, vec![17, CODE_C, 23, 45, CODE_B, 56]);
    }

    #[test]
    fn code128_uses_set_a_for_control_characters() {
        let (start, values) = code128_values(b"A\tb");
        assert_eq!(start, CodeSet::A);
        assert_eq!(values, vec![33, 9 + 64, CODE_B, 66]);
        assert!(encode(Format::Code128, "é").is_err());
    }

    #[test]
    fn codabar_wraps_in_a() {
        let bars = encode(Format::Codabar, "1234").unwrap();
        let b = bits(&bars);
        assert!(b.starts_with("10110010010"));
        assert!(b.ends_with("01011001001"));
        assert_eq!(bars.text(), "1234");

        let explicit = encode(Format::Codabar, "b40156d").unwrap();
        assert_eq!(explicit.text(), "40156");
        assert!(bits(&explicit).starts_with("1001001011"));

        assert!(encode(Format::Codabar, "12X4").is_err());
        assert!(encode(Format::Codabar, "").is_err());
    }

    #[test]
    fn runs_alternate() {
        let bars = encode(Format::Ean8, "96385074").unwrap();
        let runs = bars.runs();
        assert_eq!(runs[0], (true, 1));
        assert_eq!(runs[1], (false, 1));
        assert_eq!(runs.iter().map(|r| r.1).sum::<usize>(), 67);
    }
}
