//! Code 128 symbology.
//!
//! Encodes ASCII text into the symbol value sequence and bar/space module
//! pattern, switching between code sets A, B and C to keep the symbol short.
//! The decoder reads a module pattern (or a scanned row of pixels) back into
//! text and is what the renderer's round-trip checks rely on.

use std::fmt;
use thiserror::Error;

const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const CODE_C: u8 = 99;
const CODE_B: u8 = 100;
const CODE_A: u8 = 101;
const STOP: u8 = 106;

/// Bar/space widths per symbol value, bar first. Index 106 is the stop symbol.
const PATTERNS: [&str; 107] = [
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

/// Modules in every symbol except the stop symbol.
pub const SYMBOL_MODULES: usize = 11;
/// Modules in the stop symbol, including its terminating bar.
pub const STOP_MODULES: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    A,
    B,
    C,
}

impl fmt::Display for CodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Nothing to encode")]
    Empty,
    #[error("Character {character:?} at position {position} is not supported by Code 128")]
    UnsupportedCharacter { character: char, position: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No bars found")]
    NoSymbol,
    #[error("Element count {0} does not form a whole number of symbols")]
    MalformedLength(usize),
    #[error("Symbol {index} does not match any Code 128 pattern")]
    UnknownPattern { index: usize },
    #[error("Missing stop symbol")]
    MissingStop,
    #[error("Invalid start symbol {0}")]
    InvalidStart(u8),
    #[error("Checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: u8, found: u8 },
    #[error("Symbol {value} is not valid in code set {set}")]
    UnexpectedSymbol { value: u8, set: CodeSet },
}

/// An encoded Code 128 symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128 {
    values: Vec<u8>,
    modules: Vec<bool>,
}

impl Code128 {
    /// Symbol values: start code, data and switches, checksum, stop.
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Module pattern without quiet zones, `true` for a bar.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

/// Encodes `text` as Code 128.
pub fn encode(text: &str) -> Result<Code128, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::Empty);
    }
    if let Some((position, character)) = text.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        return Err(EncodeError::UnsupportedCharacter { character, position });
    }

    let values = symbol_values(text.as_bytes());
    let mut modules = Vec::with_capacity((values.len() - 1) * SYMBOL_MODULES + STOP_MODULES);
    for &value in &values {
        push_pattern(&mut modules, PATTERNS[value as usize]);
    }
    Ok(Code128 { values, modules })
}

fn symbol_values(bytes: &[u8]) -> Vec<u8> {
    let len = bytes.len();
    let leading_digits = digit_run(bytes, 0);

    let mut set = if leading_digits >= 4 || (leading_digits == len && len % 2 == 0) {
        CodeSet::C
    } else if bytes[0] < 32 {
        CodeSet::A
    } else {
        CodeSet::B
    };
    let mut values = vec![match set {
        CodeSet::A => START_A,
        CodeSet::B => START_B,
        CodeSet::C => START_C,
    }];

    let mut i = 0;
    while i < len {
        let run = digit_run(bytes, i);
        if set == CodeSet::C {
            if run >= 2 {
                values.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                i += 2;
            } else if bytes[i] < 32 {
                values.push(CODE_A);
                set = CodeSet::A;
            } else {
                values.push(CODE_B);
                set = CodeSet::B;
            }
            continue;
        }

        let run_reaches_end = i + run == len;
        if (run_reaches_end && run >= 4) || run >= 6 {
            if run % 2 == 1 {
                values.push(value_in(set, bytes[i]));
                i += 1;
            }
            values.push(CODE_C);
            set = CodeSet::C;
            continue;
        }

        let byte = bytes[i];
        match set {
            CodeSet::A if byte >= 96 => {
                values.push(CODE_B);
                set = CodeSet::B;
            }
            CodeSet::B if byte < 32 => {
                values.push(CODE_A);
                set = CodeSet::A;
            }
            _ => {}
        }
        values.push(value_in(set, byte));
        i += 1;
    }

    values.push(checksum(&values));
    values.push(STOP);
    values
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

fn value_in(set: CodeSet, byte: u8) -> u8 {
    match set {
        CodeSet::A if byte < 32 => byte + 64,
        _ => byte - 32,
    }
}

fn checksum(values: &[u8]) -> u8 {
    let sum = values
        .iter()
        .enumerate()
        .map(|(position, &value)| position.max(1) as u32 * value as u32)
        .sum::<u32>();
    (sum % 103) as u8
}

fn push_pattern(modules: &mut Vec<bool>, pattern: &str) {
    for (element, width) in pattern.bytes().enumerate() {
        let is_bar = element % 2 == 0;
        modules.extend(std::iter::repeat(is_bar).take((width - b'0') as usize));
    }
}

/// Decodes a row of bars and spaces (modules or pixels) back into text.
///
/// Quiet zones on either side are ignored. The narrowest element is taken as
/// one module, so a row sampled at any whole pixels-per-module scale works.
pub fn decode_modules(row: &[bool]) -> Result<String, DecodeError> {
    let first = row.iter().position(|&bar| bar).ok_or(DecodeError::NoSymbol)?;
    let last = row.iter().rposition(|&bar| bar).ok_or(DecodeError::NoSymbol)?;

    let mut runs: Vec<u32> = Vec::new();
    let mut current = row[first];
    let mut length = 0u32;
    for &bar in &row[first..=last] {
        if bar == current {
            length += 1;
        } else {
            runs.push(length);
            current = bar;
            length = 1;
        }
    }
    runs.push(length);

    let unit = runs.iter().copied().min().unwrap_or(1);
    let widths: Vec<u32> = runs.iter().map(|run| (run + unit / 2) / unit).collect();
    decode_widths(&widths)
}

/// Decodes element widths in modules, bar first, ending with the stop bar.
pub fn decode_widths(widths: &[u32]) -> Result<String, DecodeError> {
    if widths.is_empty() {
        return Err(DecodeError::NoSymbol);
    }
    if widths.len() < 13 || (widths.len() - 7) % 6 != 0 {
        return Err(DecodeError::MalformedLength(widths.len()));
    }

    let symbol_count = (widths.len() - 7) / 6;
    let mut values = Vec::with_capacity(symbol_count);
    for index in 0..symbol_count {
        let group = &widths[index * 6..index * 6 + 6];
        let value = PATTERNS[..STOP as usize]
            .iter()
            .position(|pattern| matches_pattern(pattern, group))
            .ok_or(DecodeError::UnknownPattern { index })?;
        values.push(value as u8);
    }
    if !matches_pattern(PATTERNS[STOP as usize], &widths[symbol_count * 6..]) {
        return Err(DecodeError::MissingStop);
    }

    let (&found, body) = values.split_last().ok_or(DecodeError::NoSymbol)?;
    let expected = checksum(body);
    if expected != found {
        return Err(DecodeError::ChecksumMismatch { expected, found });
    }

    let Some((&start, data)) = body.split_first() else {
        return Err(DecodeError::MalformedLength(widths.len()));
    };
    let mut set = match start {
        START_A => CodeSet::A,
        START_B => CodeSet::B,
        START_C => CodeSet::C,
        other => return Err(DecodeError::InvalidStart(other)),
    };

    let mut text = String::new();
    for &value in data {
        match (set, value) {
            (CodeSet::C, 0..=99) => text.push_str(&format!("{value:02}")),
            (CodeSet::C, CODE_B) | (CodeSet::A, CODE_B) => set = CodeSet::B,
            (CodeSet::C, CODE_A) | (CodeSet::B, CODE_A) => set = CodeSet::A,
            (CodeSet::A, CODE_C) | (CodeSet::B, CODE_C) => set = CodeSet::C,
            (CodeSet::A, 0..=63) => text.push((value + 32) as char),
            (CodeSet::A, 64..=95) => text.push((value - 64) as char),
            (CodeSet::B, 0..=95) => text.push((value + 32) as char),
            _ => return Err(DecodeError::UnexpectedSymbol { value, set }),
        }
    }
    Ok(text)
}

fn matches_pattern(pattern: &str, widths: &[u32]) -> bool {
    pattern.len() == widths.len()
        && pattern
            .bytes()
            .zip(widths)
            .all(|(expected, &width)| (expected - b'0') as u32 == width)
}
