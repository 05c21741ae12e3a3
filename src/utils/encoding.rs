//! Packed 3-bit encoding of N/A/T/C/G strings.
//!
//! Each symbol gets a non-zero 3-bit code and successive symbols occupy
//! successive 3-bit fields, least-significant symbol first. Code 0 marks
//! "no symbol", so decoding simply stops once the remaining value is zero.
//!
//! | Symbol | Code |
//! |--------|------|
//! | N      | 001  |
//! | A      | 010  |
//! | T      | 011  |
//! | C      | 100  |
//! | G      | 101  |
//!
//! The packed integer is arbitrary precision: it is stored as little-endian
//! 63-bit limbs holding 21 symbols each, so fragments of any length encode
//! exactly. Strings of up to 21 symbols fit in one limb and
//! [`PackedSymbols::as_u64`] returns the plain integer value.

use crate::error::TrieError;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Bits occupied by one symbol
pub const BITS_PER_SYMBOL: u32 = 3;

/// Symbols packed into one `u64` limb (63 of 64 bits used)
pub const SYMBOLS_PER_LIMB: usize = 21;

const FIELD_MASK: u64 = (1 << BITS_PER_SYMBOL) - 1;

/// One symbol of the read alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Symbol {
    N = 1,
    A = 2,
    T = 3,
    C = 4,
    G = 5,
}

/// The alphabet in code order. Never mutated.
pub const SYMBOLS: [Symbol; 5] = [Symbol::N, Symbol::A, Symbol::T, Symbol::C, Symbol::G];

/// Byte to symbol code lookup; 0 marks bytes outside the alphabet.
const BYTE_TO_CODE: [u8; 256] = {
    let mut lut = [0u8; 256];
    lut[b'N' as usize] = Symbol::N as u8;
    lut[b'A' as usize] = Symbol::A as u8;
    lut[b'T' as usize] = Symbol::T as u8;
    lut[b'C' as usize] = Symbol::C as u8;
    lut[b'G' as usize] = Symbol::G as u8;
    lut
};

impl Symbol {
    /// The 3-bit code (1..=5)
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Zero-based position in [`SYMBOLS`]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Symbol::N),
            2 => Some(Symbol::A),
            3 => Some(Symbol::T),
            4 => Some(Symbol::C),
            5 => Some(Symbol::G),
            _ => None,
        }
    }

    /// Uppercase ASCII only; `b'a'` is not a symbol.
    #[inline]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Self::from_code(BYTE_TO_CODE[byte as usize])
    }

    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii() {
            Self::from_byte(c as u8)
        } else {
            None
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Symbol::N => 'N',
            Symbol::A => 'A',
            Symbol::T => 'T',
            Symbol::C => 'C',
            Symbol::G => 'G',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Validate a string and convert it to symbols.
///
/// Fails on the first character outside the alphabet. The empty string is
/// valid and yields an empty vector.
pub fn parse_symbols(text: &str) -> Result<Vec<Symbol>, TrieError> {
    text.chars()
        .enumerate()
        .map(|(position, symbol)| {
            Symbol::from_char(symbol).ok_or(TrieError::InvalidSymbol { symbol, position })
        })
        .collect()
}

/// Byte-level variant of [`parse_symbols`] used on raw read lines.
///
/// With `fold_case`, lowercase letters are accepted as their uppercase
/// symbols. Errors report the byte as it appeared in the input.
pub fn parse_symbol_bytes(bytes: &[u8], fold_case: bool) -> Result<Vec<Symbol>, TrieError> {
    bytes
        .iter()
        .enumerate()
        .map(|(position, &byte)| {
            let folded = if fold_case { byte.to_ascii_uppercase() } else { byte };
            Symbol::from_byte(folded).ok_or(TrieError::InvalidSymbol {
                symbol: byte as char,
                position,
            })
        })
        .collect()
}

/// Encode an alphabet string as a packed integer.
pub fn encode(fragment: &str) -> Result<PackedSymbols, TrieError> {
    Ok(PackedSymbols::from_symbols(&parse_symbols(fragment)?))
}

/// Decode a packed integer back into its alphabet string.
pub fn decode(value: &PackedSymbols) -> String {
    value.iter().map(Symbol::as_char).collect()
}

/// A packed alphabet string, used as the edge label type.
///
/// Limbs are little-endian and never end in a zero limb, so the empty
/// string is the zero value and every value has exactly one representation.
/// Ordering is derived from the limbs: deterministic, not alphabetical.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackedSymbols {
    limbs: Box<[u64]>,
}

impl PackedSymbols {
    /// Pack a symbol slice.
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let limbs = symbols
            .chunks(SYMBOLS_PER_LIMB)
            .map(|chunk| {
                chunk.iter().enumerate().fold(0u64, |acc, (i, symbol)| {
                    acc | (symbol.code() as u64) << (BITS_PER_SYMBOL as usize * i)
                })
            })
            .collect();
        Self { limbs }
    }

    /// Interpret a single-limb integer. Returns `None` for values `encode`
    /// can never produce (a zero or out-of-range field below the top symbol,
    /// or the unused top bit set).
    pub fn from_u64(value: u64) -> Option<Self> {
        if value == 0 {
            return Some(Self::default());
        }
        if value >> (BITS_PER_SYMBOL as usize * SYMBOLS_PER_LIMB) != 0 {
            return None;
        }
        let mut rest = value;
        while rest != 0 {
            Symbol::from_code((rest & FIELD_MASK) as u8)?;
            rest >>= BITS_PER_SYMBOL;
        }
        Some(Self {
            limbs: Box::new([value]),
        })
    }

    /// The plain integer value, when the string fits in one limb.
    pub fn as_u64(&self) -> Option<u64> {
        match &self.limbs[..] {
            [] => Some(0),
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        match self.limbs.last() {
            None => 0,
            Some(&last) => {
                let used_bits = u64::BITS - last.leading_zeros();
                (self.limbs.len() - 1) * SYMBOLS_PER_LIMB
                    + used_bits.div_ceil(BITS_PER_SYMBOL) as usize
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    /// Leading symbol, read straight from the low field of the first limb.
    #[inline]
    pub fn first(&self) -> Option<Symbol> {
        self.limbs
            .first()
            .and_then(|&limb| Symbol::from_code((limb & FIELD_MASK) as u8))
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        let limb = *self.limbs.get(index / SYMBOLS_PER_LIMB)?;
        let shift = BITS_PER_SYMBOL as usize * (index % SYMBOLS_PER_LIMB);
        Symbol::from_code(((limb >> shift) & FIELD_MASK) as u8)
    }

    pub fn iter(&self) -> Symbols<'_> {
        Symbols {
            limbs: &self.limbs,
            current: 0,
        }
    }

    /// Length of the longest common prefix with `fragment`.
    pub fn common_prefix_len(&self, fragment: &[Symbol]) -> usize {
        self.iter()
            .zip(fragment)
            .take_while(|(a, b)| a == *b)
            .count()
    }

    /// Heap bytes held by the limbs.
    pub fn heap_bytes(&self) -> usize {
        self.limbs.len() * std::mem::size_of::<u64>()
    }
}

/// Iterator over the symbols of a [`PackedSymbols`], lowest field first.
pub struct Symbols<'a> {
    limbs: &'a [u64],
    current: u64,
}

impl Iterator for Symbols<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        while self.current == 0 {
            let (&head, rest) = self.limbs.split_first()?;
            self.current = head;
            self.limbs = rest;
        }
        let code = (self.current & FIELD_MASK) as u8;
        self.current >>= BITS_PER_SYMBOL;
        Symbol::from_code(code)
    }
}

impl fmt::Display for PackedSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.iter() {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for PackedSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedSymbols(\"{}\")", self)
    }
}

// Labels travel as their alphabet strings so JSON dumps stay readable.
impl Serialize for PackedSymbols {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&decode(self))
    }
}

impl<'de> Deserialize<'de> for PackedSymbols {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelVisitor;

        impl Visitor<'_> for LabelVisitor {
            type Value = PackedSymbols;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string over N, A, T, C, G")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<PackedSymbols, E> {
                encode(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(LabelVisitor)
    }
}
