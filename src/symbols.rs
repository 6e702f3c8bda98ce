use core::fmt;
use std::convert::TryFrom;

use crate::error::{Error, Result};

/// Number of colors in the IRC palette.
pub const COLORS: usize = 16;

/// Background symbol.
pub const BLANK: Symbol = Symbol { char: ' ' };
/// Unset symbol. Shares the background color with [`BLANK`].
pub const UNSET: Symbol = Symbol { char: '_' };

/// Standard mIRC names, indexed by color.
const NAMES: [&str; COLORS] = [
    "white",
    "black",
    "navy",
    "green",
    "red",
    "brown",
    "purple",
    "orange",
    "yellow",
    "light-green",
    "cyan",
    "light-cyan",
    "light-blue",
    "pink",
    "grey",
    "light-grey",
];

/// Standard mIRC RGB values, indexed by color.
const RGB: [(u8, u8, u8); COLORS] = [
    (255, 255, 255),
    (0, 0, 0),
    (0, 0, 127),
    (0, 147, 0),
    (255, 0, 0),
    (127, 0, 0),
    (156, 0, 156),
    (252, 127, 0),
    (255, 255, 0),
    (0, 252, 0),
    (0, 147, 147),
    (0, 255, 255),
    (0, 0, 252),
    (255, 0, 255),
    (127, 127, 127),
    (210, 210, 210),
];

/// A validated kinskode palette symbol.
///
/// Holds one of `A`..=`O`, space or `_`, always upper-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub(crate) char: char,
}

impl Symbol {
    /// Creates a symbol from a character, ignoring case.
    /// Returns `None` if the character is not part of the alphabet.
    pub fn new(ch: char) -> Option<Self> {
        let ch = ch.to_ascii_uppercase();
        match ch {
            'A'..='O' | ' ' | '_' => Some(Self { char: ch }),
            _ => None,
        }
    }

    /// Returns the IRC color index of this symbol.
    pub fn index(&self) -> u8 {
        match self.char {
            'A' => 0,
            ' ' | '_' => 1,
            // B..=O are consecutive from 2
            c => c as u8 - b'B' + 2,
        }
    }

    /// Returns the canonical symbol for a color index.
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Self { char: 'A' }),
            1 => Ok(BLANK),
            2..=15 => Ok(Self {
                char: (b'B' + index - 2) as char,
            }),
            _ => Err(Error::ColorIndex(index)),
        }
    }

    pub fn char(&self) -> char {
        self.char
    }

    /// Returns the IRC name of this symbol's color.
    pub fn name(&self) -> &'static str {
        NAMES[self.index() as usize]
    }

    /// Returns the RGB value of this symbol's color.
    pub fn rgb(&self) -> (u8, u8, u8) {
        RGB[self.index() as usize]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char)
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> char {
        symbol.char
    }
}

impl TryFrom<char> for Symbol {
    type Error = Error;
    fn try_from(ch: char) -> Result<Self> {
        Self::new(ch).ok_or(Error::InvalidSymbol(ch))
    }
}

/// Maps a symbol character to its color index.
pub fn symbol_to_index(ch: char) -> Result<u8> {
    Symbol::try_from(ch).map(|s| s.index())
}

/// Maps a color index to its canonical symbol character.
pub fn index_to_symbol(index: u8) -> Result<char> {
    Symbol::from_index(index).map(char::from)
}
