use serde::Deserialize;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::symbols::Symbol;

/// IRC color control byte.
pub const SIGIL: char = '\x03';
/// Glyph written once per cell. Foreground and background always match,
/// so it renders as a solid block.
pub const FILL: char = '@';

/// Maximum number of rows and of cells per row to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub rows: usize,
    pub cols: usize,
}

impl Limits {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(20, 30)
    }
}

/// Writes a color switch marker for `index` followed by one fill glyph.
fn push_switch(out: &mut String, index: u8) {
    out.push(SIGIL);
    out.push_str(&format!("{:02},{:02}", index, index));
    out.push(FILL);
}

/// Encodes a single row, at most `max_cols` cells of it.
///
/// `row` is only used to report the position of an unknown symbol.
pub fn encode_line(cells: &[char], row: usize, max_cols: usize) -> Result<String> {
    let mut out = String::new();
    let mut prev: Option<Symbol> = None;
    for (column, &ch) in cells.iter().take(max_cols).enumerate() {
        let symbol = Symbol::new(ch).ok_or(Error::UnknownSymbol {
            symbol: ch,
            row,
            column,
        })?;
        if Some(symbol) == prev {
            out.push(FILL);
        } else {
            push_switch(&mut out, symbol.index());
            prev = Some(symbol);
        }
    }
    out.push('\n');
    Ok(out)
}

/// Checks that every cell of `grid` is a palette symbol, ignoring limits.
pub fn validate(grid: &Grid) -> Result<()> {
    for (row, cells) in grid.rows().iter().enumerate() {
        if let Some(column) = cells.iter().position(|&ch| Symbol::new(ch).is_none()) {
            return Err(Error::UnknownSymbol {
                symbol: cells[column],
                row,
                column,
            });
        }
    }
    Ok(())
}

/// Encodes a grid into IRC color-coded text.
///
/// Rows past `limits.rows` are dropped and every row is cut to
/// `limits.cols` cells on its own. Color runs never continue across rows.
pub fn encode(grid: &Grid, limits: Limits) -> Result<String> {
    let mut acum = String::new();
    for (r, row) in grid.rows().iter().take(limits.rows).enumerate() {
        acum += &encode_line(row, r, limits.cols)?;
    }
    Ok(acum)
}
