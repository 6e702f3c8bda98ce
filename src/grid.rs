use core::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A kinskode artwork as rows of palette characters.
///
/// Rows may differ in length. Cells are kept as written, so a grid can
/// carry characters outside the alphabet until it gets encoded.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    pub(crate) rows: Vec<Vec<char>>,
}

impl Grid {
    /// Parses kinskode text, one row per line.
    pub fn parse(text: &str) -> Self {
        Self {
            rows: text.lines().map(|line| line.chars().collect()).collect(),
        }
    }

    pub fn from_rows(rows: Vec<Vec<char>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<char>> {
        self.rows
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the length of the longest row.
    pub fn longest(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns true if the grid has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.longest() == 0
    }

    /// Returns a new grid with `f` applied to every row.
    pub(crate) fn map_rows<F>(&self, f: F) -> Self
    where
        F: FnMut(&Vec<char>) -> Vec<char>,
    {
        Self {
            rows: self.rows.iter().map(f).collect(),
        }
    }
}

/// Formats the grid back to kinskode text, rows joined by `\n`.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for ch in row {
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Grid {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
