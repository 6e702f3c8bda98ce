//! Grid transforms selected by single-letter modifier codes.
//!
//! Every operator takes a grid by reference and returns a new one. An
//! operator that cannot act on its input reports an [`OperatorError`];
//! [`apply`] then keeps the grid as it was and moves on to the next one.

use core::fmt;
use std::str::FromStr;

use log::{debug, trace};
use ordermap::OrderSet;
use rand::Rng;

use crate::error::OperatorError;
use crate::grid::Grid;

/// Upper bound on the number of batches a composite runs.
pub const MAX_COMPOSITE_DEPTH: usize = 4;

/// Operators a composite draws from.
const COMPOSITE_POOL: [Modifier; 8] = [
    Modifier::Invert,
    Modifier::Mirror,
    Modifier::Unitinu,
    Modifier::Divide,
    Modifier::Reverse,
    Modifier::UpsideDown,
    Modifier::Shift,
    Modifier::Square,
];

pub type OperatorResult = std::result::Result<Grid, OperatorError>;

/// A grid transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Swap colors through a fixed substitution table.
    Invert,
    /// Reverse every row.
    Reverse,
    /// Rebuild the left half from the reversed right half.
    Mirror,
    /// Rebuild the right half from the reversed left half.
    Unitinu,
    /// Reverse the right half in place.
    Divide,
    /// Reverse the row order.
    UpsideDown,
    /// Swap the top and bottom halves.
    Square,
    /// Rotate rows by a growing amount.
    Shift,
    /// Random chain of the other operators.
    Composite,
}

impl Modifier {
    pub const ALL: [Modifier; 9] = [
        Modifier::Invert,
        Modifier::Reverse,
        Modifier::Mirror,
        Modifier::Unitinu,
        Modifier::Divide,
        Modifier::UpsideDown,
        Modifier::Square,
        Modifier::Shift,
        Modifier::Composite,
    ];

    /// Looks up a modifier by its code, ignoring case.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'i' => Some(Self::Invert),
            'r' => Some(Self::Reverse),
            'm' => Some(Self::Mirror),
            'n' => Some(Self::Unitinu),
            'd' => Some(Self::Divide),
            'u' => Some(Self::UpsideDown),
            'q' => Some(Self::Square),
            's' => Some(Self::Shift),
            'x' => Some(Self::Composite),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Invert => 'i',
            Self::Reverse => 'r',
            Self::Mirror => 'm',
            Self::Unitinu => 'n',
            Self::Divide => 'd',
            Self::UpsideDown => 'u',
            Self::Square => 'q',
            Self::Shift => 's',
            Self::Composite => 'x',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::Reverse => "reverse",
            Self::Mirror => "mirror",
            Self::Unitinu => "unitinu",
            Self::Divide => "divide",
            Self::UpsideDown => "upsidedown",
            Self::Square => "square",
            Self::Shift => "shift",
            Self::Composite => "x",
        }
    }

    /// Runs this operator on `grid`.
    pub fn apply<R: Rng>(&self, grid: &Grid, rng: &mut R) -> OperatorResult {
        match self {
            Self::Invert => invert(grid),
            Self::Reverse => Ok(reverse(grid)),
            Self::Mirror => mirror(grid, MirrorMode::Mirror),
            Self::Unitinu => mirror(grid, MirrorMode::Unitinu),
            Self::Divide => mirror(grid, MirrorMode::Divide),
            Self::UpsideDown => Ok(upside_down(grid)),
            Self::Square => square(grid),
            Self::Shift => shift(grid, rng),
            Self::Composite => Ok(composite(grid, rng)),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parses a modifier by name ("mirror") or by code ("m").
impl FromStr for Modifier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let mut chars = s.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            if let Some(m) = Self::from_code(code) {
                return Ok(m);
            }
        }
        Self::ALL
            .iter()
            .find(|m| m.name() == s)
            .copied()
            .ok_or(s)
    }
}

/// Turns free-form modifier codes into the operators to run.
///
/// Unknown codes are dropped and duplicates keep their first position.
/// A composite anywhere in the request replaces everything else.
pub fn parse_modifiers(codes: &str) -> Vec<Modifier> {
    let set: OrderSet<Modifier> = codes.chars().filter_map(Modifier::from_code).collect();
    if set.contains(&Modifier::Composite) {
        return vec![Modifier::Composite];
    }
    set.into_iter().collect()
}

/// Runs `modifiers` over `grid` in order, skipping operators that fail.
pub fn apply<R: Rng>(grid: &Grid, modifiers: &[Modifier], rng: &mut R) -> Grid {
    let mut grid = grid.clone();
    for modifier in modifiers {
        grid = run(*modifier, grid, rng);
    }
    grid
}

/// Parses `codes` and applies them to `grid`.
pub fn apply_codes<R: Rng>(grid: &Grid, codes: &str, rng: &mut R) -> Grid {
    apply(grid, &parse_modifiers(codes), rng)
}

fn run<R: Rng>(modifier: Modifier, grid: Grid, rng: &mut R) -> Grid {
    match modifier.apply(&grid, rng) {
        Ok(out) => {
            trace!("{} applied, {} rows", modifier, out.height());
            out
        }
        Err(err) => {
            debug!("{} skipped: {}", modifier, err);
            grid
        }
    }
}

/// Substitution used by [`Modifier::Invert`].
///
/// Not an involution: several symbols share a target.
pub fn invert_symbol(ch: char) -> Option<char> {
    let out = match ch.to_ascii_uppercase() {
        ' ' | '_' => 'A',
        'A' => ' ',
        'B' => 'H',
        'C' => 'M',
        'D' => 'K',
        'E' => 'K',
        'F' => 'I',
        'G' => 'L',
        'H' => 'L',
        'I' => 'M',
        'J' => 'D',
        'K' => 'D',
        'L' => 'G',
        'M' => 'C',
        'N' => 'O',
        'O' => 'N',
        _ => return None,
    };
    Some(out)
}

pub fn invert(grid: &Grid) -> OperatorResult {
    let rows = grid
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|&ch| invert_symbol(ch).ok_or(OperatorError::Unmapped(ch)))
                .collect::<Result<Vec<char>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Grid::from_rows(rows))
}

pub fn reverse(grid: &Grid) -> Grid {
    grid.map_rows(|row| row.iter().rev().copied().collect())
}

pub fn upside_down(grid: &Grid) -> Grid {
    Grid::from_rows(grid.rows().iter().rev().cloned().collect())
}

/// How [`mirror`] rebuilds a row from its halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorMode {
    /// reversed right, then right
    Mirror,
    /// left, then reversed left
    Unitinu,
    /// left, then reversed right
    Divide,
}

/// Splits every row at half the longest row and recombines the halves.
///
/// The split column is shared by all rows, so a row shorter than it has
/// an empty right half.
pub fn mirror(grid: &Grid, mode: MirrorMode) -> OperatorResult {
    let half = half_column(grid)?;
    Ok(grid.map_rows(|row| {
        let (left, right) = row.split_at(half.min(row.len()));
        match mode {
            MirrorMode::Mirror => right.iter().rev().chain(right).copied().collect(),
            MirrorMode::Unitinu => left.iter().chain(left.iter().rev()).copied().collect(),
            MirrorMode::Divide => left.iter().chain(right.iter().rev()).copied().collect(),
        }
    }))
}

/// Moves the bottom half of the rows above the top half.
///
/// Each row is split at half the longest row and joined again unchanged.
pub fn square(grid: &Grid) -> OperatorResult {
    let half = half_column(grid)?;
    let split = grid.height() / 2;
    let (top, bottom) = grid.rows().split_at(split);
    let rows = bottom
        .iter()
        .chain(top)
        .map(|row| {
            let (left, right) = row.split_at(half.min(row.len()));
            [left, right].concat()
        })
        .collect();
    Ok(Grid::from_rows(rows))
}

/// Rotates rows right, starting from a random amount in
/// `1..=len(first row)` that grows by one per row.
pub fn shift<R: Rng>(grid: &Grid, rng: &mut R) -> OperatorResult {
    let first = grid.rows().first().map_or(0, Vec::len);
    if first == 0 {
        return Err(OperatorError::Degenerate);
    }
    Ok(shift_from(grid, rng.gen_range(1..=first)))
}

/// Rotates row `i` right by `start + i`, restarting at 1 whenever the
/// amount exceeds the row's length. Empty rows are passed through and
/// do not advance the amount.
pub fn shift_from(grid: &Grid, start: usize) -> Grid {
    let mut amount = start;
    grid.map_rows(|row| {
        let mut row = row.clone();
        if row.is_empty() {
            return row;
        }
        if amount > row.len() {
            amount = 1;
        }
        let len = row.len();
        row.rotate_right(amount % len);
        amount += 1;
        row
    })
}

/// Runs batches of 4 to 9 random operators. After each batch a coin
/// flip decides whether another one follows, up to
/// [`MAX_COMPOSITE_DEPTH`] batches.
pub fn composite<R: Rng>(grid: &Grid, rng: &mut R) -> Grid {
    composite_batches(grid, rng).0
}

/// Same as [`composite`], also returning how many operators each batch ran.
pub(crate) fn composite_batches<R: Rng>(grid: &Grid, rng: &mut R) -> (Grid, Vec<usize>) {
    let mut grid = grid.clone();
    let mut batches = Vec::new();
    for _ in 0..MAX_COMPOSITE_DEPTH {
        let count = rng.gen_range(4..=9);
        for _ in 0..count {
            let modifier = COMPOSITE_POOL[rng.gen_range(0..COMPOSITE_POOL.len())];
            grid = run(modifier, grid, rng);
        }
        batches.push(count);
        if !rng.gen_bool(0.5) {
            break;
        }
    }
    trace!("composite ran batches {:?}", batches);
    (grid, batches)
}

fn half_column(grid: &Grid) -> Result<usize, OperatorError> {
    match grid.longest() {
        0 => Err(OperatorError::Degenerate),
        longest => Ok(longest / 2),
    }
}
