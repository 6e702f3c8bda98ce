use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when encoding, rendering or importing kinskode art.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Grid cell holds a character outside the palette alphabet.
    #[error("unknown kinskode symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },

    /// Character is not a palette symbol.
    #[error("{0:?} is not a kinskode symbol")]
    InvalidSymbol(char),

    /// Color index outside 0..=15.
    #[error("color index {0} is out of range")]
    ColorIndex(u8),

    /// No artwork with this name.
    #[error("no such art found: {0}")]
    NotFound(String),
    /// Random pick from a gallery with no artworks.
    #[error("gallery is empty")]
    EmptyGallery,

    /// Failed to open or decode an image.
    #[error("image error: {0}")]
    Image(Arc<image::ImageError>),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.into())
    }
}

/// Failures of a single transform operator.
///
/// These never leave the transform engine: a failing operator leaves the
/// grid as it was and the next one runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorError {
    /// Grid has no rows or only empty rows.
    #[error("grid is empty")]
    Degenerate,
    /// No substitution exists for this character.
    #[error("no substitution for {0:?}")]
    Unmapped(char),
}
