//! Kinskode: a compact text notation for 16-color pixel art.
//!
//! Kinskode art is a grid of palette letters, one row per line. This
//! crate turns it into IRC color-coded text, applies geometric and color
//! transforms selected by single-letter codes, and converts bitmaps into
//! kinskode.
//!
//! ```
//! let text = kinskode::render("AAABBB", "").unwrap();
//! assert_eq!(text, "\x0300,00@@@\x0302,02@@@\n");
//! ```

pub mod codec;
pub mod error;
pub mod grid;
pub mod import;
pub mod render;
pub mod symbols;
pub mod transform;

pub use codec::{encode, Limits};
pub use error::{Error, OperatorError, Result};
pub use grid::Grid;
pub use import::{import_image, import_path, ImportOptions, Quantizer};
pub use render::{render, Artwork, Gallery, MemoryGallery, RenderConfig, Rendered, Renderer};
pub use symbols::{index_to_symbol, symbol_to_index, Symbol};
pub use transform::{parse_modifiers, Modifier};
