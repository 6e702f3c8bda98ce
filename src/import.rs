use std::path::Path;

use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};
use log::debug;
use serde::Deserialize;

use crate::error::Result;
use crate::symbols::{Symbol, BLANK, COLORS};

/// Output size bounds for [`import_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub max_cols: u32,
    pub max_rows: u32,
    /// Pixels with alpha below this become background.
    pub alpha_threshold: u8,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_cols: 30,
            max_rows: 20,
            alpha_threshold: 128,
        }
    }
}

/// CIE L*a*b* coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Lab {
    l: f32,
    a: f32,
    b: f32,
}

impl Lab {
    /// Converts 8-bit sRGB through linear RGB and XYZ (D65).
    fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        fn linear(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        fn f(t: f32) -> f32 {
            const DELTA: f32 = 6.0 / 29.0;
            if t > DELTA * DELTA * DELTA {
                t.cbrt()
            } else {
                t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
            }
        }
        let (r, g, b) = (linear(r), linear(g), linear(b));
        let x = (0.4124 * r + 0.3576 * g + 0.1805 * b) / 0.950_47;
        let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
        let z = (0.0193 * r + 0.1192 * g + 0.9505 * b) / 1.088_83;
        let (fx, fy, fz) = (f(x), f(y), f(z));
        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Squared CIE76 distance.
    fn distance(&self, other: &Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}

/// Finds palette colors closest to arbitrary RGB values.
#[derive(Debug, Clone)]
pub struct Quantizer {
    palette: Vec<(Symbol, Lab)>,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Quantizer {
    pub fn new() -> Self {
        let palette = (0..COLORS as u8)
            .filter_map(|index| Symbol::from_index(index).ok())
            .map(|symbol| {
                let (r, g, b) = symbol.rgb();
                (symbol, Lab::from_rgb(r, g, b))
            })
            .collect();
        Self { palette }
    }

    /// Returns the symbol whose color is nearest to `(r, g, b)`.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> Symbol {
        let lab = Lab::from_rgb(r, g, b);
        self.palette
            .iter()
            .map(|(symbol, p)| (*symbol, lab.distance(p)))
            .fold((BLANK, f32::INFINITY), |best, cur| {
                if cur.1 < best.1 {
                    cur
                } else {
                    best
                }
            })
            .0
    }

    fn symbol(&self, pixel: &Rgba<u8>, alpha_threshold: u8) -> char {
        let [r, g, b, a] = pixel.0;
        if a < alpha_threshold {
            BLANK.char()
        } else {
            self.nearest(r, g, b).char()
        }
    }
}

/// Returns the largest size within `options` that keeps the aspect ratio.
fn fit(width: u32, height: u32, options: &ImportOptions) -> (u32, u32) {
    if width <= options.max_cols && height <= options.max_rows {
        return (width, height);
    }
    let scale = f64::min(
        options.max_cols as f64 / width as f64,
        options.max_rows as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, options.max_cols.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, options.max_rows.max(1));
    (w, h)
}

/// Converts a bitmap to kinskode text, one row per pixel row.
pub fn import_image(image: &DynamicImage, options: ImportOptions) -> String {
    let rgba = image.to_rgba8();
    let (width, height) = fit(rgba.width(), rgba.height(), &options);
    let rgba: RgbaImage = if (width, height) == rgba.dimensions() {
        rgba
    } else {
        debug!(
            "scaling {}x{} image to {}x{}",
            rgba.width(),
            rgba.height(),
            width,
            height
        );
        image::imageops::resize(&rgba, width, height, FilterType::Nearest)
    };

    let quantizer = Quantizer::new();
    rgba.rows()
        .map(|row| {
            row.map(|pixel| quantizer.symbol(pixel, options.alpha_threshold))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Opens an image file and converts it to kinskode text.
pub fn import_path<P: AsRef<Path>>(path: P, options: ImportOptions) -> Result<String> {
    let image = image::open(path)?;
    Ok(import_image(&image, options))
}
