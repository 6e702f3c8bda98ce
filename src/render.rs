use std::collections::HashMap;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::codec::{self, Limits};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::transform;

/// Encoding limits used by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Limits for art shown as stored.
    pub plain: Limits,
    /// Limits for art that went through transforms. Mirroring can make
    /// rows longer, so this is usually wider.
    pub transformed: Limits,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            plain: Limits::new(20, 30),
            transformed: Limits::new(30, 30),
        }
    }
}

/// A stored artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub name: String,
    pub creator: String,
    pub kinskode: String,
    #[serde(default)]
    pub display_count: u64,
}

impl Artwork {
    /// Creates a new artwork, rejecting kinskode with unknown symbols.
    pub fn new(name: &str, creator: &str, kinskode: &str) -> Result<Self> {
        codec::validate(&Grid::parse(kinskode))?;
        Ok(Self {
            name: name.trim().into(),
            creator: creator.trim().into(),
            kinskode: kinskode.into(),
            display_count: 0,
        })
    }

    /// Returns the artwork as a grid.
    pub fn grid(&self) -> Grid {
        Grid::parse(&self.kinskode)
    }
}

/// Output of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Encoded art, one line per row.
    pub text: String,
    /// Display count including this render.
    pub display_count: u64,
    /// "<name> by <creator> (printed <n> times now)"
    pub caption: String,
}

impl Rendered {
    /// Iterates the chat lines to send: the art rows then the caption.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .lines()
            .chain(std::iter::once(self.caption.as_str()))
    }
}

/// Artwork storage the renderer reads from and writes counters to.
pub trait Gallery {
    /// Number of stored artworks.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Artwork at `offset` in storage order.
    fn nth(&self, offset: usize) -> Option<Artwork>;
    fn by_name(&self, name: &str) -> Option<Artwork>;
    /// Persists the display count of `artwork`.
    fn store_display_count(&mut self, artwork: &Artwork);
}

/// In-memory [`Gallery`] keeping insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryGallery {
    arts: Vec<Artwork>,
    names: HashMap<String, usize>,
}

impl MemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artwork, replacing one with the same name.
    pub fn insert(&mut self, artwork: Artwork) {
        match self.names.get(&artwork.name) {
            Some(&i) => self.arts[i] = artwork,
            None => {
                self.names.insert(artwork.name.clone(), self.arts.len());
                self.arts.push(artwork);
            }
        }
    }
}

impl Gallery for MemoryGallery {
    fn len(&self) -> usize {
        self.arts.len()
    }

    fn nth(&self, offset: usize) -> Option<Artwork> {
        self.arts.get(offset).cloned()
    }

    fn by_name(&self, name: &str) -> Option<Artwork> {
        self.names.get(name).map(|&i| self.arts[i].clone())
    }

    fn store_display_count(&mut self, artwork: &Artwork) {
        if let Some(&i) = self.names.get(&artwork.name) {
            self.arts[i].display_count = artwork.display_count;
        }
    }
}

/// Runs the transform and encode pipeline for stored art.
#[derive(Debug, Clone)]
pub struct Renderer<R = StdRng> {
    config: RenderConfig,
    rng: R,
}

impl Renderer<StdRng> {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl Default for Renderer<StdRng> {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl<R: Rng> Renderer<R> {
    /// Creates a renderer drawing randomness from `rng`.
    pub fn with_rng(config: RenderConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Encodes kinskode after applying the transforms named by `codes`.
    ///
    /// A blank `codes` encodes the art as stored with the plain limits;
    /// any other request uses the transformed limits, even when none of
    /// its codes is recognized. Every cell is checked, including those
    /// that fall outside the limits.
    pub fn encode(&mut self, kinskode: &str, codes: &str) -> Result<String> {
        let grid = Grid::parse(kinskode);
        codec::validate(&grid)?;
        let codes = codes.trim();
        if codes.is_empty() {
            return codec::encode(&grid, self.config.plain);
        }
        let modifiers = transform::parse_modifiers(codes);
        debug!("applying {:?}", modifiers);
        let grid = transform::apply(&grid, &modifiers, &mut self.rng);
        codec::encode(&grid, self.config.transformed)
    }

    /// Renders `artwork` and bumps its display count.
    ///
    /// The count is left untouched when encoding fails.
    pub fn render(&mut self, artwork: &mut Artwork, codes: &str) -> Result<Rendered> {
        let text = self.encode(&artwork.kinskode, codes)?;
        artwork.display_count += 1;
        Ok(Rendered {
            text,
            display_count: artwork.display_count,
            caption: format!(
                "{} by {} (printed {} times now)",
                artwork.name, artwork.creator, artwork.display_count
            ),
        })
    }

    /// Looks up art by name, or picks a random one when `name` is blank,
    /// renders it and stores the new display count.
    pub fn show<G: Gallery>(
        &mut self,
        gallery: &mut G,
        name: &str,
        codes: &str,
    ) -> Result<Rendered> {
        let name = name.trim();
        let mut artwork = if name.is_empty() {
            if gallery.is_empty() {
                return Err(Error::EmptyGallery);
            }
            let offset = self.rng.gen_range(0..gallery.len());
            gallery.nth(offset).ok_or(Error::EmptyGallery)?
        } else {
            gallery
                .by_name(name)
                .ok_or_else(|| Error::NotFound(name.into()))?
        };
        let rendered = self.render(&mut artwork, codes)?;
        gallery.store_display_count(&artwork);
        debug!("showing {} ({} times)", artwork.name, rendered.display_count);
        Ok(rendered)
    }
}

/// Encodes kinskode with the default configuration and a fresh random
/// source.
pub fn render(kinskode: &str, codes: &str) -> Result<String> {
    Renderer::default().encode(kinskode, codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{FILL, SIGIL};
    use crate::transform::Modifier;
    use pretty_assertions::assert_eq;

    fn renderer() -> Renderer {
        Renderer::with_rng(RenderConfig::default(), StdRng::seed_from_u64(3))
    }

    fn art(kinskode: &str) -> Artwork {
        Artwork::new("dna", "moth", kinskode).unwrap()
    }

    #[test]
    fn plain_render() {
        let mut artwork = art("AAABBB");
        let out = renderer().render(&mut artwork, "").unwrap();
        assert_eq!(out.text, "\x0300,00@@@\x0302,02@@@\n");
        assert_eq!(out.display_count, 1);
        assert_eq!(artwork.display_count, 1);
        assert_eq!(out.caption, "dna by moth (printed 1 times now)");
    }

    #[test]
    fn upside_down_before_encoding() {
        let mut r = renderer();
        let expected = codec::encode(&Grid::parse("BA\nAB"), Limits::new(30, 30)).unwrap();
        assert_eq!(r.encode("AB\nBA", "u").unwrap(), expected);
    }

    #[test]
    fn unknown_symbol_fails_render() {
        let mut artwork = Artwork {
            name: "bad".into(),
            creator: "moth".into(),
            kinskode: "AB\nAZ".into(),
            display_count: 4,
        };
        let err = renderer().render(&mut artwork, "").unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol { symbol: 'Z', .. }));
        assert_eq!(artwork.display_count, 4);
        assert!(renderer().render(&mut artwork, "r").is_err());
        assert_eq!(artwork.display_count, 4);
    }

    #[test]
    fn composite_discards_other_codes() {
        let kinskode = "ABCDE\nFGHIJ\nKLMNO";
        let mut a = renderer();
        let mut b = renderer();
        let with_mirror = a.encode(kinskode, "mx").unwrap();
        let grid = transform::apply(&Grid::parse(kinskode), &[Modifier::Composite], &mut b.rng);
        assert_eq!(with_mirror, codec::encode(&grid, Limits::new(30, 30)).unwrap());
    }

    #[test]
    fn limits_depend_on_transforms() {
        let row = "AB".repeat(20);
        let kinskode = vec![row.as_str(); 25].join("\n");
        let mut r = renderer();

        let plain = r.encode(&kinskode, "").unwrap();
        assert_eq!(plain.lines().count(), 20);
        let transformed = r.encode(&kinskode, "u").unwrap();
        assert_eq!(transformed.lines().count(), 25);
        for line in plain.lines().chain(transformed.lines()) {
            assert_eq!(line.matches(FILL).count(), 30);
            assert_eq!(line.matches(SIGIL).count(), 30);
        }
    }

    #[test]
    fn unknown_codes_use_transformed_limits() {
        let kinskode = vec!["A"; 25].join("\n");
        let mut r = renderer();
        assert_eq!(r.encode(&kinskode, "z").unwrap().lines().count(), 25);
        assert_eq!(r.encode(&kinskode, "?!").unwrap().lines().count(), 25);
        assert_eq!(r.encode(&kinskode, " ").unwrap().lines().count(), 20);
        assert_eq!(r.encode(&kinskode, "").unwrap().lines().count(), 20);
    }

    #[test]
    fn unknown_symbol_outside_limits_fails_render() {
        let mut r = renderer();
        let wide = format!("{}Z", "A".repeat(30));
        for codes in ["", "r"].iter() {
            match r.encode(&wide, codes) {
                Err(Error::UnknownSymbol {
                    symbol: 'Z',
                    row: 0,
                    column: 30,
                }) => {}
                other => panic!("unexpected {:?}", other),
            }
        }

        let mut rows = vec!["A"; 20];
        rows.push("Z");
        let tall = rows.join("\n");
        assert!(matches!(
            r.encode(&tall, ""),
            Err(Error::UnknownSymbol { symbol: 'Z', row: 20, column: 0 })
        ));

        let mut artwork = Artwork {
            name: "tall".into(),
            creator: "moth".into(),
            kinskode: tall,
            display_count: 0,
        };
        assert!(r.render(&mut artwork, "").is_err());
        assert_eq!(artwork.display_count, 0);
    }

    #[test]
    fn render_entry_point() {
        assert_eq!(render("AAABBB", "").unwrap(), "\x0300,00@@@\x0302,02@@@\n");
        assert_eq!(render("AB\nBA", "uu").unwrap(), render("BA\nAB", "").unwrap());
        assert!(render("Z", "x").is_err());
    }

    #[test]
    fn new_rejects_bad_kinskode() {
        assert!(Artwork::new("x", "y", "ABQ").is_err());
        let artwork = Artwork::new(" cat ", " moth\n", "AB\n_ ").unwrap();
        assert_eq!(artwork.name, "cat");
        assert_eq!(artwork.creator, "moth");
        assert_eq!(artwork.grid().height(), 2);
    }

    #[test]
    fn lines_end_with_caption() {
        let mut artwork = art("AB\nBA");
        let out = renderer().render(&mut artwork, "").unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "dna by moth (printed 1 times now)");
    }

    #[test]
    fn show_by_name_persists_count() {
        let mut gallery = MemoryGallery::new();
        gallery.insert(art("AB"));
        gallery.insert(Artwork::new("cat", "moth", "CC").unwrap());
        let mut r = renderer();
        r.show(&mut gallery, "cat", "").unwrap();
        let out = r.show(&mut gallery, " cat ", "r").unwrap();
        assert_eq!(out.display_count, 2);
        assert_eq!(gallery.by_name("cat").unwrap().display_count, 2);
        assert_eq!(gallery.by_name("dna").unwrap().display_count, 0);
    }

    #[test]
    fn show_random() {
        let mut gallery = MemoryGallery::new();
        gallery.insert(art("AB"));
        let out = renderer().show(&mut gallery, "  ", "").unwrap();
        assert_eq!(out.display_count, 1);
        assert_eq!(gallery.nth(0).unwrap().display_count, 1);
    }

    #[test]
    fn show_missing() {
        let mut gallery = MemoryGallery::new();
        assert!(matches!(
            renderer().show(&mut gallery, "", ""),
            Err(Error::EmptyGallery)
        ));
        gallery.insert(art("AB"));
        match renderer().show(&mut gallery, "cat", "") {
            Err(Error::NotFound(name)) => assert_eq!(name, "cat"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut gallery = MemoryGallery::new();
        gallery.insert(art("AB"));
        gallery.insert(art("CD"));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.by_name("dna").unwrap().kinskode, "CD");
    }

    #[test]
    fn config_from_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"transformed": {"cols": 40}}"#).unwrap();
        assert_eq!(config.plain, Limits::new(20, 30));
        assert_eq!(config.transformed, Limits::new(20, 40));
    }

    #[test]
    fn artwork_from_json() {
        let artwork: Artwork = serde_json::from_str(
            r#"{"name": "dna", "creator": "moth", "kinskode": "AB\nBA"}"#,
        )
        .unwrap();
        assert_eq!(artwork.display_count, 0);
        assert_eq!(artwork.grid().height(), 2);
    }
}
