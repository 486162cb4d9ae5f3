//! Named color sets that panels draw their bodies, nodes and sites from.
//!
//! A [`Palette`] is an ordered list of [`Rgba`] stops. Panels pick a random
//! stop per entity (bodies, graph nodes, Voronoi sites).

use crate::color::Rgba;
use crate::error::EngineError;
use crate::prng::Xorshift64;

/// An ordered, non-empty list of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    /// Requires at least one color.
    pub fn new(colors: Vec<Rgba>) -> Result<Self, EngineError> {
        if colors.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Parses each entry with [`Rgba::from_hex`].
    pub fn from_hex(hexes: &[&str]) -> Result<Self, EngineError> {
        let colors = hexes
            .iter()
            .map(|h| Rgba::from_hex(h))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Uniformly random stop.
    pub fn pick(&self, rng: &mut Xorshift64) -> Rgba {
        self.colors[rng.next_usize(self.colors.len())]
    }

    // -- Built-in palettes --

    /// Blue, green, red, amber: the gallery's entity colors.
    pub fn accent() -> Self {
        Self::from_hex(&["#60a5fa", "#34d399", "#f87171", "#fcd34d"])
            .expect("accent palette hex values are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty() {
        assert!(Palette::new(vec![]).is_err());
    }

    #[test]
    fn from_hex_rejects_bad_entries() {
        assert!(Palette::from_hex(&["#60a5fa", "plaid"]).is_err());
    }

    #[test]
    fn accent_has_four_gallery_colors() {
        let p = Palette::accent();
        assert_eq!(p.len(), 4);
        assert_eq!(p.colors()[0].to_hex(), "#60a5fa");
    }

    #[test]
    fn pick_is_deterministic_per_seed() {
        let p = Palette::accent();
        let mut a = Xorshift64::new(3);
        let mut b = Xorshift64::new(3);
        for _ in 0..20 {
            assert_eq!(p.pick(&mut a), p.pick(&mut b));
        }
    }
}
