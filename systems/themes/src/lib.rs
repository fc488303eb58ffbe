#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Color theme provider shared by the background and foreground layers.

use log::warn;
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;
use vision_drill_core::{ColorTheme, PaletteColor, ThemeSelector};

/// Errors raised while resolving a theme selector.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ThemeError {
    /// No theme is registered under the requested name.
    #[error("no color theme named '{name}'")]
    NotFound {
        /// Requested theme name.
        name: String,
    },
    /// The catalog holds no themes to pick from.
    #[error("the color theme catalog is empty")]
    Empty,
}

/// Ordered set of themes a round may be painted with.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeCatalog {
    themes: Vec<ColorTheme>,
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        let named = |name: &str| PaletteColor::from_name(name).unwrap_or(BLACK);
        let theme = |name: &str, colors: [&str; 3], border: &str, width: f32| {
            ColorTheme::new(
                name,
                [named(colors[0]), named(colors[1]), named(colors[2])],
                named(border),
                width,
            )
        };
        Self::new(vec![
            theme("night", ["black", "red", "blue"], "white", 2.0),
            theme("ocean", ["blue", "yellow", "black"], "white", 2.0),
            theme("forest", ["green", "orange", "black"], "white", 2.0),
            theme("blossom", ["pink", "gray", "black"], "yellow", 1.0),
            theme("dusk", ["darkred", "darkblue", "black"], "pink", 1.0),
        ])
    }
}

const BLACK: PaletteColor = PaletteColor::from_rgb(0, 0, 0);

impl ThemeCatalog {
    /// Creates a catalog holding the provided themes in order.
    #[must_use]
    pub fn new(themes: Vec<ColorTheme>) -> Self {
        Self { themes }
    }

    /// Themes in registration order.
    #[must_use]
    pub fn themes(&self) -> &[ColorTheme] {
        &self.themes
    }

    /// Looks up a theme by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColorTheme> {
        self.themes.iter().find(|theme| theme.name() == name)
    }

    /// Resolves `selector` to a theme.
    ///
    /// `Random` picks uniformly from the catalog; a name must match exactly.
    pub fn resolve<R>(&self, selector: &ThemeSelector, rng: &mut R) -> Result<ColorTheme, ThemeError>
    where
        R: Rng + ?Sized,
    {
        match selector {
            ThemeSelector::Random => self.themes.choose(rng).cloned().ok_or(ThemeError::Empty),
            ThemeSelector::Named(name) => {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| ThemeError::NotFound { name: name.clone() })
            }
        }
    }

    /// Resolves `selector`, falling back to the first registered theme on a miss.
    ///
    /// An empty catalog yields a plain black and white palette.
    pub fn resolve_or_default<R>(&self, selector: &ThemeSelector, rng: &mut R) -> ColorTheme
    where
        R: Rng + ?Sized,
    {
        match self.resolve(selector, rng) {
            Ok(theme) => theme,
            Err(error) => {
                warn!("{error}; falling back to the default theme");
                self.themes.first().cloned().unwrap_or_else(|| {
                    ColorTheme::new(
                        "plain",
                        [BLACK, PaletteColor::from_rgb(255, 255, 255), BLACK],
                        PaletteColor::from_rgb(255, 255, 255),
                        1.0,
                    )
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn default_catalog_registers_five_themes() {
        let catalog = ThemeCatalog::default();
        let names: Vec<&str> = catalog.themes().iter().map(ColorTheme::name).collect();
        assert_eq!(names, ["night", "ocean", "forest", "blossom", "dusk"]);
        let blossom = catalog.get("blossom").expect("registered");
        assert_eq!(blossom.border_color(), PaletteColor::from_rgb(255, 255, 0));
        assert_eq!(blossom.border_width(), 1.0);
    }

    #[test]
    fn empty_catalog_reports_empty_for_random() {
        let catalog = ThemeCatalog::new(Vec::new());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            catalog.resolve(&ThemeSelector::Random, &mut rng),
            Err(ThemeError::Empty)
        );
        assert_eq!(
            catalog
                .resolve_or_default(&ThemeSelector::Random, &mut rng)
                .name(),
            "plain"
        );
    }
}
