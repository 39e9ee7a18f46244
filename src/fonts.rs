use std::collections::HashMap;
use std::path::Path;

use fontdue::Font;

use crate::error::{Error, Result};
use crate::graphics::TextMeasurer;

/// Parsed fonts, addressed by the name they were loaded under.
///
/// The first font loaded becomes the default used for unnamed text.
#[derive(Default)]
pub struct FontManager {
    fonts: Vec<Font>,
    names: HashMap<String, usize>,
}

impl std::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager").field("names", &self.names).finish()
    }
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_font(&mut self, name: &str, location: impl AsRef<Path>) -> Result<()> {
        let path = location.as_ref();
        let data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_font_bytes(name, &data)
    }

    /// Loading under an existing name replaces that font.
    pub fn load_font_bytes(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let font = Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|reason| Error::FontParse { name: name.to_string(), reason })?;

        match self.names.get(name) {
            Some(&index) => self.fonts[index] = font,
            None => {
                self.names.insert(name.to_string(), self.fonts.len());
                self.fonts.push(font);
            }
        }
        log::debug!("loaded font {}", name);
        Ok(())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn font(&self, name: &str) -> Option<&Font> {
        self.index_of(name).map(|index| &self.fonts[index])
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub fn default_font(&self) -> Option<&Font> {
        self.fonts.first()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Width is the pen advance, so trailing and leading spaces count.
    pub fn measure_with(&self, text: &str, font_size: f32, font_index: usize) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, font_size);
        }
        let Some(font) = self.fonts.get(font_index) else {
            // No usable font yet: approximate with half an em per character.
            return (text.chars().count() as f32 * font_size * 0.5, font_size);
        };

        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            if let Some(left) = previous {
                width += font.horizontal_kern(left, c, font_size).unwrap_or(0.0);
            }
            width += font.metrics(c, font_size).advance_width;
            previous = Some(c);
        }

        let height = font
            .horizontal_line_metrics(font_size)
            .map_or(font_size, |line| line.new_line_size);
        (width, height)
    }
}

impl TextMeasurer for FontManager {
    fn measure_text(&self, text: &str, font_size: f32) -> (f32, f32) {
        self.measure_with(text, font_size, 0)
    }
}
