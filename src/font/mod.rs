use std::path::{Path, PathBuf};

use fxhash::FxHashMap;

use crate::{
    math::{Point2, Vector2},
    utils::ArcRef,
};

/// Creates a new [FontManager] instance.
pub fn new() -> FontManager {
    FontManager::new()
}

mod system;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontStyle(u8);

bitflags::bitflags! {
    impl FontStyle: u8 {
        /// The font is bold.
        const BOLD = 0b00000001;
        /// The font is italic.
        const ITALIC = 0b00000010;
    }
}

#[derive(Clone, Debug)]
pub struct FontInfo {
    pub name: String,
    pub path: PathBuf,
    pub style: FontStyle,
}

const DEFAULT_GLYPH_RANGE: (u32, u32) = (0x20, 0x7E); // ASCII range

#[derive(Clone, Debug)]
pub struct Glyph {
    pub codepoint: char,
    pub width: usize,
    pub height: usize,
    pub bearing_x: f32,
    pub bearing_y: f32,
    pub advance_x: f32,
    pub bitmap: Vec<u8>,
}

impl PartialEq for Glyph {
    fn eq(&self, other: &Self) -> bool {
        self.codepoint == other.codepoint
    }
}

pub(crate) struct FontInner {
    pub info: FontInfo,
    pub font: fontdue::Font,
    pub size: f32,
    pub glyphs: FxHashMap<char, Glyph>,
    pub ascender: f32,
    pub line_height: f32,
}

impl FontInner {
    fn glyph(&mut self, c: char) -> &Glyph {
        let font = &self.font;
        let size = self.size;

        self.glyphs.entry(c).or_insert_with(|| rasterize(font, c, size))
    }
}

fn rasterize(font: &fontdue::Font, c: char, size: f32) -> Glyph {
    let (metrics, bitmap) = font.rasterize(c, size);

    Glyph {
        codepoint: c,
        width: metrics.width,
        height: metrics.height,
        bearing_x: metrics.xmin as f32,
        bearing_y: metrics.ymin as f32,
        advance_x: metrics.advance_width,
        bitmap,
    }
}

/// Text rendered into an 8-bit coverage mask.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBitmap {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
    /// Top-left corner of the mask relative to the pen origin, which is the
    /// top of the first line.
    pub offset: Vector2,
}

impl TextBitmap {
    pub fn size(&self) -> Point2 {
        Point2::new(self.width, self.height)
    }
}

/// A font face loaded at a fixed pixel size, with a glyph cache.
#[derive(Clone)]
pub struct Font {
    pub(crate) inner: ArcRef<FontInner>,
}

impl Font {
    /// Parses font `data` and rasterizes the ASCII range at `size` pixels.
    pub fn from_bytes(info: FontInfo, data: &[u8], size: f32) -> Result<Self, FontError> {
        if !(size > 0.0) {
            return Err(FontError::InvalidSize(size));
        }

        let settings = fontdue::FontSettings {
            scale: size,
            ..fontdue::FontSettings::default()
        };

        let font = fontdue::Font::from_bytes(data, settings)
            .map_err(|e| FontError::InvalidFontData(e.to_string()))?;

        let line_metrics = font
            .horizontal_line_metrics(size)
            .ok_or_else(|| FontError::InvalidFontData("missing horizontal line metrics".to_string()))?;

        let mut glyphs = FxHashMap::default();
        for codepoint in DEFAULT_GLYPH_RANGE.0..=DEFAULT_GLYPH_RANGE.1 {
            if let Some(c) = char::from_u32(codepoint) {
                glyphs.insert(c, rasterize(&font, c, size));
            }
        }

        let inner = FontInner {
            info,
            font,
            size,
            glyphs,
            ascender: line_metrics.ascent,
            line_height: line_metrics.ascent - line_metrics.descent + line_metrics.line_gap,
        };

        Ok(Font {
            inner: ArcRef::new(inner),
        })
    }

    pub(crate) fn from_info(info: FontInfo, size: f32) -> Result<Self, FontError> {
        let data = std::fs::read(&info.path).map_err(|e| FontError::Io(info.path.clone(), e))?;
        Self::from_bytes(info, &data, size)
    }

    pub fn name(&self) -> String {
        self.inner.wait_borrow().info.name.clone()
    }

    pub fn path(&self) -> PathBuf {
        self.inner.wait_borrow().info.path.clone()
    }

    pub fn size(&self) -> f32 {
        self.inner.wait_borrow().size
    }

    pub fn line_height(&self) -> f32 {
        self.inner.wait_borrow().line_height
    }

    pub fn ascender(&self) -> f32 {
        self.inner.wait_borrow().ascender
    }

    /// Lays out `text` and renders it into a single coverage mask.
    ///
    /// Lines are separated by `\n`; the first baseline sits one ascender below the
    /// pen origin. Fails with [FontError::EmptyText] when nothing would be drawn.
    pub fn bake_text(&self, text: &str) -> Result<TextBitmap, FontError> {
        let mut inner = self.inner.wait_borrow_mut();
        let ascender = inner.ascender;
        let line_height = inner.line_height;

        // First pass: place glyphs and track the bounding box.
        let mut placed = Vec::new();
        let mut pen = Vector2::ZERO;

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for c in text.chars() {
            if c == '\n' {
                pen.x = 0.0;
                pen.y += line_height;
                continue;
            }

            let glyph = inner.glyph(c);

            if glyph.width > 0 && glyph.height > 0 {
                let x0 = (pen.x + glyph.bearing_x).round();
                let y0 = (pen.y + ascender - (glyph.height as f32 + glyph.bearing_y)).round();

                min_x = min_x.min(x0);
                min_y = min_y.min(y0);
                max_x = max_x.max(x0 + glyph.width as f32);
                max_y = max_y.max(y0 + glyph.height as f32);

                placed.push((c, x0, y0));
            }

            pen.x += glyph.advance_x;
        }

        if placed.is_empty() {
            return Err(FontError::EmptyText);
        }

        let width = (max_x - min_x).ceil().max(1.0) as usize;
        let height = (max_y - min_y).ceil().max(1.0) as usize;
        let mut coverage = vec![0u8; width * height];

        // Second pass: copy glyph bitmaps, keeping the brightest value where they overlap.
        for (c, x0, y0) in placed {
            let glyph = inner.glyph(c);
            let dest_x = (x0 - min_x) as usize;
            let dest_y = (y0 - min_y) as usize;

            for (row, line) in glyph.bitmap.chunks(glyph.width).enumerate() {
                let start = (dest_y + row) * width + dest_x;
                let Some(dest) = coverage.get_mut(start..start + line.len()) else {
                    continue;
                };

                for (d, s) in dest.iter_mut().zip(line) {
                    *d = (*d).max(*s);
                }
            }
        }

        Ok(TextBitmap {
            width,
            height,
            coverage,
            offset: Vector2::new(min_x, min_y),
        })
    }
}

pub struct FontManager {
    fonts: Option<Vec<FontInfo>>,
    cached_font: FxHashMap<(String, u32), Font>,
}

impl FontManager {
    /// Creates a new FontManager. System fonts are only scanned the first time a
    /// lookup by name needs them.
    pub fn new() -> Self {
        FontManager {
            fonts: None,
            cached_font: FxHashMap::default(),
        }
    }

    /// Loads a font at `size` pixels.
    ///
    /// `font_name` is tried as a file path first. If no such file exists, the
    /// system font directories are searched for a face whose family or file name
    /// matches, so `"arial.ttf"` also finds an installed Arial.
    pub fn load_font(&mut self, font_name: &str, size: f32) -> Result<Font, FontError> {
        let key = (font_name.to_string(), size.to_bits());

        if let Some(font) = self.cached_font.get(&key) {
            return Ok(font.clone());
        }

        let path = Path::new(font_name);
        let font = if path.is_file() {
            let info = system::get_font_info(path).unwrap_or_else(|| FontInfo {
                name: font_name.to_string(),
                path: path.to_path_buf(),
                style: FontStyle::empty(),
            });

            Font::from_info(info, size)?
        } else {
            let fonts = self.fonts.get_or_insert_with(system::search_system_font);
            let info = system::find_font(fonts, font_name)
                .cloned()
                .ok_or_else(|| FontError::NotFound(font_name.to_string()))?;

            crate::log!("Using system font {} ({})", info.name, info.path.display());
            Font::from_info(info, size)?
        };

        self.cached_font.insert(key, font.clone());

        Ok(font)
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum FontError {
    NotFound(String),
    Io(PathBuf, std::io::Error),
    InvalidFontData(String),
    InvalidSize(f32),
    EmptyText,
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::NotFound(name) => write!(f, "Font not found: {}", name),
            FontError::Io(path, e) => write!(f, "Failed to read {}: {}", path.display(), e),
            FontError::InvalidFontData(e) => write!(f, "Invalid font data: {}", e),
            FontError::InvalidSize(size) => write!(f, "Invalid font size: {}", size),
            FontError::EmptyText => write!(f, "Text has no visible glyphs"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Io(_, e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_info() -> FontInfo {
        FontInfo {
            name: "Broken".to_string(),
            path: PathBuf::from("broken.ttf"),
            style: FontStyle::empty(),
        }
    }

    /// A regular installed face that can lay out ASCII, if the machine has one.
    fn installed_font() -> Option<FontInfo> {
        system::search_system_font().into_iter().find(|info| {
            info.style.is_empty()
                && Font::from_info(info.clone(), 32.0)
                    .and_then(|font| font.bake_text("ab"))
                    .is_ok()
        })
    }

    #[test]
    fn bakes_multiple_lines_below_the_ascender() {
        let Some(info) = installed_font() else {
            return;
        };

        let font = Font::from_info(info, 32.0).expect("font loaded during discovery");
        let single = font.bake_text("ab").expect("visible glyphs");
        let multi = font.bake_text("ab\ncd").expect("visible glyphs");

        let line_height = font.line_height();
        assert!(multi.height > single.height);
        assert!(multi.height as f32 > single.height as f32 + line_height * 0.5);
        assert!(multi.width >= single.width);

        // The first baseline sits one ascender below the pen origin, so the mask
        // starts where the tallest glyph's top lands.
        let ascender = font.ascender();
        let mut inner = font.inner.wait_borrow_mut();
        let top = ['a', 'b']
            .iter()
            .map(|c| {
                let glyph = inner.glyph(*c);
                ascender - (glyph.height as f32 + glyph.bearing_y)
            })
            .fold(f32::MAX, f32::min);
        assert!((single.offset.y - top).abs() <= 1.0, "{} vs {}", single.offset.y, top);
    }

    #[test]
    fn blank_text_is_empty() {
        let Some(info) = installed_font() else {
            return;
        };

        let font = Font::from_info(info, 24.0).expect("font loaded during discovery");
        assert!(matches!(font.bake_text(""), Err(FontError::EmptyText)));
        assert!(matches!(font.bake_text("   "), Err(FontError::EmptyText)));
        assert!(matches!(font.bake_text("\n\n"), Err(FontError::EmptyText)));
    }

    #[test]
    fn loads_are_cached_by_name_and_size() {
        let Some(info) = installed_font() else {
            return;
        };
        let Some(path) = info.path.to_str() else {
            return;
        };

        let mut manager = FontManager::new();
        let first = manager.load_font(path, 20.0).expect("installed font loads");
        let second = manager.load_font(path, 20.0).expect("installed font loads");
        let bigger = manager.load_font(path, 40.0).expect("installed font loads");

        assert!(first.inner == second.inner);
        assert!(first.inner != bigger.inner);
        assert_eq!(bigger.size(), 40.0);
    }

    #[test]
    fn lowercase_file_name_finds_installed_font() {
        let Some(info) = installed_font() else {
            return;
        };
        let Some(file_name) = info.path.file_name().and_then(|name| name.to_str()) else {
            return;
        };
        let requested = file_name.to_lowercase();

        let fonts = system::search_system_font();
        let found = system::find_font(&fonts, &requested).expect("matched by file stem");
        let stem = Path::new(&requested)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        assert!(
            found.name.eq_ignore_ascii_case(stem)
                || found
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.eq_ignore_ascii_case(stem))
        );

        // Not a path in the working directory, so the manager falls back to the
        // system lookup.
        if !Path::new(&requested).exists() {
            let mut manager = FontManager::new();
            assert!(manager.load_font(&requested, 24.0).is_ok());
        }
    }

    #[test]
    fn rejects_garbage_font_data() {
        let result = Font::from_bytes(dummy_info(), b"definitely not a font", 50.0);
        assert!(matches!(result, Err(FontError::InvalidFontData(_))));
    }

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(matches!(
            Font::from_bytes(dummy_info(), &[], 0.0),
            Err(FontError::InvalidSize(_))
        ));
        assert!(matches!(
            Font::from_bytes(dummy_info(), &[], f32::NAN),
            Err(FontError::InvalidSize(_))
        ));
    }

    #[test]
    fn missing_font_is_reported() {
        let mut manager = FontManager::new();
        let result = manager.load_font("no-such-font-3f9c1e.ttf", 50.0);

        match result {
            Err(FontError::NotFound(name)) => assert_eq!(name, "no-such-font-3f9c1e.ttf"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("font should not exist"),
        }
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let err = Font::from_info(
            FontInfo {
                name: "Gone".to_string(),
                path: PathBuf::from("/nonexistent/gone.ttf"),
                style: FontStyle::empty(),
            },
            12.0,
        );

        let Err(err) = err else {
            panic!("expected an error");
        };
        assert!(matches!(err, FontError::Io(..)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
