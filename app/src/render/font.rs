use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use font8x8::{UnicodeFonts, BASIC_FONTS};
use fontdue::{
    layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle},
    Font, FontSettings,
};

const FONT_EXT: &str = "ttf";
const BUILTIN_CELL: u32 = 8;
const BUILTIN_BASELINE_ROW: u32 = 7;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font name {0:?} is not a plain file name")]
    BadName(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not parse font: {0}")]
    Parse(&'static str),
    #[error("text mask of {width}x{height} pixels is too large")]
    TooLarge { width: usize, height: usize },
}

/// A rendered string as an 8 bit coverage mask.
///
/// `baseline` is the row, from the top of the mask, that text sits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMask {
    pub width: u32,
    pub height: u32,
    pub baseline: i32,
    pub coverage: Vec<u8>,
}

impl TextMask {
    fn empty(baseline: i32) -> TextMask {
        TextMask {
            width: 0,
            height: 0,
            baseline,
            coverage: Vec::new(),
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.coverage[y as usize * self.width as usize + x as usize]
    }
}

/// Checked `width * height`, with both sides still fitting a `u32`.
fn mask_dims(width: usize, height: usize) -> Result<(u32, u32, usize), FontError> {
    let too_large = || FontError::TooLarge { width, height };
    let len = width.checked_mul(height).ok_or_else(too_large)?;
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    Ok((w, h, len))
}

/// A usable typeface, either loaded from disk or the built-in 8x8 font.
#[derive(Clone)]
pub enum Face {
    TrueType { font: Arc<Font>, path: PathBuf },
    Builtin,
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::TrueType { path, .. } => f.debug_tuple("TrueType").field(path).finish(),
            Face::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Face {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Face::Builtin)
    }

    /// Rasterize `text` at roughly `px` pixels tall.
    ///
    /// Text running past `max_width` is cut off, so the mask never grows much
    /// wider than the image it is drawn on.
    pub fn mask(&self, text: &str, px: u32, max_width: u32) -> Result<TextMask, FontError> {
        match self {
            Face::TrueType { font, .. } => {
                truetype_mask(font, text, px.max(1) as f32, max_width)
            }
            Face::Builtin => builtin_mask(text, px, max_width),
        }
    }
}

/// The shortest prefix of `text` whose advance reaches past `max_width`.
fn fitting_prefix<'t>(font: &Font, text: &'t str, px: f32, max_width: f32) -> &'t str {
    let mut advance = 0.0;
    for (i, c) in text.char_indices() {
        if advance > max_width {
            return &text[..i];
        }
        advance += font.metrics(c, px).advance_width;
    }
    text
}

fn truetype_mask(
    font: &Font,
    text: &str,
    px: f32,
    max_width: u32,
) -> Result<TextMask, FontError> {
    let ascent = font
        .horizontal_line_metrics(px)
        .map(|m| m.ascent)
        .unwrap_or(px);

    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    let text = fitting_prefix(font, text, px, max_width as f32);
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let glyphs = layout
        .glyphs()
        .iter()
        .filter(|g| g.width > 0 && g.height > 0)
        .collect::<Vec<_>>();
    if glyphs.is_empty() {
        return Ok(TextMask::empty(ascent.round() as i32));
    }

    let min_x = glyphs.iter().map(|g| g.x.floor() as i32).min().unwrap_or(0);
    let min_y = glyphs.iter().map(|g| g.y.floor() as i32).min().unwrap_or(0);
    let max_x = glyphs
        .iter()
        .map(|g| g.x.floor() as i32 + g.width as i32)
        .max()
        .unwrap_or(0);
    let max_y = glyphs
        .iter()
        .map(|g| g.y.floor() as i32 + g.height as i32)
        .max()
        .unwrap_or(0);

    let span = (max_x - min_x).max(0) as usize;
    let (width, height, len) =
        mask_dims(span.min(max_width as usize), (max_y - min_y).max(0) as usize)?;
    let mut coverage = vec![0u8; len];

    for g in glyphs {
        let (metrics, bitmap) = font.rasterize_config(g.key);
        let ox = g.x.floor() as i32 - min_x;
        let oy = g.y.floor() as i32 - min_y;
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let x = ox + col as i32;
                let y = oy + row as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    continue;
                }
                let idx = y as usize * width as usize + x as usize;
                let v = bitmap[row * metrics.width + col];
                coverage[idx] = coverage[idx].max(v);
            }
        }
    }

    Ok(TextMask {
        width,
        height,
        baseline: ascent.round() as i32 - min_y,
        coverage,
    })
}

fn builtin_mask(text: &str, px: u32, max_width: u32) -> Result<TextMask, FontError> {
    let scale = (px / BUILTIN_CELL).max(1) as usize;
    let cell = BUILTIN_CELL as usize * scale;
    let baseline = i32::try_from(BUILTIN_BASELINE_ROW as usize * scale).map_err(|_| {
        FontError::TooLarge {
            width: cell,
            height: cell,
        }
    })?;
    // enough cells to cover max_width, the last one possibly cut
    let fits = (max_width as usize + cell - 1) / cell;
    let chars = text.chars().take(fits).collect::<Vec<_>>();
    if chars.is_empty() {
        return Ok(TextMask::empty(baseline));
    }

    let (width, height, len) = mask_dims(cell * chars.len(), cell)?;
    let stride = width as usize;
    let mut coverage = vec![0u8; len];

    for (i, c) in chars.into_iter().enumerate() {
        let glyph = BASIC_FONTS
            .get(c)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BUILTIN_CELL as usize {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x0 = i * cell + col * scale;
                let y0 = row * scale;
                for dy in 0..scale {
                    let start = (y0 + dy) * stride + x0;
                    coverage[start..start + scale].fill(255);
                }
            }
        }
    }

    Ok(TextMask {
        width,
        height,
        baseline,
        coverage,
    })
}

fn load_font(path: &Path) -> Result<Font, FontError> {
    let data = std::fs::read(path)?;
    Font::from_bytes(data, FontSettings::default()).map_err(FontError::Parse)
}

/// Ordered font lookup: the requested font, then the default font, then the
/// built-in bitmap font.
#[derive(Debug, Clone)]
pub struct FontChain {
    font_dir: PathBuf,
    default_font: String,
}

impl FontChain {
    pub fn new<P: Into<PathBuf>>(font_dir: P, default_font: &str) -> FontChain {
        FontChain {
            font_dir: font_dir.into(),
            default_font: default_font.to_owned(),
        }
    }

    pub fn default_font(&self) -> &str {
        &self.default_font
    }

    fn candidate(&self, name: &str) -> Result<PathBuf, FontError> {
        let name = name.trim().to_lowercase();
        let is_sep = |c: char| c == '/' || c == '\\';
        if name.is_empty() || name.starts_with('.') || name.contains(is_sep) {
            return Err(FontError::BadName(name));
        }
        Ok(self.font_dir.join(format!("{}.{}", name, FONT_EXT)))
    }

    /// Never fails, anything that can't be loaded is skipped with a warning.
    pub fn resolve(&self, requested: &str) -> Face {
        let mut names = vec![requested.trim().to_lowercase()];
        let default = self.default_font.trim().to_lowercase();
        if default != names[0] {
            names.push(default);
        }

        for name in names {
            let loaded = self
                .candidate(&name)
                .and_then(|path| load_font(&path).map(|font| (font, path)));
            match loaded {
                Ok((font, path)) => {
                    log::debug!("using font {:?}", path);
                    return Face::TrueType {
                        font: Arc::new(font),
                        path,
                    };
                }
                Err(e) => log::warn!("skipping font {:?}: {}", name, e),
            }
        }
        log::warn!("no usable font in {:?}, using built-in font", self.font_dir);
        Face::Builtin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fonts_fall_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let chain = FontChain::new(dir.path(), "impact");
        assert!(chain.resolve("Comic").is_builtin());
        assert!(chain.resolve("impact").is_builtin());
    }

    #[test]
    fn unparseable_font_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("impact.ttf"), b"not a font").unwrap();
        let chain = FontChain::new(dir.path(), "impact");
        assert!(chain.resolve("IMPACT").is_builtin());
    }

    #[test]
    fn path_like_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let chain = FontChain::new(dir.path(), "impact");
        assert!(matches!(
            chain.candidate("../secret"),
            Err(FontError::BadName(_))
        ));
        assert_eq!(
            chain.candidate("Impact").unwrap(),
            dir.path().join("impact.ttf")
        );
        assert!(chain.resolve("../secret").is_builtin());
    }

    #[test]
    fn builtin_mask_scales() {
        let mask = Face::Builtin.mask("Hi", 16, 1000).unwrap();
        assert_eq!((mask.width, mask.height, mask.baseline), (32, 16, 14));
        assert!(mask.coverage.iter().any(|&c| c == 255));

        let tiny = Face::Builtin.mask("x", 1, 1000).unwrap();
        assert_eq!((tiny.width, tiny.height), (8, 8));

        let empty = Face::Builtin.mask("", 16, 1000).unwrap();
        assert_eq!((empty.width, empty.height), (0, 0));
    }

    #[test]
    fn long_text_is_cut_at_max_width() {
        let mask = Face::Builtin.mask(&"W".repeat(400_000), 115, 1920).unwrap();
        // 14x scale, 112px cells: 18 cells cover 1920px
        assert_eq!((mask.width, mask.height), (18 * 112, 112));
        assert_eq!(mask.coverage.len(), 18 * 112 * 112);

        let short = Face::Builtin.mask("Hi", 16, 1920).unwrap();
        assert_eq!(short.width, 32);

        let none = Face::Builtin.mask("Hi", 16, 0).unwrap();
        assert_eq!((none.width, none.height), (0, 0));
    }

    #[test]
    fn installed_font_is_used() {
        let dir = tempfile::tempdir().unwrap();
        if crate::render::install_system_font(dir.path(), "impact").is_none() {
            eprintln!("no system ttf font found, skipping");
            return;
        }
        let chain = FontChain::new(dir.path(), "impact");
        let face = chain.resolve("Comic");
        assert!(!face.is_builtin(), "{:?}", face);
        assert!(!chain.resolve("IMPACT").is_builtin());

        let mask = face.mask("Hello", 32, 1000).unwrap();
        assert!(mask.width > 0 && mask.height > 0);
        // the baseline sits at or just below the bottom of descender-free text
        assert!(mask.baseline > 0 && mask.baseline <= mask.height as i32 + 1);
        assert!(mask.coverage.iter().any(|&c| c > 128));

        let long = face.mask(&"W".repeat(400_000), 115, 1920).unwrap();
        assert!(long.width <= 1920);
        assert_eq!(long.coverage.len(), (long.width * long.height) as usize);
    }
}
