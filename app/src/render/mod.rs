//! Text rendering onto frames: colors, the font fallback chain and outlined
//! caption drawing.

mod color;
mod font;
mod text;

pub use color::parse_color;
pub use font::{Face, FontChain, FontError, TextMask};
pub use text::{caption_layout, draw_outlined_text, CaptionLayout, CleanDialogue};

/// A TrueType font shipped with the system, copied into `dir` as
/// `<name>.ttf`. `None` when the machine has none of them.
#[cfg(test)]
pub(crate) fn install_system_font(
    dir: &std::path::Path,
    name: &str,
) -> Option<std::path::PathBuf> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    let src = CANDIDATES.iter().map(std::path::Path::new).find(|p| p.exists())?;
    let dst = dir.join(format!("{}.ttf", name));
    std::fs::copy(src, &dst).unwrap();
    Some(dst)
}
