use image::Rgb;

use crate::MediaError;

fn nibble(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Parse `#rrggbb` or `#rgb`, the `#` is optional.
pub fn parse_color(s: &str) -> Result<Rgb<u8>, MediaError> {
    let invalid = || MediaError::invalid(format!("invalid color {:?}, expected #rrggbb", s));
    let hex = s.trim().strip_prefix('#').unwrap_or_else(|| s.trim());
    let digits = hex
        .bytes()
        .map(nibble)
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(invalid)?;

    match digits[..] {
        [r, g, b] => Ok(Rgb([r * 17, g * 17, b * 17])),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgb([r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0])),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_forms() {
        assert_eq!(parse_color("#ffffff").unwrap(), Rgb([255, 255, 255]));
        assert_eq!(parse_color("000000").unwrap(), Rgb([0, 0, 0]));
        assert_eq!(parse_color("#1A2b3C").unwrap(), Rgb([0x1a, 0x2b, 0x3c]));
        assert_eq!(parse_color("#f80").unwrap(), Rgb([0xff, 0x88, 0x00]));
    }

    #[test]
    fn bad_colors() {
        for s in ["", "#", "#12", "#12345", "#gggggg", "red", "#ffffff00"] {
            let err = parse_color(s).unwrap_err();
            assert_eq!(err.kind(), "InvalidParameter", "{:?}", s);
        }
    }
}
