//! `#rrggbb` colour strings used by palettes and point labels.

/// Parse a `#rrggbb` (or bare `rrggbb`) hex string into an RGB triple.
#[must_use]
pub fn parse_hex_color(text: &str) -> Option<[u8; 3]> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Format an RGB triple as a lowercase `#rrggbb` string.
#[must_use]
pub fn format_hex_color([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_entries() {
        assert_eq!(parse_hex_color("#160f29"), Some([0x16, 0x0f, 0x29]));
        assert_eq!(parse_hex_color("DDBEA8"), Some([0xdd, 0xbe, 0xa8]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn formats_lowercase() {
        assert_eq!(format_hex_color([0x24, 0x6a, 0x73]), "#246a73");
        let parsed = parse_hex_color(&format_hex_color([1, 2, 3]));
        assert_eq!(parsed, Some([1, 2, 3]));
    }
}
