//! CSS value conversions to HWP units
//!
//! HWP measures character height and paragraph margins in 1/100 pt units;
//! colors are `#RRGGBB`.

/// HWP units per point
pub const UNITS_PER_PT: f32 = 100.0;

/// HWP units per CSS pixel (1px = 0.75pt)
pub const UNITS_PER_PX: f32 = 75.0;

/// Default character height (10pt) used when a size cannot be parsed
pub const DEFAULT_HEIGHT: i32 = 1000;

/// Normalize a CSS color to `#RRGGBB` (uppercase). Unknown input falls back
/// to black.
pub fn css_color_to_hex(color: &str) -> String {
    let color = color.trim().to_ascii_lowercase();

    if let Some(named) = named_color(&color) {
        return named.to_string();
    }

    if let Some(hex) = color.strip_prefix('#') {
        // #RGB -> #RRGGBB
        if hex.len() == 3 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let mut out = String::with_capacity(7);
            out.push('#');
            for c in hex.chars() {
                out.push(c.to_ascii_uppercase());
                out.push(c.to_ascii_uppercase());
            }
            return out;
        }
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return format!("#{}", hex.to_ascii_uppercase());
        }
    }

    if color.starts_with("rgb") {
        if let Some(rgb) = parse_rgb_function(&color) {
            return rgb;
        }
    }

    "#000000".to_string()
}

/// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)` channel values
fn parse_rgb_function(color: &str) -> Option<String> {
    let open = color.find('(')?;
    let close = color.find(')')?;
    let mut channels = color.get(open + 1..close)?.split(',');

    let mut next_channel = || -> Option<u8> { channels.next()?.trim().parse().ok() };
    let r = next_channel()?;
    let g = next_channel()?;
    let b = next_channel()?;
    Some(format!("#{:02X}{:02X}{:02X}", r, g, b))
}

fn named_color(name: &str) -> Option<&'static str> {
    Some(match name {
        "red" => "#FF0000",
        "green" => "#008000",
        "blue" => "#0000FF",
        "black" => "#000000",
        "white" => "#FFFFFF",
        "yellow" => "#FFFF00",
        "cyan" => "#00FFFF",
        "magenta" => "#FF00FF",
        "orange" => "#FFA500",
        "purple" => "#800080",
        "pink" => "#FFC0CB",
        "brown" => "#A52A2A",
        "gray" | "grey" => "#808080",
        "lime" => "#00FF00",
        "navy" => "#000080",
        "teal" => "#008080",
        "silver" => "#C0C0C0",
        "maroon" => "#800000",
        "olive" => "#808000",
        _ => return None,
    })
}

/// Convert a point size to HWP units
pub fn pt_to_units(pt: f32) -> i32 {
    (pt * UNITS_PER_PT).round() as i32
}

/// Parse a CSS font-size ("11pt", "14", "16px") into HWP units
pub fn font_size_to_units(size: &str) -> i32 {
    css_length_to_units(size).unwrap_or(DEFAULT_HEIGHT)
}

/// Parse a CSS length ("12pt", "40px", bare number = pt) into HWP units
pub fn css_length_to_units(value: &str) -> Option<i32> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(px) = value.strip_suffix("px") {
        let px: f32 = px.trim().parse().ok()?;
        return Some((px * UNITS_PER_PX).round() as i32);
    }
    let pt = value.strip_suffix("pt").unwrap_or(&value).trim();
    let pt: f32 = pt.parse().ok()?;
    Some(pt_to_units(pt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_hex_colors() {
        assert_eq!(css_color_to_hex("red"), "#FF0000");
        assert_eq!(css_color_to_hex(" Navy "), "#000080");
        assert_eq!(css_color_to_hex("#abc"), "#AABBCC");
        assert_eq!(css_color_to_hex("#ff00aa"), "#FF00AA");
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(css_color_to_hex("rgb(255, 0, 128)"), "#FF0080");
        assert_eq!(css_color_to_hex("rgba(0,128,0,0.5)"), "#008000");
    }

    #[test]
    fn test_unknown_color_falls_back_to_black() {
        assert_eq!(css_color_to_hex("chartreuse-ish"), "#000000");
        assert_eq!(css_color_to_hex("#12"), "#000000");
    }

    #[test]
    fn test_lengths() {
        assert_eq!(font_size_to_units("11pt"), 1100);
        assert_eq!(font_size_to_units("14"), 1400);
        assert_eq!(font_size_to_units("nonsense"), DEFAULT_HEIGHT);
        assert_eq!(css_length_to_units("40px"), Some(3000));
        assert_eq!(css_length_to_units("-18pt"), Some(-1800));
    }
}
