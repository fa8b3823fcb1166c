//! Color literal canonicalization.
//!
//! Every surface spelling of a color (`#F00`, `#ff0000ff`, `rgb(255 0 0)`,
//! `hsl(0, 100%, 50%)`, `red`) is normalized to one 8-bit RGBA tuple. The tuple
//! is the equality key used by the variable table; the spelling never is.
//! Decoding is done by `csscolorparser`; this module decides which spellings
//! count as literals.

/// Functions whose calls are color literals.
const COLOR_FUNCTIONS: &[&str] = &["hsl", "hsla", "rgb", "rgba"];

/// A color normalized to 8-bit channels. Alpha 255 is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Alpha channel, 0 (transparent) to 255 (opaque).
    pub alpha: u8,
    /// Blue channel.
    pub blue: u8,
    /// Green channel.
    pub green: u8,
    /// Red channel.
    pub red: u8,
}

impl Rgba {
    /// Canonical lowercase hex text: `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    pub fn canonical(&self) -> String {
        if self.alpha == u8::MAX {
            return format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue);
        }
        return format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        );
    }

    /// Parse a hex literal with or without the leading `#`.
    /// Accepts 3, 4, 6 and 8 digit forms; anything else is not a color.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if !digits.chars().all(|c| return c.is_ascii_hexdigit()) {
            return None;
        }
        return decode(&format!("#{digits}"));
    }

    /// Parse a functional literal: `rgb()`, `rgba()`, `hsl()` or `hsla()`.
    ///
    /// Channels may be comma or space separated, alpha may follow a `/`.
    /// Arguments that are not plain numbers or percentages (variables, nested
    /// functions) make the literal unparseable.
    pub fn from_function(text: &str) -> Option<Self> {
        let (name, _) = text.split_once('(')?;
        let name = name.trim().to_ascii_lowercase();
        if !COLOR_FUNCTIONS.contains(&name.as_str()) || text.contains(['@', '$']) {
            return None;
        }
        return decode(text);
    }

    /// Look up a CSS named color, case-insensitively.
    ///
    /// Words made only of hex digits (`bad`, `decade`) are never names.
    pub fn from_name(name: &str) -> Option<Self> {
        let is_word = !name.is_empty() && name.chars().all(|c| return c.is_ascii_alphabetic());
        if !is_word || name.chars().all(|c| return c.is_ascii_hexdigit()) {
            return None;
        }
        return decode(name);
    }

    /// Parse any supported literal form. Named colors are only considered when
    /// `allow_named` is set.
    pub fn parse(text: &str, allow_named: bool) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed);
        }
        if trimmed.contains('(') {
            return Self::from_function(trimmed);
        }
        if allow_named {
            return Self::from_name(trimmed);
        }
        return None;
    }
}

/// Decode CSS color text into 8-bit channels.
fn decode(text: &str) -> Option<Rgba> {
    let [red, green, blue, alpha] = csscolorparser::parse(text).ok()?.to_rgba8();
    return Some(Rgba { alpha, blue, green, red });
}
