//! Fill colors and the generational lightening applied to child clusters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// An sRGB fill color.
///
/// Parsed from `#rgb` or `#rrggbb` (the `#` is optional), displayed as
/// lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hue in [0, 1), saturation and lightness in [0, 1].
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        (h / 6.0, s, l)
    }

    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = channel(l);
            return Self::rgb(v, v, v);
        }

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        Self::rgb(
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }

    pub fn lightness(self) -> f64 {
        self.to_hsl().2
    }

    /// Raise HSL lightness by `step` (absolute, so 0.1 means +10%), clamped at white.
    pub fn lighten(self, step: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + step).min(1.0))
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl FromStr for Color {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidColor {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        let expanded = match digits.len() {
            6 => digits.to_string(),
            // #rgb shorthand: every digit doubled
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(invalid("expected #rgb or #rrggbb")),
        };

        let bytes = hex::decode(&expanded).map_err(|e| invalid(&e.to_string()))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            _ => Err(invalid("expected three color channels")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#ff0000", Color::rgb(255, 0, 0))]
    #[case("FF0000", Color::rgb(255, 0, 0))]
    #[case("#0f8", Color::rgb(0, 255, 136))]
    #[case("  #123abc ", Color::rgb(0x12, 0x3a, 0xbc))]
    fn given_valid_hex_when_parsing_then_returns_color(#[case] input: &str, #[case] expected: Color) {
        assert_eq!(input.parse::<Color>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("#ff00")]
    #[case("#gg0000")]
    #[case("red")]
    fn given_invalid_hex_when_parsing_then_returns_invalid_color(#[case] input: &str) {
        let err = input.parse::<Color>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidColor { .. }), "got {err:?}");
    }

    #[test]
    fn given_color_when_displaying_then_lowercase_long_form() {
        assert_eq!(Color::rgb(0xAB, 0x0C, 0xFF).to_string(), "#ab0cff");
    }

    #[test]
    fn given_pure_red_when_lightening_ten_percent_then_returns_ff3333() {
        let red = Color::rgb(255, 0, 0);
        let lighter = red.lighten(0.1);
        assert_eq!(lighter.to_string(), "#ff3333");
        assert!(lighter.lightness() > red.lightness());
    }

    #[test]
    fn given_near_white_when_lightening_then_clamps_at_white() {
        let pale = Color::rgb(250, 250, 250);
        assert_eq!(pale.lighten(0.5), Color::WHITE);
    }

    #[test]
    fn given_gray_when_round_tripping_hsl_then_unchanged() {
        let gray = Color::rgb(128, 128, 128);
        let (h, s, l) = gray.to_hsl();
        assert_eq!(s, 0.0);
        assert_eq!(Color::from_hsl(h, s, l), gray);
    }

    #[test]
    fn given_color_when_serializing_then_uses_hex_string() {
        let color = Color::rgb(0, 128, 255);
        let s = toml::to_string(&std::collections::BTreeMap::from([("c", color)])).unwrap();
        assert_eq!(s.trim(), "c = \"#0080ff\"");
    }
}
