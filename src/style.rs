// this_file: src/style.rs

//! Caption style model: anchor positions, colors, and the per-render style value.
//!
//! A [`StyleSpec`] is an immutable value supplied fresh to every render call,
//! so two near-simultaneous style edits can never produce a frame with a torn
//! mix of old and new fields.

use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizontal placement class of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical placement class of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Named caption position on the image.
///
/// Each anchor resolves to exactly one horizontal and one vertical class;
/// the plain `Center` anchor centers both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Center,
}

impl Anchor {
    /// Horizontal class of this anchor.
    pub fn horizontal(self) -> HAlign {
        match self {
            Anchor::TopLeft | Anchor::BottomLeft => HAlign::Left,
            Anchor::TopCenter | Anchor::BottomCenter | Anchor::Center => HAlign::Center,
            Anchor::TopRight | Anchor::BottomRight => HAlign::Right,
        }
    }

    /// Vertical class of this anchor.
    pub fn vertical(self) -> VAlign {
        match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => VAlign::Top,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => VAlign::Bottom,
            Anchor::Center => VAlign::Middle,
        }
    }
}

/// 8-bit RGBA color with opacity baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque white, the default caption text color.
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    /// Alpha as a unit ratio.
    pub fn alpha(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Parse `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)`, or `rgba(r, g, b, a)`
    /// where `a` is a 0.0-1.0 ratio.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let bad = || Error::InvalidParameter(format!("Invalid hex color: {}", s));
            return match hex.len() {
                6 | 8 => {
                    let mut bytes = [0u8; 4];
                    bytes[3] = 255;
                    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
                        let part = std::str::from_utf8(chunk).map_err(|_| bad())?;
                        bytes[i] = u8::from_str_radix(part, 16).map_err(|_| bad())?;
                    }
                    Ok(Rgba::new(bytes[0], bytes[1], bytes[2], bytes[3]))
                }
                _ => Err(bad()),
            };
        }

        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')'), true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest.strip_suffix(')'), false)
        } else {
            (None, false)
        };

        let body =
            body.ok_or_else(|| Error::InvalidParameter(format!("Invalid color: {}", s)))?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "Expected {} components in color: {}",
                expected, s
            )));
        }

        let channel = |part: &str| -> Result<u8> {
            part.parse::<u8>()
                .map_err(|_| Error::InvalidParameter(format!("Invalid color channel: {}", part)))
        };

        let a = if has_alpha {
            let ratio: f32 = parts[3].parse().map_err(|_| {
                Error::InvalidParameter(format!("Invalid alpha component: {}", parts[3]))
            })?;
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::InvalidParameter(format!(
                    "Alpha out of range [0, 1]: {}",
                    parts[3]
                )));
            }
            (ratio * 255.0).round() as u8
        } else {
            255
        };

        Ok(Rgba::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Immutable style parameters for one composite render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Where the caption block is anchored on the image
    pub position: Anchor,
    /// Caption text color
    pub text_color: Rgba,
    /// Caption background tint (opacity baked in)
    pub background_color: Rgba,
    /// Font family name, resolved against the font catalog
    pub font_family: String,
    /// Multiplier applied to the resolution-derived base font size
    pub font_size_multiplier: f32,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            position: Anchor::BottomLeft,
            text_color: Rgba::WHITE,
            background_color: Rgba::new(0, 0, 0, 179), // rgba(0, 0, 0, 0.7)
            font_family: "Literata".to_string(),
            font_size_multiplier: 1.0,
        }
    }
}

impl StyleSpec {
    /// Validate style parameters before rendering.
    pub fn validate(&self) -> Result<()> {
        if !self.font_size_multiplier.is_finite() || self.font_size_multiplier <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "font_size_multiplier must be > 0, got {}",
                self.font_size_multiplier
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(Error::InvalidParameter(
                "font_family must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_classes_cover_all_seven_positions() {
        let cases = [
            (Anchor::TopLeft, HAlign::Left, VAlign::Top),
            (Anchor::TopCenter, HAlign::Center, VAlign::Top),
            (Anchor::TopRight, HAlign::Right, VAlign::Top),
            (Anchor::BottomLeft, HAlign::Left, VAlign::Bottom),
            (Anchor::BottomCenter, HAlign::Center, VAlign::Bottom),
            (Anchor::BottomRight, HAlign::Right, VAlign::Bottom),
            (Anchor::Center, HAlign::Center, VAlign::Middle),
        ];
        for (anchor, h, v) in cases {
            assert_eq!(anchor.horizontal(), h, "{:?}", anchor);
            assert_eq!(anchor.vertical(), v, "{:?}", anchor);
        }
    }

    #[test]
    fn parse_hex_colors() {
        assert_eq!("#FFFFFF".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!(
            "#00000080".parse::<Rgba>().unwrap(),
            Rgba::new(0, 0, 0, 0x80)
        );
        assert!("#FFF".parse::<Rgba>().is_err());
        assert!("#GGGGGG".parse::<Rgba>().is_err());
    }

    #[test]
    fn parse_css_functional_colors() {
        assert_eq!(
            "rgba(0, 0, 0, 0.7)".parse::<Rgba>().unwrap(),
            Rgba::new(0, 0, 0, 179)
        );
        assert_eq!(
            "rgb(12, 34, 56)".parse::<Rgba>().unwrap(),
            Rgba::new(12, 34, 56, 255)
        );
        assert!("rgba(0, 0, 0)".parse::<Rgba>().is_err());
        assert!("rgba(0, 0, 0, 1.5)".parse::<Rgba>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for color in [Rgba::WHITE, Rgba::new(0, 0, 0, 179), Rgba::new(1, 2, 3, 4)] {
            let shown = color.to_string();
            assert_eq!(shown.parse::<Rgba>().unwrap(), color, "{}", shown);
        }
    }

    #[test]
    fn style_spec_defaults_match_reference_ui() {
        let style = StyleSpec::default();
        assert_eq!(style.position, Anchor::BottomLeft);
        assert_eq!(style.text_color, Rgba::WHITE);
        assert_eq!(style.background_color, Rgba::new(0, 0, 0, 179));
        assert_eq!(style.font_size_multiplier, 1.0);
        style.validate().unwrap();
    }

    #[test]
    fn style_spec_rejects_bad_multiplier() {
        let mut style = StyleSpec::default();
        style.font_size_multiplier = 0.0;
        assert!(style.validate().is_err());
        style.font_size_multiplier = f32::NAN;
        assert!(style.validate().is_err());
    }

    #[test]
    fn style_spec_round_trips_through_json() {
        let style = StyleSpec::default();
        let json = serde_json::to_string(&style).unwrap();
        let back: StyleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position, style.position);
        assert_eq!(back.text_color, style.text_color);
        assert_eq!(back.background_color, style.background_color);
        assert_eq!(back.font_family, style.font_family);
    }
}
