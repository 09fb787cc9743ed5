//! Style registry – the closed set of named text styles used by the cover
//! and message composers.
//!
//! Styles are looked up through [`StyleName`]; string lookups go through
//! [`StyleRegistry::resolve`] which rejects anything outside that set.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Horizontal alignment of text lines and images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Offset of an item `item_width` wide inside a slot `slot_width` wide.
    pub fn offset(self, slot_width: f32, item_width: f32) -> f32 {
        let free = (slot_width - item_width).max(0.0);
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => free / 2.0,
            TextAlign::Right => free,
        }
    }
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const GREY: Self = Self {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 1.0,
    };
    /// `#F5F5F5`, the bubble fill.
    pub const WHITESMOKE: Self = Self {
        r: 0.96,
        g: 0.96,
        b: 0.96,
        a: 1.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Names of the registered styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleName {
    #[serde(rename = "coverTitle")]
    CoverTitle,
    #[serde(rename = "coverSubTitle")]
    CoverSubTitle,
    #[serde(rename = "message")]
    Message,
}

impl StyleName {
    pub const ALL: [StyleName; 3] = [
        StyleName::CoverTitle,
        StyleName::CoverSubTitle,
        StyleName::Message,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleName::CoverTitle => "coverTitle",
            StyleName::CoverSubTitle => "coverSubTitle",
            StyleName::Message => "message",
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StyleName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownStyle(s.to_string()))
    }
}

/// A resolved text style.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: StyleName,
    /// Font size in points.
    pub font_size: f32,
    /// Distance between consecutive baselines in points.
    pub leading: f32,
    pub alignment: TextAlign,
    pub color: Color,
    pub bold: bool,
}

/// The fixed set of styles, built once and never mutated.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    cover_title: Style,
    cover_sub_title: Style,
    message: Style,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self {
            cover_title: Style {
                name: StyleName::CoverTitle,
                font_size: 40.0,
                leading: 42.0,
                alignment: TextAlign::Center,
                color: Color::BLACK,
                bold: true,
            },
            cover_sub_title: Style {
                name: StyleName::CoverSubTitle,
                font_size: 24.0,
                leading: 26.0,
                alignment: TextAlign::Center,
                color: Color::BLACK,
                bold: true,
            },
            message: Style {
                name: StyleName::Message,
                font_size: 10.0,
                leading: 12.0,
                alignment: TextAlign::Left,
                color: Color::BLACK,
                bold: false,
            },
        }
    }

    /// Process-wide registry, populated on first use.
    pub fn global() -> &'static StyleRegistry {
        static REGISTRY: OnceLock<StyleRegistry> = OnceLock::new();
        REGISTRY.get_or_init(StyleRegistry::new)
    }

    pub fn get(&self, name: StyleName) -> &Style {
        match name {
            StyleName::CoverTitle => &self.cover_title,
            StyleName::CoverSubTitle => &self.cover_sub_title,
            StyleName::Message => &self.message,
        }
    }

    /// Look a style up by its registered name.
    pub fn resolve(&self, name: &str) -> Result<&Style> {
        Ok(self.get(name.parse()?))
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_names() {
        let styles = StyleRegistry::new();
        let title = styles.resolve("coverTitle").unwrap();
        assert_eq!(title.font_size, 40.0);
        assert_eq!(title.alignment, TextAlign::Center);
        assert_eq!(styles.resolve("coverSubTitle").unwrap().font_size, 24.0);
        assert_eq!(styles.resolve("message").unwrap().alignment, TextAlign::Left);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = StyleRegistry::new().resolve("heading").unwrap_err();
        assert!(matches!(err, Error::UnknownStyle(ref n) if n == "heading"));
        assert!(StyleRegistry::new().resolve("CoverTitle").is_err());
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(TextAlign::Left.offset(100.0, 40.0), 0.0);
        assert_eq!(TextAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(TextAlign::Right.offset(100.0, 40.0), 60.0);
        assert_eq!(TextAlign::Right.offset(100.0, 140.0), 0.0);
    }
}
