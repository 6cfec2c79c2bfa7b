//! Branding resolution.

use folio_core::Branding;
use folio_error::{FolioResult, RenderError, RenderErrorKind};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Parse a `#rrggbb` or `rrggbb` hex string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranding` for malformed input.
    pub fn from_hex(field: &str, value: &str) -> FolioResult<Self> {
        let hex = value.trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RenderError::new(RenderErrorKind::InvalidBranding {
                field: field.to_string(),
                value: value.to_string(),
            })
            .into());
        }
        // Length and digit checks above make these infallible
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        Ok(Self { r, g, b })
    }

    /// PDF color components in the 0.0-1.0 range.
    pub fn to_pdf(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Mix toward white; `amount` 0.0 keeps the color, 1.0 gives white.
    pub fn tint(&self, amount: f32) -> Color {
        let mix = |channel: u8| -> u8 {
            let c = channel as f32;
            (c + (255.0 - c) * amount.clamp(0.0, 1.0)).round() as u8
        };
        Color {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }
}

/// Resolved brand values: caller branding merged over hard-coded defaults.
///
/// # Examples
///
/// ```
/// use folio_render::Theme;
/// use folio_core::Branding;
///
/// let theme = Theme::from_branding(&Branding::default()).unwrap();
/// assert_eq!(theme.font_family, "Helvetica");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Headings and title color
    pub primary: Color,
    /// Subheading color
    pub secondary: Color,
    /// Callout and rule color
    pub accent: Color,
    /// Body text color
    pub text: Color,
    /// Page background color
    pub background: Color,
    /// Font family name
    pub font_family: String,
}

const DEFAULT_PRIMARY: &str = "#1a3a5c";
const DEFAULT_SECONDARY: &str = "#2a6f97";
const DEFAULT_ACCENT: &str = "#f0b13e";
const DEFAULT_TEXT: &str = "#222222";
const DEFAULT_BACKGROUND: &str = "#ffffff";
const DEFAULT_FONT_FAMILY: &str = "Helvetica";

impl Default for Theme {
    fn default() -> Self {
        // Defaults are valid hex literals
        Self::from_branding(&Branding::default()).expect("default branding parses")
    }
}

impl Theme {
    /// Merge caller branding over the documented defaults.
    ///
    /// Missing values fall back to their defaults; present-but-malformed
    /// values are an error rather than a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranding` when a supplied color fails to parse.
    pub fn from_branding(branding: &Branding) -> FolioResult<Self> {
        let resolve = |field: &str, value: &Option<String>, default: &str| -> FolioResult<Color> {
            match value {
                Some(value) => Color::from_hex(field, value),
                None => Color::from_hex(field, default),
            }
        };

        Ok(Self {
            primary: resolve("primary_color", &branding.primary_color, DEFAULT_PRIMARY)?,
            secondary: resolve(
                "secondary_color",
                &branding.secondary_color,
                DEFAULT_SECONDARY,
            )?,
            accent: resolve("accent_color", &branding.accent_color, DEFAULT_ACCENT)?,
            text: resolve("text_color", &branding.text_color, DEFAULT_TEXT)?,
            background: resolve(
                "background_color",
                &branding.background_color,
                DEFAULT_BACKGROUND,
            )?,
            font_family: branding
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_fall_back_to_defaults() {
        let theme = Theme::from_branding(&Branding::default()).unwrap();
        assert_eq!(theme.primary, Color { r: 0x1a, g: 0x3a, b: 0x5c });
        assert_eq!(theme.background, Color { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn test_supplied_values_override_defaults() {
        let branding = Branding {
            primary_color: Some("#000000".to_string()),
            font_family: Some("Georgia".to_string()),
            ..Branding::default()
        };
        let theme = Theme::from_branding(&branding).unwrap();
        assert_eq!(theme.primary, Color { r: 0, g: 0, b: 0 });
        assert_eq!(theme.font_family, "Georgia");
    }

    #[test]
    fn test_malformed_color_is_an_error() {
        let branding = Branding {
            accent_color: Some("bright-yellow".to_string()),
            ..Branding::default()
        };
        assert!(Theme::from_branding(&branding).is_err());
    }

    #[test]
    fn test_tint_moves_toward_white() {
        let color = Color { r: 0, g: 100, b: 200 };
        let tinted = color.tint(0.9);
        assert!(tinted.r > 200 && tinted.g > 200 && tinted.b > 200);
    }
}
