//! Print styling derived from the theme.
//!
//! The analog of the print stylesheet in the HTML rendering path this crate
//! replaces: page geometry, type scale and colors, parameterized entirely by
//! branding.

use crate::Theme;
use folio_core::Branding;
use folio_error::FolioResult;

/// Resolved print styling for a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    /// Page width in points (US Letter)
    pub page_width: f32,
    /// Page height in points
    pub page_height: f32,
    /// Uniform page margin in points
    pub margin: f32,
    /// Space reserved at the page bottom for the page number
    pub footer_height: f32,
    /// Cover/document title size
    pub title_size: f32,
    /// Section heading size
    pub h1_size: f32,
    /// Subsection heading size
    pub h2_size: f32,
    /// Body text size
    pub body_size: f32,
    /// Small text size (captions, attributions, page numbers)
    pub small_size: f32,
    /// Line height as a multiple of font size
    pub leading: f32,
    /// Resolved brand colors and font
    pub theme: Theme,
}

impl Stylesheet {
    /// Build a stylesheet from caller branding merged over defaults.
    ///
    /// # Errors
    ///
    /// Propagates `InvalidBranding` from theme resolution.
    pub fn from_branding(branding: &Branding) -> FolioResult<Self> {
        Ok(Self::from_theme(Theme::from_branding(branding)?))
    }

    /// Build a stylesheet around a resolved theme.
    pub fn from_theme(theme: Theme) -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 54.0,
            footer_height: 28.0,
            title_size: 30.0,
            h1_size: 20.0,
            h2_size: 14.0,
            body_size: 10.5,
            small_size: 8.5,
            leading: 1.45,
            theme,
        }
    }

    /// Usable text width between the margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Line height for a font size.
    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.leading
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_theme(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_width_accounts_for_margins() {
        let sheet = Stylesheet::default();
        assert_eq!(sheet.content_width(), 612.0 - 108.0);
    }
}
