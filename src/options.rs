use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::symbology::{ErrorCorrection, Format};

/// Accepted values for [`CodeOptions::size`].
pub const SIZE_RANGE: RangeInclusive<u32> = 50..=1500;
/// Accepted values for [`CodeOptions::margin`].
pub const MARGIN_RANGE: RangeInclusive<u32> = 0..=1500;

/// The field names accepted by [`CodeOptions::set_field`].
pub const FIELDS: [&str; 7] = [
    "text",
    "format",
    "size",
    "margin",
    "color",
    "background",
    "errorCorrection",
];

/// Everything that determines the rendered symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeOptions {
    pub text: String,
    pub format: Format,
    /// Output width and height in pixels for 2D symbols; bar height is derived from it for 1D.
    pub size: u32,
    /// Quiet zone: modules for 2D symbols, pixels for 1D.
    pub margin: u32,
    pub color: Color,
    pub background: Color,
    /// Only used by QR codes.
    pub error_correction: ErrorCorrection,
}

impl Default for CodeOptions {
    fn default() -> Self {
        Self {
            text: "www.codekraft.it".to_string(),
            color: Color::BLACK,
            background: Color::WHITE,
            size: 300,
            margin: 0,
            format: Format::QrCode,
            error_correction: ErrorCorrection::Q,
        }
    }
}

impl CodeOptions {
    /// Replaces one field from its string form. The record is untouched on error.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "text" => self.text = value.to_string(),
            "format" => self.format = value.parse()?,
            "size" => self.size = parse_number("size", value)?,
            "margin" => self.margin = parse_number("margin", value)?,
            "color" => self.color = value.parse()?,
            "background" => self.background = value.parse()?,
            "errorCorrection" | "error_correction" => self.error_correction = value.parse()?,
            _ => return Err(Error::UnknownField(key.to_string())),
        }
        Ok(())
    }

    /// Returns the string form of one field, as `set_field` accepts it.
    pub fn get_field(&self, key: &str) -> Result<String> {
        Ok(match key {
            "text" => self.text.clone(),
            "format" => self.format.to_string(),
            "size" => self.size.to_string(),
            "margin" => self.margin.to_string(),
            "color" => self.color.to_string(),
            "background" => self.background.to_string(),
            "errorCorrection" | "error_correction" => self.error_correction.to_string(),
            _ => return Err(Error::UnknownField(key.to_string())),
        })
    }

    /// Checks `size` and `margin` against [`SIZE_RANGE`] and [`MARGIN_RANGE`].
    ///
    /// # Example
    ///
    /// ```
    /// use barqr::{CodeOptions, Error};
    ///
    /// let options = CodeOptions { size: 10, ..CodeOptions::default() };
    /// assert!(matches!(options.validate(), Err(Error::OutOfRange { field: "size", .. })));
    /// ```
    pub fn validate(&self) -> Result<()> {
        check_range("size", self.size, SIZE_RANGE)?;
        check_range("margin", self.margin, MARGIN_RANGE)
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn check_range(field: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_form() {
        let options = CodeOptions::default();
        assert_eq!(options.text, "www.codekraft.it");
        assert_eq!(options.format, Format::QrCode);
        assert_eq!(options.size, 300);
        assert_eq!(options.margin, 0);
        assert_eq!(options.error_correction, ErrorCorrection::Q);
        assert_eq!(options.color, Color::BLACK);
        assert_eq!(options.background, Color::WHITE);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn set_field_updates_each_key() {
        let mut options = CodeOptions::default();
        options.set_field("text", "hello").unwrap();
        options.set_field("format", "EAN13").unwrap();
        options.set_field("size", "500").unwrap();
        options.set_field("margin", "10").unwrap();
        options.set_field("color", "#ff0000").unwrap();
        options.set_field("background", "#00ff00").unwrap();
        options.set_field("errorCorrection", "H").unwrap();

        assert_eq!(options.text, "hello");
        assert_eq!(options.format, Format::Ean13);
        assert_eq!(options.size, 500);
        assert_eq!(options.margin, 10);
        assert_eq!(options.color, Color::rgb(255, 0, 0));
        assert_eq!(options.background, Color::rgb(0, 255, 0));
        assert_eq!(options.error_correction, ErrorCorrection::H);

        for key in FIELDS {
            let value = options.get_field(key).unwrap();
            let mut copy = CodeOptions::default();
            copy.set_field(key, &value).unwrap();
            assert_eq!(copy.get_field(key).unwrap(), value);
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut options = CodeOptions::default();
        let err = options.set_field("colour", "#000").unwrap_err();
        assert!(matches!(err, Error::UnknownField(ref k) if k == "colour"));
        assert_eq!(options, CodeOptions::default());
    }

    #[test]
    fn bad_values_leave_record_untouched() {
        let mut options = CodeOptions::default();
        assert!(options.set_field("size", "big").is_err());
        assert!(options.set_field("color", "blue").is_err());
        assert!(options.set_field("format", "MAXICODE").is_err());
        assert_eq!(options, CodeOptions::default());
    }

    #[test]
    fn validate_checks_slider_ranges() {
        let mut options = CodeOptions {
            size: 20,
            ..CodeOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::OutOfRange { field: "size", min: 50, max: 1500, .. })
        ));
        options.size = 1500;
        options.margin = 1501;
        assert!(options.validate().is_err());
    }

    #[test]
    fn json_uses_form_keys() {
        let json = serde_json::to_value(CodeOptions::default()).unwrap();
        assert_eq!(json["errorCorrection"], "Q");
        assert_eq!(json["format"], "QR_CODE");
        assert_eq!(json["color"], "#000000");

        let partial: CodeOptions = serde_json::from_str(r#"{"text":"abc","size":400}"#).unwrap();
        assert_eq!(partial.text, "abc");
        assert_eq!(partial.size, 400);
        assert_eq!(partial.format, Format::QrCode);
    }
}
