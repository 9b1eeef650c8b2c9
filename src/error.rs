use std::io;

use thiserror::Error;

use crate::qrcode::DataTooLong;
use crate::symbology::Format;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("data too long: {0}")]
    DataTooLong(String),

    #[error("invalid contents for {format}: {reason}")]
    InvalidContents { format: Format, reason: String },

    #[error("invalid color {0:?}, expected #rgb, #rrggbb or rgb(r, g, b)")]
    InvalidColor(String),

    #[error("unknown symbology {0:?}")]
    InvalidFormat(String),

    #[error("unknown error correction level {0:?}, expected one of L, M, Q, H")]
    InvalidErrorCorrection(String),

    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("cannot find the attribute {0:?}")]
    UnknownField(String),

    #[error("cannot render SVG: {0}")]
    Svg(String),

    #[error("nothing to export, the current configuration never rendered")]
    NothingToExport,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl From<DataTooLong> for Error {
    fn from(err: DataTooLong) -> Self {
        Error::DataTooLong(err.to_string())
    }
}
