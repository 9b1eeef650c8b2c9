use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datamatrix::DataMatrix;
use crate::error::{Error, Result};
use crate::linear::{self, Bars};
use crate::options::CodeOptions;
use crate::qrcode::{QrCode, QrCodeEcc};

/// Supported symbologies, named the way the format selector names them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "UPC")]
    Upc,
    #[serde(rename = "EAN8")]
    Ean8,
    #[serde(rename = "EAN13")]
    Ean13,
    #[serde(rename = "CODE128")]
    Code128,
    #[serde(rename = "CODABAR")]
    Codabar,
    #[serde(rename = "QR_CODE")]
    QrCode,
    #[serde(rename = "DATA_MATRIX")]
    DataMatrix,
}

/// Category a format belongs to, as grouped in the format selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    OneD,
    TwoD,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Family::OneD => "Category 1D",
            Family::TwoD => "Category 2D",
        })
    }
}

impl Format {
    /// Every format, in selector order.
    pub const ALL: [Format; 7] = [
        Format::Upc,
        Format::Ean8,
        Format::Ean13,
        Format::Code128,
        Format::Codabar,
        Format::QrCode,
        Format::DataMatrix,
    ];

    /// Whether the format is a 1D barcode or a 2D matrix symbol.
    ///
    /// # Example
    ///
    /// ```
    /// use barqr::{Family, Format};
    ///
    /// assert_eq!(Format::DataMatrix.family(), Family::TwoD);
    /// assert_eq!(Format::Codabar.family(), Family::OneD);
    /// ```
    pub fn family(self) -> Family {
        match self {
            Format::QrCode | Format::DataMatrix => Family::TwoD,
            _ => Family::OneD,
        }
    }

    /// Identifier used in settings files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Format::Upc => "UPC",
            Format::Ean8 => "EAN8",
            Format::Ean13 => "EAN13",
            Format::Code128 => "CODE128",
            Format::Codabar => "CODABAR",
            Format::QrCode => "QR_CODE",
            Format::DataMatrix => "DATA_MATRIX",
        }
    }

    /// Human readable menu label.
    pub fn label(self) -> &'static str {
        match self {
            Format::Upc => "UPC",
            Format::Ean8 => "EAN-8",
            Format::Ean13 => "EAN-13",
            Format::Code128 => "Code 128",
            Format::Codabar => "Codabar",
            Format::QrCode => "QR Code",
            Format::DataMatrix => "Data Matrix",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "UPC" | "UPCA" => Ok(Format::Upc),
            "EAN8" => Ok(Format::Ean8),
            "EAN13" => Ok(Format::Ean13),
            "CODE128" => Ok(Format::Code128),
            "CODABAR" => Ok(Format::Codabar),
            "QRCODE" | "QR" => Ok(Format::QrCode),
            "DATAMATRIX" => Ok(Format::DataMatrix),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

/// QR error correction level as chosen in the settings panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    /// Every level, from lowest to highest.
    pub const ALL: [ErrorCorrection; 4] = [
        ErrorCorrection::L,
        ErrorCorrection::M,
        ErrorCorrection::Q,
        ErrorCorrection::H,
    ];

    /// Human readable menu label.
    pub fn label(self) -> &'static str {
        match self {
            ErrorCorrection::L => "L - Low",
            ErrorCorrection::M => "M - Medium",
            ErrorCorrection::Q => "Q - Quality",
            ErrorCorrection::H => "H - High",
        }
    }
}

impl From<ErrorCorrection> for QrCodeEcc {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => QrCodeEcc::Low,
            ErrorCorrection::M => QrCodeEcc::Medium,
            ErrorCorrection::Q => QrCodeEcc::Quartile,
            ErrorCorrection::H => QrCodeEcc::High,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ErrorCorrection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(ErrorCorrection::L),
            "M" | "MEDIUM" => Ok(ErrorCorrection::M),
            "Q" | "QUALITY" | "QUARTILE" => Ok(ErrorCorrection::Q),
            "H" | "HIGH" => Ok(ErrorCorrection::H),
            _ => Err(Error::InvalidErrorCorrection(s.to_string())),
        }
    }
}

/// A rectangular grid of modules, row-major, `true` is dark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    width: usize,
    height: usize,
    modules: Vec<bool>,
}

impl Matrix {
    /// # Panics
    ///
    /// Panics if `modules.len() != width * height`.
    pub fn new(width: usize, height: usize, modules: Vec<bool>) -> Self {
        assert_eq!(modules.len(), width * height, "Module count mismatch");
        Self {
            width,
            height,
            modules,
        }
    }

    /// Modules per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Out of range coordinates are light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.modules[y * self.width + x]
    }
}

impl From<&QrCode> for Matrix {
    fn from(qr: &QrCode) -> Self {
        let size = qr.size();
        let modules = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| qr.get_module(x, y))
            .collect();
        Matrix::new(size as usize, size as usize, modules)
    }
}

impl From<&DataMatrix> for Matrix {
    fn from(dm: &DataMatrix) -> Self {
        let size = dm.size();
        let modules = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| dm.get_module(x, y))
            .collect();
        Matrix::new(size, size, modules)
    }
}

/// An encoded symbol ready for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Matrix(Matrix),
    Bars(Bars),
}

impl Symbol {
    /// Category of the symbology that produced this symbol.
    pub fn family(&self) -> Family {
        match self {
            Symbol::Matrix(_) => Family::TwoD,
            Symbol::Bars(_) => Family::OneD,
        }
    }
}

/// Returns the ISO-8859-1 bytes of `text`, or `None` when a character lies outside it.
///
/// ISO-8859-1 is what QR and Data Matrix readers assume when no ECI says otherwise.
pub(crate) fn latin1(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

/// Encodes the configured text with the configured symbology.
///
/// 2D formats go through the matrix encoders, 1D formats through the linear one.
pub fn encode(options: &CodeOptions) -> Result<Symbol> {
    options.validate()?;
    let text = options.text.as_str();
    let symbol = match options.format {
        Format::QrCode => {
            let qr = QrCode::encode_text(text, options.error_correction.into())?;
            debug!(
                version = qr.version().value(),
                mask = qr.mask().value(),
                "encoded QR code"
            );
            Symbol::Matrix(Matrix::from(&qr))
        }
        Format::DataMatrix => {
            let dm = DataMatrix::encode_text(text)?;
            debug!(size = dm.size(), "encoded Data Matrix");
            Symbol::Matrix(Matrix::from(&dm))
        }
        format => {
            let bars = linear::encode(format, text)?;
            debug!(%format, modules = bars.modules().len(), "encoded barcode");
            Symbol::Bars(bars)
        }
    };
    Ok(symbol)
}
