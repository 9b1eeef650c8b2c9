use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::{Error, Result};
use crate::helper;
use crate::session::Rendered;

const MAX_STEM_LEN: usize = 100;
const FALLBACK_STEM: &str = "code";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    /// MIME type, as used in data URIs and downloads.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

/// Turns the encoded text into a file name stem.
///
/// Characters that are illegal in file names on common filesystems become `_`.
///
/// # Example
///
/// ```
/// use barqr::export::file_stem;
///
/// assert_eq!(file_stem("https://codekraft.it"), "https___codekraft.it");
/// assert_eq!(file_stem(""), "code");
/// ```
pub fn file_stem(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem: String = cleaned.trim().chars().take(MAX_STEM_LEN).collect();
    let stem = stem.trim_end();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Returns the bytes of `rendered` in the given format.
pub fn to_bytes(rendered: &Rendered, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Svg => Ok(rendered.svg.clone().into_bytes()),
        ExportFormat::Png => {
            let img = helper::rasterize_svg(&rendered.svg)?;
            helper::to_png_bytes(&img)
        }
    }
}

/// Writes `<dir>/<stem>.<ext>`, creating `dir` when needed.
pub fn export(rendered: &Rendered, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "{}.{}",
        file_stem(&rendered.options.text),
        format.extension()
    ));
    fs::write(&path, to_bytes(rendered, format)?)?;
    info!(path = %path.display(), %format, "exported");
    Ok(path)
}
