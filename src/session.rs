use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::export::{self, ExportFormat};
use crate::helper;
use crate::options::CodeOptions;
use crate::symbology::{self, Symbol};

/// A successful render and the options it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub svg: String,
    pub symbol: Symbol,
    pub options: CodeOptions,
}

impl Rendered {
    /// Encodes and renders `options`.
    pub fn new(options: &CodeOptions) -> Result<Self> {
        let symbol = symbology::encode(options)?;
        let svg = helper::to_svg_string(&symbol, options);
        Ok(Self {
            svg,
            symbol,
            options: options.clone(),
        })
    }
}

/// Holds the current options and re-renders on every edit.
///
/// A failed render leaves the last good preview in place.
#[derive(Debug)]
pub struct Session {
    options: CodeOptions,
    rendered: Option<Rendered>,
    last_error: Option<String>,
}

impl Session {
    /// Starts a session and renders `options` right away.
    ///
    /// # Example
    ///
    /// ```
    /// use barqr::{CodeOptions, Session};
    ///
    /// let mut session = Session::new(CodeOptions::default());
    /// session.set_field("format", "DATA_MATRIX").unwrap();
    /// assert!(session.preview().unwrap().svg.contains("<svg"));
    /// ```
    pub fn new(options: CodeOptions) -> Self {
        let mut session = Self {
            options,
            rendered: None,
            last_error: None,
        };
        session.render();
        session
    }

    /// The current options, including edits that failed to render.
    pub fn options(&self) -> &CodeOptions {
        &self.options
    }

    /// The last successful render, if any.
    pub fn preview(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    /// Message of the most recent failed render, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Updates one field and re-renders.
    ///
    /// Invalid keys or values are returned as errors and leave the options untouched. Encoding
    /// failures are not errors here: they are logged and the previous preview stays.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        if let Err(err) = self.options.set_field(key, value) {
            error!(key, value, %err, "rejected edit");
            return Err(err);
        }
        debug!(key, value, "field updated");
        self.render();
        Ok(())
    }

    /// Writes the last successful render to `dir`.
    ///
    /// Returns [`Error::NothingToExport`] when nothing ever rendered.
    pub fn export(&self, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
        let rendered = self.rendered.as_ref().ok_or(Error::NothingToExport)?;
        export::export(rendered, format, dir)
    }

    fn render(&mut self) {
        match Rendered::new(&self.options) {
            Ok(rendered) => {
                self.rendered = Some(rendered);
                self.last_error = None;
            }
            Err(err) => {
                error!(format = %self.options.format, %err, "error generating code");
                self.last_error = Some(err.to_string());
            }
        }
    }
}
