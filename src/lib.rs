//! # barqr
//!
//! Configure, preview and export QR codes, Data Matrix symbols and 1D barcodes.
//!
//! A [`CodeOptions`] record holds everything that determines the output: the text, the
//! symbology, the size, the quiet zone, the two colors and the QR error correction level. It is
//! encoded into a [`Symbol`] by the in-crate encoders, laid out and rendered as SVG or as a PNG
//! raster. A [`Session`] keeps the record and re-renders it on every edit, keeping the last good
//! preview when an edit makes the text unencodable.
//!
//! ## Supported symbologies
//!
//! - 1D: UPC-A, EAN-8, EAN-13, Code 128, Codabar.
//! - 2D: QR Code (Model 2, versions 1 to 40), Data Matrix (ECC 200, square sizes).
//!
//! ## Example
//!
//! ```rust
//! use barqr::{helper::generate_svg_string, CodeOptions, Format};
//!
//! let options = CodeOptions {
//!     text: "4006381333931".to_string(),
//!     format: Format::Ean13,
//!     ..CodeOptions::default()
//! };
//! let svg = generate_svg_string(&options).unwrap();
//! assert!(svg.contains(">4006381333931</text>"));
//! ```
//!
//! Keep a session and export the current code:
//!
//! ```rust,no_run
//! use barqr::{export::ExportFormat, CodeOptions, Session};
//!
//! let mut session = Session::new(CodeOptions::default());
//! session.set_field("color", "#1e40af").unwrap();
//! let path = session.export(ExportFormat::Png, "output".as_ref()).unwrap();
//! println!("saved {}", path.display());
//! ```
//!
//! ## Modules
//!
//! - [`symbology`]: Formats, categories and the encoder dispatch.
//! - [`qrcode`], [`datamatrix`], [`linear`]: The encoders.
//! - [`helper`]: Layout, SVG and PNG rendering, terminal drawing.
//! - [`export`], [`session`]: File output and the edit-render loop.

pub mod cli;
pub mod color;
mod commands;
pub mod datamatrix;
pub mod error;
pub mod export;
pub mod helper;
pub mod linear;
pub mod options;
pub mod qrcode;
pub mod reed_solomon;
pub mod session;
pub mod settings;
pub mod symbology;

pub use color::Color;
pub use error::{Error, Result};
pub use options::CodeOptions;
pub use session::{Rendered, Session};
pub use symbology::{ErrorCorrection, Family, Format, Symbol};

use cli::{Cli, Commands};
use settings::{FileSettingsStore, SettingsStore};

/// Shared state handed to every subcommand.
pub struct AppCtx {
    pub settings_store: Box<dyn SettingsStore>,
}

/// Runs one parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_store: Box<dyn SettingsStore> = match &cli.settings {
        Some(path) => Box::new(FileSettingsStore::with_path(path)),
        None => Box::new(FileSettingsStore::new()?),
    };
    let ctx = AppCtx { settings_store };

    match cli.command {
        Commands::Generate(args) => commands::generate::handle(args, &ctx),
        Commands::Preview(args) => commands::preview::handle(args, &ctx),
        Commands::Config(args) => commands::config::handle(args, &ctx),
        Commands::Shell(args) => commands::shell::handle(args, &ctx),
        Commands::Formats => commands::formats::handle(),
    }
}
