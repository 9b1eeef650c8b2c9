use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

use crate::color::Color;
use crate::options::{CodeOptions, MARGIN_RANGE, SIZE_RANGE};
use crate::symbology::{ErrorCorrection, Format};

#[derive(Parser)]
#[command(version, author, about, long_about = None)]
pub struct Cli {
    /// Optional path to the settings JSON file
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a code and write it as SVG and/or PNG
    Generate(GenerateArgs),

    /// Print the rendered SVG, a data URI or a terminal drawing to stdout
    Preview(PreviewArgs),

    /// Show or change the saved defaults
    Config(ConfigArgs),

    /// Edit a code interactively, one command per line
    Shell(CodeArgs),

    /// List the supported symbologies by category
    Formats,
}

/// Fields of the code. Anything left out comes from the saved defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct CodeArgs {
    /// Text to encode
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Symbology (e.g: QR_CODE, DATA_MATRIX, EAN13, UPC, CODE128)
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Output size in pixels
    #[arg(short, long, value_parser = value_parser!(u32).range(*SIZE_RANGE.start() as i64..=*SIZE_RANGE.end() as i64))]
    pub size: Option<u32>,

    /// Quiet zone (modules for 2D codes, pixels for barcodes)
    #[arg(short, long, value_parser = value_parser!(u32).range(*MARGIN_RANGE.start() as i64..=*MARGIN_RANGE.end() as i64))]
    pub margin: Option<u32>,

    /// Foreground color (e.g: "#000000")
    #[arg(long, value_name = "COLOR")]
    pub color: Option<Color>,

    /// Background color (e.g: "#ffffff")
    #[arg(long, value_name = "COLOR")]
    pub background: Option<Color>,

    /// QR error correction level (L, M, Q, H)
    #[arg(short, long = "error-correction", value_name = "LEVEL")]
    pub error_correction: Option<ErrorCorrection>,
}

impl CodeArgs {
    /// Overrides `base` with every field given on the command line.
    pub fn apply(&self, base: CodeOptions) -> CodeOptions {
        CodeOptions {
            text: self.text.clone().unwrap_or(base.text),
            format: self.format.unwrap_or(base.format),
            size: self.size.unwrap_or(base.size),
            margin: self.margin.unwrap_or(base.margin),
            color: self.color.unwrap_or(base.color),
            background: self.background.unwrap_or(base.background),
            error_correction: self.error_correction.unwrap_or(base.error_correction),
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub code: CodeArgs,

    /// Write an SVG file
    #[arg(long)]
    pub svg: bool,

    /// Write a PNG file
    #[arg(long)]
    pub png: bool,

    /// Output directory (defaults to the saved one, then the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also draw the code in the terminal
    #[arg(long)]
    pub print: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub code: CodeArgs,

    /// Print a base64 data URI instead of the raw SVG
    #[arg(long)]
    pub data_uri: bool,

    /// Use a PNG raster for the data URI
    #[arg(long, requires = "data_uri")]
    pub png: bool,

    /// Draw the code in the terminal instead
    #[arg(long, conflicts_with = "data_uri")]
    pub print: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the saved settings
    Show,

    /// Change one saved default (text, format, size, margin, color, background, errorCorrection, outputDir)
    Set {
        key: String,
        value: String,
    },

    /// Restore the built-in defaults
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags() {
        let cli = Cli::try_parse_from([
            "barqr", "generate", "hello", "-f", "ean-13", "-s", "400", "--color", "#f00", "--png",
            "-o", "out",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.code.text.as_deref(), Some("hello"));
        assert_eq!(args.code.format, Some(Format::Ean13));
        assert_eq!(args.code.size, Some(400));
        assert_eq!(args.code.color, Some(Color::rgb(255, 0, 0)));
        assert!(args.png && !args.svg);
        assert_eq!(args.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn size_is_range_checked() {
        assert!(Cli::try_parse_from(["barqr", "generate", "-s", "10"]).is_err());
        assert!(Cli::try_parse_from(["barqr", "generate", "-s", "1501"]).is_err());
    }

    #[test]
    fn apply_keeps_unset_fields() {
        let base = CodeOptions {
            size: 600,
            ..CodeOptions::default()
        };
        let args = CodeArgs {
            text: Some("abc".into()),
            error_correction: Some(ErrorCorrection::H),
            ..CodeArgs::default()
        };
        let options = args.apply(base);
        assert_eq!(options.text, "abc");
        assert_eq!(options.size, 600);
        assert_eq!(options.error_correction, ErrorCorrection::H);
        assert_eq!(options.format, Format::QrCode);
    }

    #[test]
    fn settings_flag_is_global() {
        let cli = Cli::try_parse_from(["barqr", "formats", "--settings", "s.json"]).unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("s.json")));
    }
}
