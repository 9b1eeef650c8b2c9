use std::fmt::Write as _;
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg, usvg::fontdb};
use tracing::{debug, warn};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::linear::Bars;
use crate::options::CodeOptions;
use crate::symbology::{self, Matrix, Symbol};

/*---- Layout ----*/

/// Width in pixels of one 1D module.
pub const BAR_MODULE_WIDTH: u32 = 2;
/// Bar height as a fraction of the configured size.
pub const BAR_HEIGHT_RATIO: f64 = 0.1;
/// Caption font size in pixels.
pub const FONT_SIZE: u32 = 20;
/// Gap in pixels between the bars and the caption.
pub const TEXT_MARGIN: u32 = 2;

/// A dark rectangle in output pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Human readable line under a barcode, anchored at its middle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption {
    pub x: u32,
    pub y: u32,
    pub text: String,
}

/// A symbol laid out in output pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendering {
    pub width: u32,
    pub height: u32,
    pub rects: Vec<Rect>,
    pub caption: Option<Caption>,
}

impl Rendering {
    /// Lays out `symbol` with the size and margin of `options`.
    pub fn new(symbol: &Symbol, options: &CodeOptions) -> Self {
        match symbol {
            Symbol::Matrix(matrix) => Rendering::matrix(matrix, options.size, options.margin),
            Symbol::Bars(bars) => Rendering::bars(bars, options.size, options.margin, true),
        }
    }

    /// Scales the matrix by the largest integer multiple that fits `size` once the quiet zone of
    /// `margin` modules is added, and centers it. The output grows when `size` is too small.
    fn matrix(matrix: &Matrix, size: u32, margin: u32) -> Self {
        let (cols, rows) = (matrix.width() as u32, matrix.height() as u32);
        let full_w = cols + 2 * margin;
        let full_h = rows + 2 * margin;
        let width = size.max(full_w);
        let height = size.max(full_h);
        let multiple = (width / full_w).min(height / full_h).max(1);
        let left = (width - cols * multiple) / 2;
        let top = (height - rows * multiple) / 2;

        let mut rects = Vec::new();
        for y in 0..matrix.height() {
            let mut x = 0;
            while x < matrix.width() {
                if !matrix.get(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < matrix.width() && matrix.get(x, y) {
                    x += 1;
                }
                rects.push(Rect {
                    x: left + start as u32 * multiple,
                    y: top + y as u32 * multiple,
                    width: (x - start) as u32 * multiple,
                    height: multiple,
                });
            }
        }
        Rendering {
            width,
            height,
            rects,
            caption: None,
        }
    }

    fn bars(bars: &Bars, size: u32, margin: u32, display_value: bool) -> Self {
        let bar_height = ((f64::from(size) * BAR_HEIGHT_RATIO).round() as u32).max(1);
        let modules = bars.modules().len() as u32;
        let width = modules * BAR_MODULE_WIDTH + 2 * margin;
        let text_height = if display_value {
            FONT_SIZE + TEXT_MARGIN
        } else {
            0
        };
        let height = bar_height + text_height + 2 * margin;

        let mut rects = Vec::new();
        let mut x = margin;
        for (dark, len) in bars.runs() {
            let w = len as u32 * BAR_MODULE_WIDTH;
            if dark {
                rects.push(Rect {
                    x,
                    y: margin,
                    width: w,
                    height: bar_height,
                });
            }
            x += w;
        }
        let caption = display_value.then(|| Caption {
            x: width / 2,
            y: margin + bar_height + TEXT_MARGIN + FONT_SIZE,
            text: bars.text().to_string(),
        });
        Rendering {
            width,
            height,
            rects,
            caption,
        }
    }
}

/*---- SVG ----*/

/// Returns the uncolored SVG for a laid out symbol: dark shapes only, no background.
///
/// The string always uses Unix newlines (\n), regardless of the platform.
pub fn rendering_to_svg(rendering: &Rendering) -> String {
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    let _ = writeln!(
        result,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\" shape-rendering=\"crispEdges\">",
        rendering.width, rendering.height
    );
    for r in &rendering.rects {
        let _ = writeln!(
            result,
            "\t<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
            r.x, r.y, r.width, r.height
        );
    }
    if let Some(caption) = &rendering.caption {
        let _ = writeln!(
            result,
            "\t<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"monospace\" font-size=\"{}\">{}</text>",
            caption.x,
            caption.y,
            FONT_SIZE,
            escape_xml(&caption.text)
        );
    }
    result += "</svg>\n";
    result
}

/// Returns the SVG for `symbol` colored as configured in `options`.
pub fn to_svg_string(symbol: &Symbol, options: &CodeOptions) -> String {
    let plain = rendering_to_svg(&Rendering::new(symbol, options));
    recolor_svg(&plain, options.color, options.background)
}

const SHAPES: [&str; 3] = ["rect", "path", "text"];

/// Paints every shape of `svg` with `color` and inserts a full size `background` rectangle as
/// the first child of the root element.
pub fn recolor_svg(svg: &str, color: Color, background: Color) -> String {
    let mut out = String::with_capacity(svg.len() + 96);
    let mut rest = svg;
    let mut inserted = false;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let end = start + len + 1;
        let tag = &rest[start..end];
        let name = element_name(tag);

        if SHAPES.contains(&name) {
            out.push_str(&with_fill(tag, color));
        } else {
            out.push_str(tag);
        }
        if !inserted && name == "svg" && !tag.ends_with("/>") {
            let _ = write!(
                out,
                "\n\t<rect width=\"100%\" height=\"100%\" fill=\"{background}\"/>"
            );
            inserted = true;
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn element_name(tag: &str) -> &str {
    let inner = &tag[1..];
    let end = inner
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(inner.len());
    &inner[..end]
}

/// Replaces or adds the `fill` attribute of a start tag.
fn with_fill(tag: &str, color: Color) -> String {
    let mut tag = tag.to_string();
    if let Some(pos) = tag.find(" fill=\"") {
        let value_start = pos + " fill=\"".len();
        if let Some(quote) = tag[value_start..].find('"') {
            tag.replace_range(pos..value_start + quote + 1, "");
        }
    }
    let insert_at = if tag.ends_with("/>") {
        tag.len() - 2
    } else {
        tag.len() - 1
    };
    tag.insert_str(insert_at, &format!(" fill=\"{color}\""));
    tag
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/*---- Raster ----*/

/// Rasterizes `symbol` exactly as [`to_svg_string`] draws it, caption included.
pub fn to_image_buffer(symbol: &Symbol, options: &CodeOptions) -> Result<RgbaImage> {
    rasterize_svg(&to_svg_string(symbol, options))
}

/// Renders an SVG document at its own pixel size.
pub fn rasterize_svg(svg: &str) -> Result<RgbaImage> {
    let opt = usvg::Options {
        fontdb: font_database(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| Error::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Svg(format!("empty canvas {}x{}", size.width(), size.height())))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(size.width(), size.height(), data)
        .ok_or_else(|| Error::Svg("pixel buffer size mismatch".to_string()))
}

/// Whether any font was found for drawing barcode captions.
pub fn fonts_available() -> bool {
    !font_database().is_empty()
}

/// System fonts, loaded once. The generic `monospace` family used by captions is pointed at an
/// installed face so captions render wherever at least one font exists.
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            let family = db
                .faces()
                .find(|face| face.monospaced)
                .or_else(|| db.faces().next())
                .and_then(|face| face.families.first())
                .map(|(name, _)| name.clone());
            match family {
                Some(family) => db.set_monospace_family(family),
                None => warn!("no system fonts found, barcode captions will not be rasterized"),
            }
            debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// Encodes the raster as a PNG file in memory.
pub fn to_png_bytes(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img.clone()).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Returns a `data:` URI suitable for an `<img src>`.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/*---- Terminal ----*/

/// Returns a block character drawing of `symbol` with a light border of `border` modules.
pub fn symbol_to_text(symbol: &Symbol, border: usize) -> String {
    let mut out = String::new();
    match symbol {
        Symbol::Matrix(matrix) => {
            let w = matrix.width() + 2 * border;
            let h = matrix.height() + 2 * border;
            for y in 0..h {
                for x in 0..w {
                    let dark = x >= border
                        && y >= border
                        && matrix.get(x - border, y - border);
                    let c: char = if dark { '█' } else { ' ' };
                    out.push(c);
                    out.push(c);
                }
                out.push('\n');
            }
        }
        Symbol::Bars(bars) => {
            let pad = " ".repeat(border);
            let line: String = bars
                .modules()
                .iter()
                .map(|&m| if m { '█' } else { ' ' })
                .collect();
            for _ in 0..4 {
                let _ = writeln!(out, "{pad}{line}{pad}");
            }
            let _ = writeln!(out, "{pad}{}", bars.text());
        }
    }
    out
}

/// Prints the given symbol to the console.
pub fn print_symbol(symbol: &Symbol) {
    println!("{}", symbol_to_text(symbol, 2));
}

/*---- One-shot helpers ----*/

/// Encodes and renders `options` as colored SVG.
///
/// # Example
///
/// ```
/// use barqr::{helper::generate_svg_string, CodeOptions};
///
/// let svg = generate_svg_string(&CodeOptions::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn generate_svg_string(options: &CodeOptions) -> Result<String> {
    let symbol = symbology::encode(options)?;
    Ok(to_svg_string(&symbol, options))
}

/// Encodes and rasterizes `options`.
pub fn generate_image_buffer(options: &CodeOptions) -> Result<RgbaImage> {
    let symbol = symbology::encode(options)?;
    to_image_buffer(&symbol, options)
}
