use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    cli::GenerateArgs,
    export::{self, ExportFormat},
    helper::print_symbol,
    session::Rendered,
    AppCtx,
};

pub fn handle(args: GenerateArgs, ctx: &AppCtx) -> Result<()> {
    let settings = ctx.settings_store.load()?;
    let options = args.code.apply(settings.defaults);
    let rendered = Rendered::new(&options).context("Failed to generate code")?;

    if args.print {
        print_symbol(&rendered.symbol);
    }

    let dir = args
        .output
        .or(settings.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    for format in formats(args.svg, args.png) {
        let path = export::export(&rendered, format, &dir)
            .with_context(|| format!("Failed to export {} to {}", format, dir.display()))?;
        info!("Saved {} ✅", path.display());
    }
    Ok(())
}

/// Neither flag means both.
fn formats(svg: bool, png: bool) -> Vec<ExportFormat> {
    match (svg, png) {
        (true, false) => vec![ExportFormat::Svg],
        (false, true) => vec![ExportFormat::Png],
        _ => vec![ExportFormat::Svg, ExportFormat::Png],
    }
}
