use anyhow::{Context, Result};

use crate::{
    cli::PreviewArgs,
    export::{self, ExportFormat},
    helper::{print_symbol, to_data_uri},
    session::Rendered,
    AppCtx,
};

pub fn handle(args: PreviewArgs, ctx: &AppCtx) -> Result<()> {
    let settings = ctx.settings_store.load()?;
    let options = args.code.apply(settings.defaults);
    let rendered = Rendered::new(&options).context("Failed to generate code")?;

    if args.print {
        print_symbol(&rendered.symbol);
    } else if args.data_uri {
        let format = if args.png {
            ExportFormat::Png
        } else {
            ExportFormat::Svg
        };
        let bytes = export::to_bytes(&rendered, format)?;
        println!("{}", to_data_uri(format.mime_type(), &bytes));
    } else {
        print!("{}", rendered.svg);
    }
    Ok(())
}
