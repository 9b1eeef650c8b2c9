use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    cli::{ConfigArgs, ConfigCommands},
    settings::{Settings, SettingsStore},
    AppCtx,
};

pub fn handle(args: ConfigArgs, ctx: &AppCtx) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let settings = ctx.settings_store.load()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigCommands::Set { key, value } => {
            set(ctx.settings_store.as_ref(), &key, &value)?;
            info!("Configuration saved successfully ✅");
        }
        ConfigCommands::Reset => {
            ctx.settings_store.save(&Settings::default())?;
            info!("Configuration reset to defaults ✅");
        }
    }
    Ok(())
}

/// Changes one saved default. `outputDir` is accepted besides the code fields.
pub fn set(store: &dyn SettingsStore, key: &str, value: &str) -> Result<Settings> {
    let mut settings = store.load()?;
    match key {
        "outputDir" | "output_dir" => {
            settings.output_dir = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        _ => settings
            .defaults
            .set_field(key, value)
            .with_context(|| format!("Failed to set {key}"))?,
    }
    settings.defaults.validate()?;
    store.save(&settings)?;
    Ok(settings)
}
