pub const APP_QUALIFIER: &str = "it";
pub const APP_ORGANIZATION: &str = "codekraft";
pub const APP_NAME: &str = "barqr";

pub const SETTINGS_FILE: &str = "settings.json";
pub const LOG_FILE: &str = "barqr.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
