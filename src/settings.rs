use std::path::Path;

// config lets you read a separate config file
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::cursor::{ConcurrencyMode, ScrollSensitivity};
use crate::error::Result;

pub const ENV_PREFIX: &str = "ROWFILE";

/// Everything about a cursor that is chosen before it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub delimiter: char,
    pub encoding: String,
    pub scroll: ScrollSensitivity,
    pub concurrency: ConcurrencyMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: ',',
            encoding: "UTF-8".to_owned(),
            scroll: ScrollSensitivity::Scrollable,
            concurrency: ConcurrencyMode::Updatable,
        }
    }
}

impl Settings {
    /// Defaults, then the optional TOML file, then `ROWFILE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("delimiter", ",")?
            .set_default("encoding", "UTF-8")?
            .set_default("scroll", "scrollable")?
            .set_default("concurrency", "updatable")?;
        if let Some(path) = path {
            builder = builder
                .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        Ok(builder.build()?.try_deserialize::<Settings>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp settings");
        writeln!(file, "delimiter = \";\"\nscroll = \"forward_only\"").unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.delimiter, ';');
        assert_eq!(settings.scroll, ScrollSensitivity::ForwardOnly);
        assert_eq!(settings.concurrency, ConcurrencyMode::Updatable);
        assert_eq!(settings.encoding, "UTF-8");
    }

    #[test]
    fn bad_values_are_config_errors() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp settings");
        writeln!(file, "concurrency = \"sometimes\"").unwrap();
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, crate::error::RowfileError::Config(_)));
    }
}
