use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const ENV_PREFIX: &str = "BOOKSHELF";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    /// Address of the catalogue service, e.g. http://localhost:8000
    pub base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientSettings {
    /// Built-in defaults, then the optional settings file, then `BOOKSHELF_*` variables
    pub fn load(settings_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)
            .context("Failed to set default settings")?;
        if let Some(path) = settings_file {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read client settings")?
            .try_deserialize()
            .context("Invalid client settings")
    }
}

#[cfg(test)]
mod client_settings_tests {
    use serial_test::serial;

    use crate::client::settings::{ClientSettings, DEFAULT_BASE_URL};

    fn settings_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).expect("Failed to write settings file");
        path
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        std::env::remove_var("BOOKSHELF_BASE_URL");
        let settings = ClientSettings::load(None).expect("Failed to load settings");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        std::env::remove_var("BOOKSHELF_BASE_URL");
        let path = settings_file("bookshelf_file", r#"base_url = "http://catalogue:9000""#);
        let settings = ClientSettings::load(Some(path.as_path())).expect("Failed to load settings");
        assert_eq!(settings.base_url, "http://catalogue:9000");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let path = settings_file("bookshelf_env", r#"base_url = "http://catalogue:9000""#);
        std::env::set_var("BOOKSHELF_BASE_URL", "http://10.0.0.7:8000");
        let settings = ClientSettings::load(Some(path.as_path()));
        std::env::remove_var("BOOKSHELF_BASE_URL");
        let _ = std::fs::remove_file(path);
        assert_eq!(
            settings.expect("Failed to load settings").base_url,
            "http://10.0.0.7:8000"
        );
    }
}
