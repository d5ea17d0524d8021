use std::path::Path;

use pgscaffold_generate::GenVersion;
use pgscaffold_introspect::ResolveOptions;
use pgscaffold_preserve::{PreserveConfig, write_atomic};
use serde::{Deserialize, Serialize};

use crate::CliError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    pub gen_version: GenVersion,
}

/// Contents of the optional `--config` TOML file. Every section may be
/// omitted; command-line flags win over file values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preserve: PreserveConfig,
    pub generate: GenerateSettings,
    pub resolve: ResolveOptions,
}

/// Read settings from `path`; a missing file is created with the defaults.
pub fn load_or_create_settings(path: &Path) -> Result<Settings, CliError> {
    if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|err| {
            CliError::InvalidConfig(format!("failed to read {}: {err}", path.display()))
        })?;
        let settings: Settings = toml::from_str(&content)?;
        validate(&settings)?;
        return Ok(settings);
    }

    let settings = Settings::default();
    save_settings(path, &settings)?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), CliError> {
    let encoded = toml::to_string_pretty(settings)?;
    write_atomic(path, encoded.as_bytes())?;
    Ok(())
}

fn validate(settings: &Settings) -> Result<(), CliError> {
    if settings.preserve.tool_name.trim().is_empty()
        || settings.preserve.tool_name.contains(char::is_whitespace)
    {
        return Err(CliError::InvalidConfig(
            "preserve.tool_name must be a single non-empty word".to_string(),
        ));
    }
    if let Some(ext) = settings
        .preserve
        .extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        return Err(CliError::InvalidConfig(format!(
            "preserve.extensions entries are bare extensions, got '{ext}'"
        )));
    }
    Ok(())
}
