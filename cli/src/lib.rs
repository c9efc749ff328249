use particle_field::{ColorTintMapping, FieldError, FieldSettings, Pipeline};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    FieldError(#[from] FieldError),
    #[error("No input image: pass --image or set 'image' in the config")]
    MissingImage,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Configuration document for one sampling run
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Image to sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    /// Where the output JSON is written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub settings: FieldSettings,
}

enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFileFormat),
    }
}

impl FieldConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        match format_of(path_ref)? {
            Format::Toml => Self::from_toml_file(path_ref),
            Format::Json => Self::from_json_file(path_ref),
        }
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Convert configuration to JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save configuration, choosing the format from the extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_ref = path.as_ref();
        let content = match format_of(path_ref)? {
            Format::Toml => self.to_toml()?,
            Format::Json => self.to_json()?,
        };
        fs::write(path_ref, content)?;
        Ok(())
    }

    /// Enable tinting with the given mappings
    pub fn with_tint(mut self, mappings: Vec<ColorTintMapping>) -> Self {
        let tint = &mut self.settings.sampler.color_tint;
        tint.enabled = !mappings.is_empty();
        tint.mappings = mappings;
        self
    }

    /// Image path from the command line, falling back to the document
    pub fn resolve_image(&self, cli_image: Option<&Path>) -> Result<PathBuf, ConfigError> {
        cli_image
            .map(Path::to_path_buf)
            .or_else(|| self.image.clone())
            .ok_or(ConfigError::MissingImage)
    }

    /// Validate the settings and build a pipeline
    pub fn pipeline(&self) -> Result<Pipeline, ConfigError> {
        Ok(Pipeline::new(self.settings.clone())?)
    }

    /// Get the JSON schema of the configuration document
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FieldConfig)
    }
}
