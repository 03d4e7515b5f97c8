//! Shared configuration loader for the snip toolchain.
//!
//! `defaults/snip.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`SnipConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use snip_babel::store::validate_table_name;
use snip_babel::{ExportError, InvocationStyle, QuoteResolution, TargetContext};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/snip.default.toml");

/// Top-level configuration consumed by snip applications.
#[derive(Debug, Clone, Deserialize)]
pub struct SnipConfig {
    pub store: StoreConfig,
    pub export: ExportConfig,
    pub invocation: InvocationConfig,
    #[serde(default)]
    pub formats: BTreeMap<String, FormatOverride>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub output_root: PathBuf,
    pub scope: String,
    pub language: String,
    #[serde(default)]
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvocationConfig {
    pub template: String,
    pub quotes: QuoteMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum QuoteMode {
    #[serde(rename = "escape")]
    Escape,
    #[serde(rename = "swap")]
    Swap,
}

impl From<QuoteMode> for QuoteResolution {
    fn from(mode: QuoteMode) -> Self {
        match mode {
            QuoteMode::Escape => QuoteResolution::Escape,
            QuoteMode::Swap => QuoteResolution::Swap,
        }
    }
}

/// Settings of one format that differ from `[export]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatOverride {
    pub scope: Option<String>,
    pub language: Option<String>,
    /// Output directory, relative to `export.output_root`.
    pub directory: Option<PathBuf>,
}

impl SnipConfig {
    /// The table name, checked to be a plain SQL identifier.
    pub fn table(&self) -> Result<&str, ExportError> {
        validate_table_name(&self.store.table)?;
        Ok(&self.store.table)
    }

    pub fn invocation_style(&self) -> Result<InvocationStyle, ExportError> {
        InvocationStyle::new(
            self.invocation.template.clone(),
            self.invocation.quotes.into(),
        )
        .map_err(|e| ExportError::InvalidInvocation(e.to_string()))
    }

    /// Where and how `format` is written.
    pub fn target_for(&self, format: &str) -> Result<TargetContext, ExportError> {
        let overrides = self.formats.get(format).cloned().unwrap_or_default();
        let directory = overrides
            .directory
            .unwrap_or_else(|| PathBuf::from(format));
        let target = TargetContext::new(
            overrides.scope.unwrap_or_else(|| self.export.scope.clone()),
            overrides
                .language
                .unwrap_or_else(|| self.export.language.clone()),
            self.export.output_root.join(directory),
        );
        Ok(target.with_invocation(self.invocation_style()?))
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<SnipConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SnipConfig, ConfigError> {
    Loader::new().build()
}
