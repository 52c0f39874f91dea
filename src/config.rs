//! docqr runtime configuration handling

use crate::error::{Error, Result};
use crate::qr::InversionMode;
use crate::scanner::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_IMAGE_SCALES, ScanOptions,
};
use crate::source::AcceptPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocqrConfig {
    /// Rasterization and decoding settings
    pub scan: ScanSettings,
    /// Logging configuration
    pub logging: LoggingOptions,
    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl DocqrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["docqr.toml", "docqr.yaml", "docqr.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("docqr");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        let mut config: Self = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }?;

        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.scan.apply_env_overrides();
        self.logging.apply_env_overrides();
    }

    /// Produce validated scan options.
    pub fn scan_options(&self) -> Result<ScanOptions> {
        self.scan.to_scan_options()
    }
}

/// User-facing scan settings merged on top of `ScanOptions::default()`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Width of the canvas PDF pages are fitted into
    pub canvas_width: u32,
    /// Height of the canvas PDF pages are fitted into
    pub canvas_height: u32,
    /// Scale factors tried for images, in order
    pub image_scales: Vec<f32>,
    /// Polarities tried by the decoder
    pub inversion: InversionMode,
    /// Restrict intake to PDFs
    pub pdf_only: bool,
    /// Stop after this many PDF pages
    pub max_pages: Option<usize>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            image_scales: DEFAULT_IMAGE_SCALES.to_vec(),
            inversion: InversionMode::AttemptBoth,
            pdf_only: false,
            max_pages: None,
        }
    }
}

impl ScanSettings {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(width) = env::var("DOCQR_CANVAS_WIDTH") {
            if let Ok(parsed) = width.parse::<u32>() {
                self.canvas_width = parsed;
            }
        }
        if let Ok(height) = env::var("DOCQR_CANVAS_HEIGHT") {
            if let Ok(parsed) = height.parse::<u32>() {
                self.canvas_height = parsed;
            }
        }
        if let Ok(scales) = env::var("DOCQR_IMAGE_SCALES") {
            if let Some(parsed) = parse_scales(&scales) {
                self.image_scales = parsed;
            }
        }
        if let Ok(mode) = env::var("DOCQR_INVERSION") {
            if let Ok(parsed) = mode.parse::<InversionMode>() {
                self.inversion = parsed;
            }
        }
        if let Ok(pdf_only) = env::var("DOCQR_PDF_ONLY") {
            match pdf_only.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => self.pdf_only = true,
                "0" | "false" | "off" => self.pdf_only = false,
                _ => {}
            }
        }
        if let Ok(pages) = env::var("DOCQR_MAX_PAGES") {
            self.max_pages = pages.parse::<usize>().ok().filter(|p| *p > 0);
        }
    }

    /// Convert into validated scan options.
    pub fn to_scan_options(&self) -> Result<ScanOptions> {
        let options = ScanOptions {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            image_scales: self.image_scales.clone(),
            inversion: self.inversion,
            accept: if self.pdf_only {
                AcceptPolicy::PdfOnly
            } else {
                AcceptPolicy::PdfOrImage
            },
            max_pages: self.max_pages,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Parse a comma-separated list of scale factors, e.g. `0.5,1,0.25`.
pub fn parse_scales(value: &str) -> Option<Vec<f32>> {
    let scales = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>().ok())
        .collect::<Option<Vec<f32>>>()?;
    if scales.is_empty() { None } else { Some(scales) }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `DOCQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("DOCQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("DOCQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("DOCQR_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("DOCQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
