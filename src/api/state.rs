use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::generators::pdf::{DEFAULT_CONVERSION_TIMEOUT, DEFAULT_RENDERER_BIN};
use crate::generators::{AppendixGenerator, FormatConverter, LibreOfficeRenderer};

#[derive(Clone)]
pub struct ApiState {
    pub generator: AppendixGenerator,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_size_bytes: usize,
    pub min_image_width_cm: f64,
    pub max_image_width_cm: f64,
    pub renderer_bin: String,
    pub conversion_timeout_secs: u64,
    pub temp_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_size_bytes: 52_428_800, // 50MB
            min_image_width_cm: 8.0,
            max_image_width_cm: 20.0,
            renderer_bin: DEFAULT_RENDERER_BIN.to_string(),
            conversion_timeout_secs: DEFAULT_CONVERSION_TIMEOUT.as_secs(),
            temp_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = AppConfig::default();

        let config = AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
            max_upload_size_bytes: env_or("MAX_UPLOAD_SIZE_BYTES", defaults.max_upload_size_bytes)?,
            min_image_width_cm: env_or("MIN_IMAGE_WIDTH_CM", defaults.min_image_width_cm)?,
            max_image_width_cm: env_or("MAX_IMAGE_WIDTH_CM", defaults.max_image_width_cm)?,
            renderer_bin: env::var("PDF_RENDERER_BIN").unwrap_or(defaults.renderer_bin),
            conversion_timeout_secs: env_or(
                "CONVERSION_TIMEOUT_SECS",
                defaults.conversion_timeout_secs,
            )?,
            temp_dir: env::var("TEMP_DIR").ok().map(PathBuf::from),
        };

        if config.min_image_width_cm > config.max_image_width_cm {
            anyhow::bail!(
                "MIN_IMAGE_WIDTH_CM ({}) exceeds MAX_IMAGE_WIDTH_CM ({})",
                config.min_image_width_cm,
                config.max_image_width_cm
            );
        }

        Ok(config)
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_secs)
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, value)),
        Err(_) => Ok(default),
    }
}

impl ApiState {
    pub fn new(config: AppConfig) -> Self {
        let renderer =
            LibreOfficeRenderer::new(config.renderer_bin.clone(), config.conversion_timeout());

        let mut converter = FormatConverter::new(Arc::new(renderer));
        if let Some(dir) = &config.temp_dir {
            converter = converter.with_temp_dir(dir);
        }

        tracing::info!(
            "PDF renderer: {} (timeout {}s)",
            config.renderer_bin,
            config.conversion_timeout_secs
        );

        ApiState {
            generator: AppendixGenerator::new(converter),
            config: Arc::new(config),
        }
    }

    /// State with a custom converter, used by tests to stub the renderer.
    pub fn with_converter(config: AppConfig, converter: FormatConverter) -> Self {
        ApiState {
            generator: AppendixGenerator::new(converter),
            config: Arc::new(config),
        }
    }
}
