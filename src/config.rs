use serde::Deserialize;
use std::path::PathBuf;

/// Default artifact name, looked up in the working directory.
pub const DEFAULT_MODEL_PATH: &str = "model_xgb.json";
/// Default reference dataset name, looked up in the working directory.
pub const DEFAULT_DATASET_PATH: &str = "bank-additional-full_cleaned_Fix_4.csv";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub model_path: PathBuf,
    /// `None` disables the dataset preview and keeps the fixed choice lists.
    pub dataset_path: Option<PathBuf>,
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8501,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            dataset_path: Some(PathBuf::from(DEFAULT_DATASET_PATH)),
            preview_rows: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model path: {}", config.model_path.display());
        match &config.dataset_path {
            Some(path) => tracing::debug!("Dataset path: {}", path.display()),
            None => tracing::info!("Reference dataset disabled"),
        }
        tracing::debug!("Server: {}:{}", config.bind_addr, config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            bind_addr: match lookup("BIND_ADDR") {
                Some(addr) if addr.trim().is_empty() => anyhow::bail!("BIND_ADDR cannot be empty"),
                Some(addr) => addr.trim().to_string(),
                None => defaults.bind_addr,
            },
            port: lookup("PORT")
                .map(|p| {
                    p.trim()
                        .parse::<u16>()
                        .ok()
                        .filter(|p| *p > 0)
                        .ok_or_else(|| {
                            anyhow::anyhow!("PORT must be a valid number between 1-65535")
                        })
                })
                .transpose()?
                .unwrap_or(defaults.port),
            model_path: match lookup("MODEL_PATH") {
                Some(path) if path.trim().is_empty() => anyhow::bail!("MODEL_PATH cannot be empty"),
                Some(path) => PathBuf::from(path.trim()),
                None => defaults.model_path,
            },
            dataset_path: match lookup("DATASET_PATH") {
                Some(path) if path.trim().is_empty() => None,
                Some(path) => Some(PathBuf::from(path.trim())),
                None => defaults.dataset_path,
            },
            preview_rows: lookup("PREVIEW_ROWS")
                .map(|n| {
                    n.trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|n| (1..=1000).contains(n))
                        .ok_or_else(|| anyhow::anyhow!("PREVIEW_ROWS must be between 1 and 1000"))
                })
                .transpose()?
                .unwrap_or(defaults.preview_rows),
        };

        Ok(config)
    }
}
