use shared::{ClientConfig, DEFAULT_SEGMENTER_TIMEOUT_SECS, SegmentationMode};
use std::env;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub port: u16,
    pub frontend_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let classifier_base_url = required("CLASSIFIER_BASE_URL")?;
        let segmenter_base_url = required("SEGMENTER_BASE_URL")?;

        let segmentation_mode = match lookup("SEGMENTATION_MODE") {
            Some(value) => value
                .trim()
                .parse::<SegmentationMode>()
                .map_err(|_| ConfigError::Invalid {
                    name: "SEGMENTATION_MODE",
                    value,
                })?,
            None => SegmentationMode::default(),
        };

        let segmenter_timeout_secs = match lookup("SEGMENTER_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "SEGMENTER_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_SEGMENTER_TIMEOUT_SECS,
        };

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => 8081,
        };

        let frontend_dir = lookup("FRONTEND_DIST").unwrap_or_else(|| {
            match lookup("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => format!("{}/../frontend/dist", manifest_dir),
                None => "/usr/src/app/frontend/dist".to_string(),
            }
        });

        Ok(Self {
            client: ClientConfig {
                classifier_base_url,
                segmenter_base_url,
                segmentation_mode,
                segmenter_timeout_secs,
            },
            port,
            frontend_dir,
        })
    }
}
