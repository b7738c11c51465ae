use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Read an optional string variable, treating an empty value as unset.
fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Name reported by `GET /`.
    pub service_name: String,
    pub max_body_bytes: usize,
}

/// Settings for the process-wide OCR engine. Fixed at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language codes, `+`-separated (e.g. `eng+deu`).
    pub languages: String,
    pub tessdata_path: Option<String>,
    pub angle_classification: bool,
    pub use_gpu: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "eng".to_string(),
            tessdata_path: None,
            angle_classification: true,
            use_gpu: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env_non_empty("OCR_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_env_or("OCR_PORT", DEFAULT_PORT),
                service_name: env_non_empty("OCR_SERVICE_NAME")
                    .unwrap_or_else(|| "OCR API".to_string()),
                max_body_bytes: parse_env_or("OCR_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            },
            ocr: OcrConfig {
                languages: env_non_empty("OCR_LANGUAGES").unwrap_or_else(|| "eng".to_string()),
                tessdata_path: env_non_empty("OCR_TESSDATA_PATH"),
                angle_classification: parse_env_or("OCR_ANGLE_CLASSIFICATION", true),
                use_gpu: parse_env_or("OCR_USE_GPU", false),
            },
            logging: LoggingConfig::from_env(),
        }
    }
}

impl LoggingConfig {
    /// Logging settings alone, readable before a subscriber is installed.
    pub fn from_env() -> Self {
        Self {
            format: parse_env_or("OCR_LOG_FORMAT", LogFormat::Pretty),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "OCR_HOST",
        "OCR_PORT",
        "OCR_SERVICE_NAME",
        "OCR_MAX_BODY_BYTES",
        "OCR_LANGUAGES",
        "OCR_TESSDATA_PATH",
        "OCR_ANGLE_CLASSIFICATION",
        "OCR_USE_GPU",
        "OCR_LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.service_name, "OCR API");
        assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.ocr.languages, "eng");
        assert!(config.ocr.tessdata_path.is_none());
        assert!(config.ocr.angle_classification);
        assert!(!config.ocr.use_gpu);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        std::env::set_var("OCR_HOST", "127.0.0.1");
        std::env::set_var("OCR_PORT", "9090");
        std::env::set_var("OCR_SERVICE_NAME", "Menu OCR");
        std::env::set_var("OCR_LANGUAGES", "eng+deu");
        std::env::set_var("OCR_TESSDATA_PATH", "/usr/share/tessdata");
        std::env::set_var("OCR_ANGLE_CLASSIFICATION", "false");
        std::env::set_var("OCR_USE_GPU", "true");
        std::env::set_var("OCR_LOG_FORMAT", "json");

        let config = Config::from_env();
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert_eq!(config.server.service_name, "Menu OCR");
        assert_eq!(config.ocr.languages, "eng+deu");
        assert_eq!(
            config.ocr.tessdata_path.as_deref(),
            Some("/usr/share/tessdata")
        );
        assert!(!config.ocr.angle_classification);
        assert!(config.ocr.use_gpu);
        assert_eq!(config.logging.format, LogFormat::Json);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("OCR_PORT", "not-a-port");
        std::env::set_var("OCR_ANGLE_CLASSIFICATION", "sometimes");
        std::env::set_var("OCR_LOG_FORMAT", "xml");

        let config = Config::from_env();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.ocr.angle_classification);
        assert_eq!(config.logging.format, LogFormat::Pretty);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_optional_values_are_unset() {
        clear_env();
        std::env::set_var("OCR_TESSDATA_PATH", "  ");
        std::env::set_var("OCR_LANGUAGES", "");

        let config = Config::from_env();
        assert!(config.ocr.tessdata_path.is_none());
        assert_eq!(config.ocr.languages, "eng");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_host_falls_back_to_all_interfaces() {
        clear_env();
        std::env::set_var("OCR_HOST", "");
        std::env::set_var("OCR_PORT", "8123");

        let config = Config::from_env();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.bind_address(), "0.0.0.0:8123");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_logging_config_loads_independently() {
        clear_env();
        std::env::set_var("OCR_LOG_FORMAT", "JSON");
        std::env::set_var("OCR_PORT", "not-a-port");

        assert_eq!(LoggingConfig::from_env().format, LogFormat::Json);
        assert_eq!(Config::from_env().logging.format, LogFormat::Json);

        std::env::set_var("OCR_LOG_FORMAT", "xml");
        assert_eq!(LoggingConfig::from_env().format, LogFormat::Pretty);

        clear_env();
    }

    #[test]
    fn test_ocr_config_default() {
        let ocr = OcrConfig::default();
        assert_eq!(ocr.languages, "eng");
        assert!(ocr.angle_classification);
        assert!(!ocr.use_gpu);
    }
}
