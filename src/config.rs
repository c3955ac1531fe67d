use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default OpenAI API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Transcription model used for every request
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Configuration for the transcription service.
///
/// The user's API key is not part of it: keys are entered per request and
/// never read from files or the environment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Transcription API settings
    pub transcription: TranscriptionConfig,

    /// Scratch file settings
    pub scratch: ScratchConfig,

    /// Session lifecycle settings
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes. Must stay above the API's 25MB
    /// ceiling.
    pub max_upload_bytes: usize,

    /// Allow cross-origin browser access
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_base_url: String,

    /// Model to use for transcription
    pub model: String,

    /// Requested output format
    pub response_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Directory for scratch files (system temp dir when unset)
    pub dir: Option<PathBuf>,

    /// Filename prefix for scratch files
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are torn down (seconds)
    pub idle_timeout_secs: u64,

    /// How often idle sessions are swept (seconds)
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            max_upload_bytes: 32 * 1024 * 1024,
            enable_cors: true,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            response_format: "text".to_string(),
        }
    }
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: "transcritor-".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600, // 1 hour
            sweep_interval_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from the first readable default location
    pub fn load() -> Result<Self> {
        let config_paths = ["transcritor.toml", "config/transcritor.toml"];

        for path in &config_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Override settings with environment variables
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(host) = std::env::var("TRANSCRITOR_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("TRANSCRITOR_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow!("Invalid TRANSCRITOR_PORT '{}': {}", port, e))?;
        }

        if let Ok(base_url) = std::env::var("TRANSCRITOR_API_BASE_URL") {
            self.transcription.api_base_url = base_url;
        }

        if let Ok(dir) = std::env::var("TRANSCRITOR_SCRATCH_DIR") {
            self.scratch.dir = Some(PathBuf::from(dir));
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than 0"));
        }

        if self.transcription.api_base_url.trim().is_empty() {
            return Err(anyhow!("api_base_url must not be empty"));
        }

        if self.transcription.model.trim().is_empty() {
            return Err(anyhow!("model must not be empty"));
        }

        if self.session.idle_timeout_secs == 0 {
            return Err(anyhow!("idle_timeout_secs must be greater than 0"));
        }

        if let Some(dir) = &self.scratch.dir {
            if !dir.is_dir() {
                return Err(anyhow!("Scratch directory does not exist: {}", dir.display()));
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Address to bind the HTTP server to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Transcritor Configuration:\n\
            - Listen: {}\n\
            - Transcription API: {}\n\
            - Model: {}\n\
            - Scratch Directory: {}\n\
            - Session Idle Timeout: {}s",
            self.bind_address(),
            self.transcription.api_base_url,
            self.transcription.model,
            self.scratch
                .dir
                .as_deref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "<system temp>".to_string()),
            self.session.idle_timeout_secs
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.server.max_upload_bytes = bytes;
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.transcription.api_base_url = url.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.config.scratch.dir = Some(dir);
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.config.session.idle_timeout_secs = secs;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.transcription.model, "whisper-1");
        assert_eq!(config.transcription.response_format, "text");
        assert!(config.scratch.dir.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_host("0.0.0.0")
            .with_port(9000)
            .with_api_base_url("http://localhost:1234/v1")
            .build();

        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.transcription.api_base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let config = ConfigBuilder::new().with_max_upload_bytes(0).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_api_base_url("  ").build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_idle_timeout(0).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_scratch_dir(PathBuf::from("/definitely/not/here"))
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcritor.toml");
        std::fs::write(&path, "[server]\nport = 9100\n\n[session]\nidle_timeout_secs = 120\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.session.idle_timeout_secs, 120);
        assert_eq!(config.session.sweep_interval_secs, 60);
        assert_eq!(config.transcription.model, "whisper-1");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
