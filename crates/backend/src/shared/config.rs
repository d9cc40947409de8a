use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub question_api: QuestionApiConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Внешнее API коллекций вопросов
#[derive(Debug, Deserialize, Clone)]
pub struct QuestionApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer-токен сервисного аккаунта (выдается внешним провайдером)
    #[serde(default)]
    pub api_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Префикс автоматически генерируемых ключей ("soru" -> soru1, soru2, ...)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ImportConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_key_prefix() -> String {
    "soru".to_string()
}

fn default_max_upload_mb() -> usize {
    10
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[question_api]
base_url = "http://127.0.0.1:8080/api"
timeout_secs = 30

[import]
key_prefix = "soru"
max_upload_mb = 10
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.import.key_prefix, "soru");
        assert_eq!(config.import.max_upload_bytes(), 10 * 1024 * 1024);
        assert!(config.question_api.api_token.is_none());
    }

    #[test]
    fn test_import_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
[server]
host = "127.0.0.1"
port = 8081

[question_api]
base_url = "https://api.example.test"
"#,
        )
        .unwrap();
        assert_eq!(config.import.key_prefix, "soru");
        assert_eq!(config.question_api.timeout_secs, 30);
    }
}
