use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { token: String::new(), api_base: default_telegram_api(), poll_timeout_secs: default_poll_timeout() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base(),
            model: default_chat_model(),
            transcription_model: default_transcription_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_geocoding_base")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self { api_key: String::new(), base_url: default_geocoding_base(), request_timeout_secs: default_request_timeout() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
    /// Chat that receives contact messages and service suggestions.
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_search_results: default_max_search_results(),
            admin_chat_id: None,
            metrics_addr: default_metrics_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// When set, `/admin/*` requires a matching `X-API-Key` header.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_telegram_api() -> String { "https://api.telegram.org".into() }
fn default_poll_timeout() -> u64 { 30 }
fn default_openai_base() -> String { "https://api.openai.com/v1".into() }
fn default_chat_model() -> String { "gpt-4o".into() }
fn default_transcription_model() -> String { "whisper-1".into() }
fn default_request_timeout() -> u64 { 60 }
fn default_geocoding_base() -> String { "https://maps.googleapis.com/maps/api/geocode/json".into() }
fn default_page_size() -> u32 { 5 }
fn default_max_search_results() -> usize { 10 }
fn default_metrics_addr() -> String { "127.0.0.1:9188".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn env_if_empty(slot: &mut String, key: &str) {
    if slot.trim().is_empty() {
        if let Ok(v) = std::env::var(key) {
            *slot = v;
        }
    }
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); a missing file falls back to
    /// defaults so that a pure environment-variable setup keeps working.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize_from_env();
        self.server.normalize()?;
        // 归一化 database（支持从环境变量填充 URL）
        self.database.normalize_from_env();
        self.database.validate()?;
        env_if_empty(&mut self.telegram.token, "BOT_TOKEN");
        env_if_empty(&mut self.openai.api_key, "OPENAI_API_KEY");
        env_if_empty(&mut self.geocoding.api_key, "GOOGLE_MAPS_API_KEY");
        self.bot.normalize_from_env();
        self.bot.validate()?;
        if self.admin.api_key.is_none() {
            self.admin.api_key = std::env::var("ADMIN_API_KEY").ok().filter(|k| !k.trim().is_empty());
        }
        Ok(())
    }

    /// The bot binary cannot start without a token.
    pub fn require_bot_token(&self) -> Result<&str> {
        if self.telegram.token.trim().is_empty() {
            return Err(anyhow!("telegram.token 为空；请在 config.toml 或环境变量 BOT_TOKEN 中提供"));
        }
        Ok(&self.telegram.token)
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            if !host.trim().is_empty() { self.host = host; }
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        env_if_empty(&mut self.url, "DATABASE_URL");
        if self.max_connections == 0 { self.max_connections = default_max_connections(); }
        if self.min_connections == 0 { self.min_connections = default_min_connections(); }
        if self.connect_timeout_secs == 0 { self.connect_timeout_secs = default_connect_timeout(); }
        if self.acquire_timeout_secs == 0 { self.acquire_timeout_secs = default_acquire_timeout(); }
        if self.idle_timeout_secs == 0 { self.idle_timeout_secs = default_idle_timeout(); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url 为空；请在 config.toml 或环境变量 DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url 必须以 postgres://、postgresql:// 或 sqlite: 开头"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        Ok(())
    }
}

impl BotConfig {
    fn normalize_from_env(&mut self) {
        if self.admin_chat_id.is_none() {
            self.admin_chat_id = std::env::var("ADMIN_CHAT_ID").ok().and_then(|v| v.trim().parse().ok());
        }
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(anyhow!("bot.page_size 必须 >= 1"));
        }
        if self.max_search_results == 0 {
            return Err(anyhow!("bot.max_search_results 必须 >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let cfg = parse(r#"
            [database]
            url = "postgres://localhost/guide"
        "#).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.bot.page_size, 5);
        assert_eq!(cfg.openai.model, "gpt-4o");
        assert_eq!(cfg.database.max_connections, 10);
    }

    #[test]
    fn sqlite_url_is_accepted() {
        let mut db = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
        db.normalize_from_env();
        assert!(db.validate().is_ok());
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let mut db = DatabaseConfig { url: "mysql://localhost/guide".into(), ..Default::default() };
        db.normalize_from_env();
        assert!(db.validate().is_err());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let cfg = parse(r#"
            [bot]
            page_size = 0
        "#).unwrap();
        assert!(cfg.bot.validate().is_err());
    }

    #[test]
    fn missing_token_is_reported() {
        let cfg = AppConfig::default();
        assert!(cfg.require_bot_token().is_err());
    }
}
