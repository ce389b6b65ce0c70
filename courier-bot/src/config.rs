//! Bot 配置：连接、日志、游标存储与分发器设置，从环境变量加载。

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use courier_core::{HttpTransportConfig, DEFAULT_API_URL};
use courier_telegram::{DispatcherConfig, MAX_LIMIT};

/// Which [`cursor_store::CursorStore`] implementation backs the polling cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => anyhow::bail!(
                "CURSOR_STORE must be one of memory, file, sqlite; got: {}",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL
    pub telegram_api_url: String,
    /// 日志文件路径
    pub log_file: String,
    /// CURSOR_STORE：`memory` | `file` | `sqlite`
    pub cursor_store: String,
    /// 游标存储的文件或 SQLite 路径
    pub cursor_store_path: String,
    pub poll_limit: u32,
    pub poll_timeout_secs: u32,
    pub poll_interval_secs: u64,
    pub throw_on_missed_handler: bool,
    /// `serve` 子命令的监听地址
    pub webhook_addr: String,
    pub http_timeout_secs: u64,
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl BotConfig {
    /// 从环境变量加载配置。
    /// 如果传入 token，则覆盖环境变量 BOT_TOKEN。
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token.or_else(|| env::var("BOT_TOKEN").ok()) {
            Some(t) if !t.trim().is_empty() => t,
            _ => anyhow::bail!("BOT_TOKEN not set (pass --token or set the env variable)"),
        };
        let telegram_api_url =
            env::var("TELEGRAM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/courier-bot.log".to_string());
        let cursor_store = env::var("CURSOR_STORE").unwrap_or_else(|_| "file".to_string());
        let cursor_store_path =
            env::var("CURSOR_STORE_PATH").unwrap_or_else(|_| "./data/cursor.json".to_string());
        let webhook_addr =
            env::var("WEBHOOK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            cursor_store,
            cursor_store_path,
            poll_limit: parsed_or("POLL_LIMIT", 100),
            poll_timeout_secs: parsed_or("POLL_TIMEOUT_SECS", 0),
            poll_interval_secs: parsed_or("POLL_INTERVAL_SECS", 1),
            throw_on_missed_handler: parsed_or("THROW_ON_MISSED_HANDLER", false),
            webhook_addr,
            http_timeout_secs: parsed_or("HTTP_TIMEOUT_SECS", 30),
        })
    }

    /// 校验配置：API URL 必须合法，POLL_LIMIT 在 1..=100 之间，存储类型必须已知。
    pub fn validate(&self) -> Result<()> {
        if reqwest::Url::parse(&self.telegram_api_url).is_err() {
            anyhow::bail!(
                "TELEGRAM_API_URL is set but not a valid URL: {}",
                self.telegram_api_url
            );
        }
        if self.poll_limit == 0 || self.poll_limit > MAX_LIMIT {
            anyhow::bail!(
                "POLL_LIMIT must be between 1 and {}; got: {}",
                MAX_LIMIT,
                self.poll_limit
            );
        }
        self.store_kind()?;
        Ok(())
    }

    pub fn store_kind(&self) -> Result<StoreKind> {
        self.cursor_store.parse()
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            api_url: self.telegram_api_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            throw_on_missed_handler: self.throw_on_missed_handler,
            polling_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "BOT_TOKEN",
        "TELEGRAM_API_URL",
        "LOG_FILE",
        "CURSOR_STORE",
        "CURSOR_STORE_PATH",
        "POLL_LIMIT",
        "POLL_TIMEOUT_SECS",
        "POLL_INTERVAL_SECS",
        "THROW_ON_MISSED_HANDLER",
        "WEBHOOK_ADDR",
        "HTTP_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", "test_token");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.telegram_api_url, "https://api.telegram.org");
        assert_eq!(config.log_file, "logs/courier-bot.log");
        assert_eq!(config.store_kind().unwrap(), StoreKind::File);
        assert_eq!(config.cursor_store_path, "./data/cursor.json");
        assert_eq!(config.poll_limit, 100);
        assert_eq!(config.poll_timeout_secs, 0);
        assert_eq!(config.poll_interval_secs, 1);
        assert!(!config.throw_on_missed_handler);
        assert_eq!(config.webhook_addr, "0.0.0.0:8080");
        assert_eq!(config.http_timeout_secs, 30);
        config.validate().unwrap();
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        clear_env();
        env::set_var("BOT_TOKEN", "custom_token");
        env::set_var("TELEGRAM_API_URL", "http://127.0.0.1:9000/");
        env::set_var("CURSOR_STORE", "SQLite");
        env::set_var("CURSOR_STORE_PATH", "/tmp/cursor.db");
        env::set_var("POLL_LIMIT", "25");
        env::set_var("POLL_TIMEOUT_SECS", "50");
        env::set_var("POLL_INTERVAL_SECS", "0");
        env::set_var("THROW_ON_MISSED_HANDLER", "true");

        let config = BotConfig::load(None).unwrap();
        config.validate().unwrap();

        assert_eq!(config.store_kind().unwrap(), StoreKind::Sqlite);
        assert_eq!(config.poll_limit, 25);
        assert_eq!(config.poll_timeout_secs, 50);
        assert_eq!(config.transport_config().api_url, "http://127.0.0.1:9000");
        let dispatcher = config.dispatcher_config();
        assert!(dispatcher.throw_on_missed_handler);
        assert!(dispatcher.polling_interval.is_zero());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_token_argument_overrides_env() {
        clear_env();
        env::set_var("BOT_TOKEN", "from_env");

        let config = BotConfig::load(Some("from_cli".to_string())).unwrap();
        assert_eq!(config.bot_token, "from_cli");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_token_is_an_error() {
        clear_env();
        assert!(BotConfig::load(None).is_err());
    }

    #[test]
    #[serial]
    fn test_validate_rejects_bad_values() {
        clear_env();
        env::set_var("BOT_TOKEN", "t");

        env::set_var("TELEGRAM_API_URL", "not a url");
        assert!(BotConfig::load(None).unwrap().validate().is_err());
        env::remove_var("TELEGRAM_API_URL");

        env::set_var("POLL_LIMIT", "0");
        assert!(BotConfig::load(None).unwrap().validate().is_err());
        env::set_var("POLL_LIMIT", "101");
        assert!(BotConfig::load(None).unwrap().validate().is_err());
        env::remove_var("POLL_LIMIT");

        env::set_var("CURSOR_STORE", "redis");
        assert!(BotConfig::load(None).unwrap().validate().is_err());
        clear_env();
    }
}
