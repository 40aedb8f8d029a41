use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

use crate::models::AmbiguityPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub scraper: ScraperConfig,
    pub notifications: NotificationsConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub url: String,
    pub listing_name: String,
    pub default_price: String,
    pub error_threshold: u32,
    pub ambiguous_status: AmbiguityPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub render_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub user_agent: String,
    pub chrome_path: Option<String>,
    pub consent_labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
    pub username: String,
    pub avatar_url: Option<String>,
    pub footer_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub history_file: String,
    pub history_text_file: String,
    pub history_cap: usize,
}

impl StorageConfig {
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn history_text_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_text_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub to_file: bool,
    pub file_prefix: String,
}

/// Values supplied on the command line, applied after every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub listing_name: Option<String>,
    pub webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Path::new("config"), &ConfigOverrides::default())
    }

    pub fn load(config_dir: &Path, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("monitor.url", "")?
            .set_default("monitor.listing_name", "")?
            .set_default("monitor.default_price", "N/A")?
            .set_default("monitor.error_threshold", 3)?
            .set_default("monitor.ambiguous_status", "sold_out")?
            .set_default("scraper.render_timeout_secs", 30)?
            .set_default("scraper.settle_delay_ms", 3000)?
            .set_default(
                "scraper.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )?
            .set_default(
                "scraper.consent_labels",
                vec!["Use necessary cookies only", "Allow all cookies"],
            )?
            .set_default("notifications.discord.username", "Parking Monitor Bot")?
            .set_default("notifications.discord.footer_text", "Parking Permit Monitor")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.state_file", "last_state.json")?
            .set_default("storage.history_file", "check_history.json")?
            .set_default("storage.history_text_file", "check_history.txt")?
            .set_default("storage.history_cap", 1000)?
            .set_default("logging.level", "info")?
            .set_default("logging.to_file", true)?
            .set_default("logging.file_prefix", "permit-watcher.log")?
            // Checked-in defaults, then environment-specific, then local
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Environment variables like PERMIT_WATCHER__MONITOR__URL
            .add_source(Environment::with_prefix("PERMIT_WATCHER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Plain variables understood by earlier deployments
        if config.notifications.discord.webhook_url.is_none() {
            config.notifications.discord.webhook_url = env::var("DISCORD_WEBHOOK_URL").ok();
        }
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.url {
            self.monitor.url = url.clone();
        }
        if let Some(name) = &overrides.listing_name {
            self.monitor.listing_name = name.clone();
        }
        if let Some(webhook_url) = &overrides.webhook_url {
            self.notifications.discord.webhook_url = Some(webhook_url.clone());
        }
        // An empty variable means "not configured"
        if self
            .notifications
            .discord
            .webhook_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            self.notifications.discord.webhook_url = None;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.url.trim().is_empty() {
            return Err(ConfigError::Message("Monitor url is required".into()));
        }

        if !Self::is_http_url(&self.monitor.url) {
            return Err(ConfigError::Message("Invalid monitor URL format".into()));
        }

        if self.monitor.listing_name.trim().is_empty() {
            return Err(ConfigError::Message("Monitor listing_name is required".into()));
        }

        if self.monitor.error_threshold == 0 {
            return Err(ConfigError::Message("Monitor error_threshold must be greater than 0".into()));
        }

        if self.scraper.render_timeout_secs == 0 {
            return Err(ConfigError::Message("Scraper render_timeout_secs must be greater than 0".into()));
        }

        if let Some(webhook_url) = &self.notifications.discord.webhook_url {
            if !Self::is_http_url(webhook_url) {
                return Err(ConfigError::Message("Invalid Discord webhook URL format".into()));
            }
        }

        if self.storage.history_cap == 0 {
            return Err(ConfigError::Message("Storage history_cap must be greater than 0".into()));
        }

        Ok(())
    }

    fn is_http_url(raw: &str) -> bool {
        Url::parse(raw)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) fn test_config(data_dir: &Path) -> AppConfig {
    AppConfig {
        monitor: MonitorConfig {
            url: "https://parking.example.com/site/reserve/abc123".to_string(),
            listing_name: "Campus Fall Parking".to_string(),
            default_price: "$67.45".to_string(),
            error_threshold: 3,
            ambiguous_status: AmbiguityPolicy::SoldOut,
        },
        scraper: ScraperConfig {
            render_timeout_secs: 30,
            settle_delay_ms: 0,
            user_agent: "TestAgent/1.0".to_string(),
            chrome_path: None,
            consent_labels: vec!["Allow all cookies".to_string()],
        },
        notifications: NotificationsConfig {
            discord: DiscordConfig {
                webhook_url: None,
                username: "Parking Monitor Bot".to_string(),
                avatar_url: None,
                footer_text: "Parking Permit Monitor".to_string(),
            },
        },
        storage: StorageConfig {
            data_dir: data_dir.to_path_buf(),
            state_file: "last_state.json".to_string(),
            history_file: "check_history.json".to_string(),
            history_text_file: "check_history.txt".to_string(),
            history_cap: 1000,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            to_file: false,
            file_prefix: "permit-watcher.log".to_string(),
        },
    }
}
