use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::error::AppError;
use crate::model::signal::Mode;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tradier: TradierConfig,
    pub strategy: StrategyConfig,
    pub market_hours: MarketHoursConfig,
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub webhooks: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradierConfig {
    pub base_url: String,
    pub symbol: String,
    pub history_lookback_days: u32,
    /// Pins the history start date; overrides `history_lookback_days`.
    pub history_start: Option<NaiveDate>,
    pub request_timeout_secs: u64,
    #[serde(skip)]
    pub token: String,
}

impl Default for TradierConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tradier.com/v1".to_string(),
            symbol: "QQQ".to_string(),
            history_lookback_days: 420,
            history_start: None,
            request_timeout_secs: 15,
            token: String::new(),
        }
    }
}

impl TradierConfig {
    /// First date requested from the history endpoint for a run on `today`.
    pub fn history_start_for(&self, today: NaiveDate) -> NaiveDate {
        self.history_start.unwrap_or_else(|| {
            today - chrono::Duration::days(i64::from(self.history_lookback_days))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub sma_period: usize,
    /// Buy requires `price >= sma * buy_trend_multiplier`.
    pub buy_trend_multiplier: f64,
    /// Buy requires `price <= prev_close * buy_dip_multiplier`.
    pub buy_dip_multiplier: f64,
    /// Sell requires `price < sma * sell_stop_multiplier`.
    pub sell_stop_multiplier: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            sma_period: 200,
            buy_trend_multiplier: 1.04,
            buy_dip_multiplier: 0.99,
            sell_stop_multiplier: 0.97,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketHoursConfig {
    pub timezone: String,
    pub open: String,
    pub close: String,
    pub holidays: Vec<NaiveDate>,
}

impl Default for MarketHoursConfig {
    fn default() -> Self {
        Self {
            timezone: "America/New_York".to_string(),
            open: "09:30".to_string(),
            close: "16:00".to_string(),
            holidays: Vec::new(),
        }
    }
}

impl MarketHoursConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone '{}': {}", self.timezone, e))
    }

    pub fn open_time(&self) -> Result<NaiveTime> {
        parse_clock_time(&self.open)
    }

    pub fn close_time(&self) -> Result<NaiveTime> {
        parse_clock_time(&self.close)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Webhook endpoints, read from the environment only.
#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    pub buy_url: Option<Url>,
    pub sell_url: Option<Url>,
}

/// Parse an exchange clock time such as "09:30" or "16:00:00".
pub fn parse_clock_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .with_context(|| format!("invalid clock time '{}': expected HH:MM", s))
}

fn parse_webhook_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("{} is not a valid URL", name))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{} must be an http(s) URL, got scheme '{}'", name, url.scheme());
    }
    Ok(url)
}

impl Config {
    /// Load from `path` (built-in defaults if the file is absent), then pull
    /// secrets from `.env` / the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::from_toml_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Fill the token and webhook URLs from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.tradier.token = non_empty("TRADIER_TOKEN")
            .context("TRADIER_TOKEN not set in .env or environment")?;
        self.webhooks.buy_url = non_empty("OA_WEBHOOK_BUY")
            .map(|v| parse_webhook_url("OA_WEBHOOK_BUY", &v))
            .transpose()?;
        self.webhooks.sell_url = non_empty("OA_WEBHOOK_SELL")
            .map(|v| parse_webhook_url("OA_WEBHOOK_SELL", &v))
            .transpose()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tradier.symbol.trim().is_empty() {
            bail!(AppError::Config("tradier.symbol must not be empty".to_string()));
        }
        if self.strategy.sma_period == 0 {
            bail!(AppError::Config("strategy.sma_period must be > 0".to_string()));
        }
        for (name, m) in [
            ("buy_trend_multiplier", self.strategy.buy_trend_multiplier),
            ("buy_dip_multiplier", self.strategy.buy_dip_multiplier),
            ("sell_stop_multiplier", self.strategy.sell_stop_multiplier),
        ] {
            if !m.is_finite() || m <= 0.0 {
                bail!(AppError::Config(format!(
                    "strategy.{} must be a positive number, got {}",
                    name, m
                )));
            }
        }
        self.market_hours
            .tz()
            .context("market_hours.timezone is invalid")?;
        let open = self
            .market_hours
            .open_time()
            .context("market_hours.open is invalid")?;
        let close = self
            .market_hours
            .close_time()
            .context("market_hours.close is invalid")?;
        if open >= close {
            bail!(AppError::Config(format!(
                "market_hours.open ({}) must be before close ({})",
                open, close
            )));
        }
        Ok(())
    }

    /// Webhook for the given mode; an error if its env var was not set.
    pub fn webhook_for(&self, mode: Mode) -> Result<&Url> {
        match mode {
            Mode::Buy => self
                .webhooks
                .buy_url
                .as_ref()
                .context("OA_WEBHOOK_BUY not set in .env or environment"),
            Mode::Sell => self
                .webhooks
                .sell_url
                .as_ref()
                .context("OA_WEBHOOK_SELL not set in .env or environment"),
        }
    }

    pub fn symbol(&self) -> String {
        self.tradier.symbol.trim().to_ascii_uppercase()
    }
}
