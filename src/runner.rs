use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use std::time::Duration;
use url::Url;

use crate::config::{Config, TradierConfig};
use crate::error::AppError;
use crate::indicator::sma::trailing_mean;
use crate::market_hours::{MarketStatus, TradingWindow};
use crate::model::quote::{closes, Quote};
use crate::model::signal::{Mode, Signal, SignalKind, SignalPayload};
use crate::strategy::Rule;
use crate::tradier::rest::TradierClient;
use crate::webhook::WebhookNotifier;

/// What a single invocation ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    MarketClosed(MarketStatus),
    FetchFailed,
    NoSignal,
    DryRun(SignalPayload),
    Notified { status: u16, payload: SignalPayload },
    NotifyFailed(SignalPayload),
}

/// Inputs to the rule for one run.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub quote: Quote,
    pub sma: f64,
}

pub struct SignalRunner {
    mode: Mode,
    symbol: String,
    sma_period: usize,
    rule: Rule,
    window: TradingWindow,
    tradier_cfg: TradierConfig,
    tradier: TradierClient,
    notifier: WebhookNotifier,
    webhook: Url,
    dry_run: bool,
}

impl SignalRunner {
    pub fn from_config(config: &Config, mode: Mode, dry_run: bool) -> Result<Self> {
        config.validate()?;
        let timeout = Duration::from_secs(config.tradier.request_timeout_secs.max(1));
        let webhook = config.webhook_for(mode)?.clone();
        let window = TradingWindow::from_config(&config.market_hours)
            .context("market_hours section is invalid")?;
        let tradier = TradierClient::new(&config.tradier.base_url, &config.tradier.token, timeout)?;
        let notifier = WebhookNotifier::new(timeout)?;

        Ok(Self {
            mode,
            symbol: config.symbol(),
            sma_period: config.strategy.sma_period,
            rule: Rule::for_mode(mode, &config.strategy),
            window,
            tradier_cfg: config.tradier.clone(),
            tradier,
            notifier,
            webhook,
            dry_run,
        })
    }

    /// Run once against the current wall clock.
    pub async fn run(&self) -> RunOutcome {
        let now = self.window.now();
        self.run_at(now).await
    }

    /// Run once as if the time were `now`. Never returns an error: failures are
    /// logged and reported through the outcome.
    pub async fn run_at(&self, now: DateTime<Tz>) -> RunOutcome {
        let status = self.window.status_at(&now);
        if !status.is_open() {
            tracing::info!(
                reason = status.reason(),
                at = %now.to_rfc3339(),
                "Market closed, skipping run"
            );
            return RunOutcome::MarketClosed(status);
        }

        tracing::info!(mode = %self.mode, symbol = %self.symbol, "Running signal check");

        let snapshot = match self.fetch_snapshot(now).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "Error fetching market data");
                return RunOutcome::FetchFailed;
            }
        };

        let quote = &snapshot.quote;
        tracing::info!(
            price = quote.last,
            open = ?quote.open,
            prev_close = quote.prev_close,
            sma = snapshot.sma,
            period = self.sma_period,
            "Market snapshot"
        );
        tracing::info!(
            criteria = %self.rule.describe(quote, snapshot.sma),
            "{} criteria",
            self.mode.signal_kind()
        );

        let (kind, price) = match self.rule.evaluate(quote, snapshot.sma) {
            Signal::Buy { price } => (SignalKind::Buy, price),
            Signal::Sell { price } => (SignalKind::Sell, price),
            Signal::Hold => {
                tracing::info!(mode = %self.mode, "No signal");
                return RunOutcome::NoSignal;
            }
        };
        tracing::info!(signal = %kind, price, "Signal triggered");

        let payload = build_payload(&self.symbol, kind, price, &snapshot, now);
        if self.dry_run {
            tracing::info!(
                payload = %serde_json::to_string(&payload).unwrap_or_default(),
                "Dry run, webhook not called"
            );
            return RunOutcome::DryRun(payload);
        }

        match self.notifier.send(&self.webhook, &payload).await {
            Ok(status) => {
                tracing::info!(signal = %kind, status, "Webhook sent");
                RunOutcome::Notified { status, payload }
            }
            Err(e) => {
                tracing::error!(
                    signal = %kind,
                    error = %format!("{:#}", e),
                    "Failed to send webhook"
                );
                RunOutcome::NotifyFailed(payload)
            }
        }
    }

    async fn fetch_snapshot(&self, now: DateTime<Tz>) -> Result<MarketSnapshot> {
        let quote = self.tradier.get_quote(&self.symbol).await?;
        let start = self.tradier_cfg.history_start_for(now.date_naive());
        let bars = self.tradier.get_daily_history(&self.symbol, start).await?;
        let series = closes(&bars);
        let sma = trailing_mean(&series, self.sma_period).ok_or(AppError::InsufficientHistory {
            needed: self.sma_period,
            available: series.len(),
        })?;
        Ok(MarketSnapshot { quote, sma })
    }
}

/// Build the webhook body. Only BUY carries the session open, and only when known.
pub fn build_payload(
    ticker: &str,
    kind: SignalKind,
    price: f64,
    snapshot: &MarketSnapshot,
    now: DateTime<Tz>,
) -> SignalPayload {
    let open_price = match kind {
        SignalKind::Buy => snapshot.quote.open,
        SignalKind::Sell => None,
    };
    SignalPayload {
        ticker: ticker.to_string(),
        signal: kind,
        price,
        sma200: snapshot.sma,
        timestamp: now.to_rfc3339(),
        open_price,
    }
}
