use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;

use crate::error::{compact_error_body, AppError};
use crate::model::quote::{DailyBar, Quote};

pub struct TradierClient {
    http: reqwest::Client,
    base_url: String,
}

impl TradierClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("TRADIER_TOKEN contains characters not allowed in a header")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build Tradier HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)], op: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("tradier {} HTTP failed", op))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::TradierApi {
                status,
                body: compact_error_body(&body),
            })
            .with_context(|| format!("tradier {} returned error status", op));
        }

        response
            .json::<Value>()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("tradier {} JSON parse failed", op))
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let root = self
            .get_json("/markets/quotes", &[("symbols", symbol)], "quote")
            .await?;
        parse_quote(&root, symbol)
    }

    /// Daily bars from `start` through the latest session, ascending by date.
    pub async fn get_daily_history(&self, symbol: &str, start: NaiveDate) -> Result<Vec<DailyBar>> {
        let start_s = start.format("%Y-%m-%d").to_string();
        let root = self
            .get_json(
                "/markets/history",
                &[
                    ("symbol", symbol),
                    ("interval", "daily"),
                    ("start", start_s.as_str()),
                ],
                "history",
            )
            .await?;
        let bars = parse_history(&root)?;
        tracing::debug!(symbol, start = %start_s, count = bars.len(), "Fetched daily history");
        Ok(bars)
    }
}

/// Tradier collapses single-element lists into a bare object.
fn one_or_many(v: &Value) -> Vec<&Value> {
    match v {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn positive_f64(v: Option<&Value>) -> Option<f64> {
    v.and_then(Value::as_f64).filter(|x| x.is_finite() && *x > 0.0)
}

pub fn parse_quote(root: &Value, symbol: &str) -> Result<Quote> {
    let quote_value = root
        .get("quotes")
        .and_then(|q| q.get("quote"))
        .ok_or(AppError::MissingField("quotes.quote"))
        .with_context(|| format!("no quote returned for {}", symbol))?;

    let candidates = one_or_many(quote_value);
    let quote = candidates
        .iter()
        .find(|q| {
            q.get("symbol")
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
        })
        .or_else(|| candidates.first())
        .copied()
        .ok_or(AppError::MissingField("quotes.quote"))
        .with_context(|| format!("empty quote list for {}", symbol))?;

    let last = positive_f64(quote.get("last")).ok_or(AppError::MissingField("quote.last"))?;
    let prev_close =
        positive_f64(quote.get("prevclose")).ok_or(AppError::MissingField("quote.prevclose"))?;
    let open = positive_f64(quote.get("open"));
    let symbol = quote
        .get("symbol")
        .and_then(Value::as_str)
        .unwrap_or(symbol)
        .to_ascii_uppercase();

    Ok(Quote {
        symbol,
        last,
        open,
        prev_close,
    })
}

pub fn parse_history(root: &Value) -> Result<Vec<DailyBar>> {
    let history = root
        .get("history")
        .ok_or(AppError::MissingField("history"))?;
    let days = match history.get("day") {
        Some(d) => one_or_many(d),
        None if history.is_null() => Vec::new(),
        None => bail!(AppError::MissingField("history.day")),
    };

    let mut bars = Vec::with_capacity(days.len());
    for day in days {
        let date_str = day
            .get("date")
            .and_then(Value::as_str)
            .ok_or(AppError::MissingField("history.day.date"))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .with_context(|| format!("invalid history date '{}'", date_str))?;
        let Some(close) = day.get("close").and_then(Value::as_f64) else {
            tracing::warn!(%date, "Skipping history day without close");
            continue;
        };
        bars.push(DailyBar { date, close });
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}
