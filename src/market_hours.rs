use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::MarketHoursConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Open,
    Weekend,
    Holiday,
    OutsideHours,
}

impl MarketStatus {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Weekend => "weekend",
            Self::Holiday => "holiday",
            Self::OutsideHours => "outside hours",
        }
    }
}

/// Weekday session window in the exchange's local time. Both ends are inclusive.
#[derive(Debug, Clone)]
pub struct TradingWindow {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
    holidays: Vec<NaiveDate>,
}

impl TradingWindow {
    pub fn new(tz: Tz, open: NaiveTime, close: NaiveTime, holidays: Vec<NaiveDate>) -> Self {
        Self {
            tz,
            open,
            close,
            holidays,
        }
    }

    pub fn from_config(cfg: &MarketHoursConfig) -> Result<Self> {
        Ok(Self::new(
            cfg.tz()?,
            cfg.open_time()?,
            cfg.close_time()?,
            cfg.holidays.clone(),
        ))
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Classify an instant. Any zone is accepted; it is converted to the exchange zone first.
    pub fn status_at<Z: chrono::TimeZone>(&self, at: &DateTime<Z>) -> MarketStatus {
        let local = at.with_timezone(&self.tz);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketStatus::Weekend;
        }
        if self.holidays.contains(&local.date_naive()) {
            return MarketStatus::Holiday;
        }
        let t = local.time();
        if t >= self.open && t <= self.close {
            MarketStatus::Open
        } else {
            MarketStatus::OutsideHours
        }
    }
}
