use chrono::NaiveDate;

/// Real-time quote snapshot for the watched symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub last: f64,
    /// `None` before the opening print.
    pub open: Option<f64>,
    pub prev_close: f64,
}

/// One daily bar from the history endpoint. Only the close feeds the SMA.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices in ascending date order.
pub fn closes(bars: &[DailyBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
