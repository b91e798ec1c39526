use crate::model::quote::Quote;
use crate::model::signal::Signal;

/// Buys a pullback inside an established uptrend.
///
/// Fires when the last price is still well above the long average (trend
/// filter) but has dropped below the previous session close (dip filter).
/// Using the previous close rather than today's open catches overnight gaps.
#[derive(Debug, Clone)]
pub struct BuyDipRule {
    trend_multiplier: f64,
    dip_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuyThresholds {
    /// Price must be at or above this.
    pub trend_floor: f64,
    /// Price must be at or below this.
    pub dip_ceiling: f64,
}

impl BuyDipRule {
    pub fn new(trend_multiplier: f64, dip_multiplier: f64) -> Self {
        Self {
            trend_multiplier,
            dip_multiplier,
        }
    }

    pub fn thresholds(&self, sma: f64, reference: f64) -> BuyThresholds {
        BuyThresholds {
            trend_floor: sma * self.trend_multiplier,
            dip_ceiling: reference * self.dip_multiplier,
        }
    }

    pub fn evaluate(&self, quote: &Quote, sma: f64) -> Signal {
        let t = self.thresholds(sma, quote.prev_close);
        let price = quote.last;
        if price >= t.trend_floor && price <= t.dip_ceiling {
            Signal::Buy { price }
        } else {
            Signal::Hold
        }
    }
}
