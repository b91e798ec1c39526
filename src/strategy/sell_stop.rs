use crate::model::quote::Quote;
use crate::model::signal::Signal;

/// Exits once price breaks a fixed fraction below the long average.
#[derive(Debug, Clone)]
pub struct SellStopRule {
    stop_multiplier: f64,
}

impl SellStopRule {
    pub fn new(stop_multiplier: f64) -> Self {
        Self { stop_multiplier }
    }

    /// Price strictly below this triggers the exit.
    pub fn stop_line(&self, sma: f64) -> f64 {
        sma * self.stop_multiplier
    }

    pub fn evaluate(&self, quote: &Quote, sma: f64) -> Signal {
        if quote.last < self.stop_line(sma) {
            Signal::Sell { price: quote.last }
        } else {
            Signal::Hold
        }
    }
}
