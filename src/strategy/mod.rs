pub mod buy_dip;
pub mod sell_stop;

use crate::config::StrategyConfig;
use crate::model::quote::Quote;
use crate::model::signal::{Mode, Signal};

use self::buy_dip::BuyDipRule;
use self::sell_stop::SellStopRule;

/// The rule selected for this run.
#[derive(Debug, Clone)]
pub enum Rule {
    BuyDip(BuyDipRule),
    SellStop(SellStopRule),
}

impl Rule {
    pub fn for_mode(mode: Mode, cfg: &StrategyConfig) -> Self {
        match mode {
            Mode::Buy => Self::BuyDip(BuyDipRule::new(
                cfg.buy_trend_multiplier,
                cfg.buy_dip_multiplier,
            )),
            Mode::Sell => Self::SellStop(SellStopRule::new(cfg.sell_stop_multiplier)),
        }
    }

    pub fn evaluate(&self, quote: &Quote, sma: f64) -> Signal {
        match self {
            Self::BuyDip(r) => r.evaluate(quote, sma),
            Self::SellStop(r) => r.evaluate(quote, sma),
        }
    }

    /// One-line description of the thresholds in force, for the run log.
    pub fn describe(&self, quote: &Quote, sma: f64) -> String {
        match self {
            Self::BuyDip(r) => {
                let t = r.thresholds(sma, quote.prev_close);
                format!(
                    "price >= {:.2} (sma trend floor) and price <= {:.2} (prev close dip ceiling)",
                    t.trend_floor, t.dip_ceiling
                )
            }
            Self::SellStop(r) => format!("price < {:.2} (sma stop line)", r.stop_line(sma)),
        }
    }
}
