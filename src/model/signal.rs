use std::fmt;

use serde::Serialize;

/// Which rule a run evaluates. Chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    Buy,
    Sell,
}

impl Mode {
    pub fn signal_kind(self) -> SignalKind {
        match self {
            Self::Buy => SignalKind::Buy,
            Self::Sell => SignalKind::Sell,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating a rule against one quote.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Buy { price: f64 },
    Sell { price: f64 },
    Hold,
}

/// JSON body posted to the automation webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalPayload {
    pub ticker: String,
    pub signal: SignalKind,
    pub price: f64,
    pub sma200: f64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_price: Option<f64>,
}
