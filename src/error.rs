use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("tradier API error (HTTP {status}): {body}")]
    TradierApi { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response missing field: {0}")]
    MissingField(&'static str),

    #[error("insufficient history: need {needed} closes, got {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("webhook rejected payload (HTTP {status}): {body}")]
    Webhook { status: u16, body: String },
}

/// Collapse whitespace and cap length so provider error bodies fit on one log line.
pub fn compact_error_body(body: &str) -> String {
    let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > 180 {
        let head: String = normalized.chars().take(180).collect();
        format!("{}...", head)
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_body_joins_lines() {
        assert_eq!(
            compact_error_body("  Invalid\n  access   token \n"),
            "Invalid access token"
        );
    }

    #[test]
    fn compact_body_truncates_long_bodies() {
        let body = "x".repeat(500);
        let out = compact_error_body(&body);
        assert_eq!(out.len(), 183);
        assert!(out.ends_with("..."));
    }
}
