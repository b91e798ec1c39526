/// Simple moving average of the last `period` closes.
///
/// Returns `None` when the series is shorter than `period` or `period` is zero.
pub fn trailing_mean(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}
