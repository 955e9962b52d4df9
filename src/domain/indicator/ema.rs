//! Exponential moving average over raw values, the building block of MACD.
//!
//! k = 2/(n+1), seeded with the first value, then EMA[i] = X[i]*k + EMA[i-1]*(1-k).

/// Running exponential average of `input`, seeded with its first element.
pub(crate) fn ema_of(input: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(input.len());
    let mut prev: Option<f64> = None;

    for &x in input {
        let ema = match prev {
            None => x,
            Some(p) => x * k + p * (1.0 - k),
        };
        out.push(ema);
        prev = Some(ema);
    }

    out
}
