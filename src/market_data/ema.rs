/// Adjusted exponentially weighted mean over a span.
///
/// Every observation so far contributes with weight `(1 - alpha)^age`, and the
/// result is normalized by the sum of weights, so early values are not biased
/// toward zero the way a plain recursive EMA seeded at `0` would be.
#[derive(Clone, Debug)]
pub struct Ema {
    decay: f64,
    weighted_sum: f64,
    weight_total: f64,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        let alpha = 2.0 / (span as f64 + 1.0);
        Ema {
            decay: 1.0 - alpha,
            weighted_sum: 0.0,
            weight_total: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        self.weighted_sum = value + self.decay * self.weighted_sum;
        self.weight_total = 1.0 + self.decay * self.weight_total;
        self.weighted_sum / self.weight_total
    }
}

/// EMA of every prefix of `values`.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut ema = Ema::new(span);
    values.iter().map(|v| ema.update(*v)).collect()
}
