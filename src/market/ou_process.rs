//! Ornstein-Uhlenbeck Process
//!
//! Exact discretisation of the OU process used at both price scales:
//!
//! ```text
//! decay  = exp(-k * dt),   k = ln(2) / half_life
//! x(t+1) = x(t) * decay + mu * (1 - decay) + sigma * sqrt(1 - decay^2) * Z
//! ```
//!
//! `sigma` is the stationary standard deviation, so a walk started at `mu`
//! spreads to roughly `sigma` after a few half-lives regardless of step size.
//!
//! Also carries a lag-1 autocorrelation estimator for the half-life of a
//! realised series, used to sanity check generated output.

use serde::{Deserialize, Serialize};

/// Minimum variance for valid estimation
const MIN_VARIANCE: f64 = 1e-12;
/// Minimum rho (autocorrelation) - must be mean-reverting
const MIN_RHO: f64 = 1e-6;
/// Maximum rho - must not be unit root
const MAX_RHO: f64 = 1.0 - 1e-9;

/// OU parameters for one price scale. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OuParams {
    /// Long-run mean the walk reverts to
    pub mu: f64,
    /// Stationary volatility scale
    pub sigma: f64,
    /// Time for a deviation to halve, in seconds
    pub half_life_secs: f64,
}

impl OuParams {
    pub fn new(mu: f64, sigma: f64, half_life_secs: f64) -> Self {
        Self {
            mu,
            sigma,
            half_life_secs,
        }
    }

    /// Mean reversion speed k = ln(2) / h
    pub fn theta(&self) -> f64 {
        std::f64::consts::LN_2 / self.half_life_secs
    }

    /// Fraction of the current deviation surviving one step of `dt_secs`
    pub fn decay(&self, dt_secs: f64) -> f64 {
        (-self.theta() * dt_secs).exp()
    }
}

/// Precomputed single-step transition for a fixed step size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuStep {
    mu: f64,
    decay: f64,
    noise_scale: f64,
}

impl OuStep {
    pub fn new(params: OuParams, dt_secs: f64) -> Self {
        let decay = params.decay(dt_secs);
        Self {
            mu: params.mu,
            decay,
            noise_scale: params.sigma * (1.0 - decay * decay).sqrt(),
        }
    }

    /// Re-centre on a new mean without recomputing the decay
    pub fn anchored_at(self, mu: f64) -> Self {
        Self { mu, ..self }
    }

    /// Advance `x` by one step given a standard normal draw `z`
    pub fn advance(&self, x: f64, z: f64) -> f64 {
        x * self.decay + self.mu * (1.0 - self.decay) + self.noise_scale * z
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}

/// Estimate the half-life (in seconds) of a series sampled every `dt_secs`
///
/// Fits the AR(1) form of the OU process, x(t+1) = a + rho * x(t), by
/// least squares on lag-1 pairs: rho = exp(-k * dt), so
/// h = dt * ln(2) / -ln(rho). Returns `None` when there are fewer than two
/// pairs, the series is flat, or rho is not in (0, 1).
pub fn estimate_half_life(series: &[f64], dt_secs: f64) -> Option<f64> {
    estimate_pooled_half_life(std::iter::once(series), dt_secs)
}

/// Half-life from several independent segments sharing one process
///
/// Lag-1 pairs are taken within each segment only and pooled into one
/// regression, so no pair spans the gap between two segments.
pub fn estimate_pooled_half_life<'a, I>(segments: I, dt_secs: f64) -> Option<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    if dt_secs <= 0.0 {
        return None;
    }

    let pairs: Vec<(f64, f64)> = segments
        .into_iter()
        .flat_map(|segment| segment.windows(2).map(|w| (w[0], w[1])))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let mut cov_sum = 0.0;
    let mut var_sum_x = 0.0;
    let mut var_sum_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov_sum += dx * dy;
        var_sum_x += dx * dx;
        var_sum_y += dy * dy;
    }

    if var_sum_x < MIN_VARIANCE || var_sum_y < MIN_VARIANCE {
        return None;
    }

    let rho = cov_sum / var_sum_x;
    if !(MIN_RHO..=MAX_RHO).contains(&rho) {
        return None;
    }

    Some(dt_secs * std::f64::consts::LN_2 / -rho.ln())
}
