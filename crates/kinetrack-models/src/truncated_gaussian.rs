//! Normal distribution restricted to a closed interval.
//!
//! Sampling uses the inverse-CDF construction: a standard-normal draw `z` is
//! pushed through `Φ` to a uniform, rescaled onto the truncated CDF range
//! `[Φ(α), Φ(β)]`, and mapped back with `Φ⁻¹`:
//!
//! ```text
//! u = Φ(α) + (Φ(β) − Φ(α)) · Φ(z)
//! x = mean + σ · Φ⁻¹(u)
//! ```
//!
//! where `α = (lower − mean) / σ` and `β = (upper − mean) / σ`.
//!
//! # Example
//!
//! ```rust
//! use kinetrack_models::TruncatedGaussian;
//!
//! let tg = TruncatedGaussian::new(0.5, 0.2, 0.0, 1.0).unwrap();
//! let x = tg.map_standard_normal(10.0);
//! assert!(x <= 1.0);
//! ```

use kinetrack_types::{Result, TrackError};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// A Gaussian `N(mean, sigma²)` truncated to `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedGaussian {
    mean: f64,
    sigma: f64,
    lower: f64,
    upper: f64,
    cdf_lower: f64,
    cdf_upper: f64,
}

impl TruncatedGaussian {
    /// Create a truncated Gaussian.
    ///
    /// `sigma = 0` is allowed and yields a point mass at `mean` clipped to the
    /// bounds.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidParameter`] for non-finite parameters, a
    /// negative `sigma`, or `lower >= upper`.
    pub fn new(mean: f64, sigma: f64, lower: f64, upper: f64) -> Result<Self> {
        if !(mean.is_finite() && sigma.is_finite() && lower.is_finite() && upper.is_finite()) {
            return Err(TrackError::invalid_parameter(
                "truncated_gaussian",
                format!("non-finite parameter (mean={mean}, sigma={sigma}, bounds=[{lower}, {upper}])"),
            ));
        }
        if sigma < 0.0 {
            return Err(TrackError::invalid_parameter(
                "truncated_gaussian.sigma",
                format!("{sigma} is negative"),
            ));
        }
        if lower >= upper {
            return Err(TrackError::invalid_parameter(
                "truncated_gaussian.bounds",
                format!("lower bound {lower} is not below upper bound {upper}"),
            ));
        }

        let (cdf_lower, cdf_upper) = if sigma > 0.0 {
            let n = standard_normal();
            (n.cdf((lower - mean) / sigma), n.cdf((upper - mean) / sigma))
        } else {
            (0.0, 0.0)
        };

        Ok(Self {
            mean,
            sigma,
            lower,
            upper,
            cdf_lower,
            cdf_upper,
        })
    }

    /// Mean of the underlying (untruncated) normal.
    pub fn location(&self) -> f64 {
        self.mean
    }

    /// Standard deviation of the underlying (untruncated) normal.
    pub fn scale(&self) -> f64 {
        self.sigma
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Probability mass of the untruncated normal inside the bounds.
    pub fn mass(&self) -> f64 {
        self.cdf_upper - self.cdf_lower
    }

    fn is_degenerate(&self) -> bool {
        self.sigma == 0.0 || self.mass() <= f64::MIN_POSITIVE
    }

    fn clamped_mean(&self) -> f64 {
        self.mean.clamp(self.lower, self.upper)
    }

    /// Map a standard-normal sample into the truncated domain.
    ///
    /// The result always lies in `[lower, upper]`.
    pub fn map_standard_normal(&self, sample: f64) -> f64 {
        if self.is_degenerate() {
            return self.clamped_mean();
        }
        let n = standard_normal();
        let uniform = self.cdf_lower + self.mass() * n.cdf(sample);
        if uniform.is_nan() {
            return self.clamped_mean();
        }
        let uniform = uniform.clamp(self.cdf_lower, self.cdf_upper);
        let x = self.mean + self.sigma * n.inverse_cdf(uniform);
        if x.is_nan() {
            return self.clamped_mean();
        }
        x.clamp(self.lower, self.upper)
    }

    /// Mean of the truncated distribution.
    pub fn expected_value(&self) -> f64 {
        if self.is_degenerate() {
            return self.clamped_mean();
        }
        let n = standard_normal();
        let alpha = (self.lower - self.mean) / self.sigma;
        let beta = (self.upper - self.mean) / self.sigma;
        let shift = (n.pdf(alpha) - n.pdf(beta)) / self.mass();
        (self.mean + self.sigma * shift).clamp(self.lower, self.upper)
    }

    /// Variance of the truncated distribution.
    pub fn variance(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let n = standard_normal();
        let alpha = (self.lower - self.mean) / self.sigma;
        let beta = (self.upper - self.mean) / self.sigma;
        let z = self.mass();
        let shift = (n.pdf(alpha) - n.pdf(beta)) / z;
        let tilt = (alpha * n.pdf(alpha) - beta * n.pdf(beta)) / z;
        (self.sigma * self.sigma * (1.0 + tilt - shift * shift)).max(0.0)
    }
}

fn standard_normal() -> Normal {
    Normal::standard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, StandardNormal};

    #[test]
    fn median_sample_of_symmetric_truncation_is_mean() {
        let tg = TruncatedGaussian::new(0.5, 0.3, 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(tg.map_standard_normal(0.0), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(tg.expected_value(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn samples_stay_within_bounds() {
        let tg = TruncatedGaussian::new(0.9, 0.5, 0.0, 1.0).unwrap();
        for z in [-1e6, -8.0, -2.0, 0.0, 2.0, 8.0, 1e6, f64::INFINITY, f64::NEG_INFINITY] {
            let x = tg.map_standard_normal(z);
            assert!((0.0..=1.0).contains(&x), "z={z} mapped to {x}");
        }
    }

    #[test]
    fn mapping_is_monotone() {
        let tg = TruncatedGaussian::new(0.2, 0.4, 0.0, 1.0).unwrap();
        let mut prev = f64::NEG_INFINITY;
        for i in -30..=30 {
            let x = tg.map_standard_normal(i as f64 * 0.1);
            assert!(x >= prev);
            prev = x;
        }
    }

    #[test]
    fn zero_sigma_is_point_mass_clipped_to_bounds() {
        let tg = TruncatedGaussian::new(0.3, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(tg.map_standard_normal(-3.0), 0.3);
        assert_eq!(tg.map_standard_normal(3.0), 0.3);
        assert_eq!(tg.variance(), 0.0);

        let tg = TruncatedGaussian::new(1.7, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(tg.map_standard_normal(0.0), 1.0);
        assert_eq!(tg.expected_value(), 1.0);
    }

    #[test]
    fn wide_sigma_approaches_uniform_moments() {
        // As sigma grows the truncated normal on [0, 1] tends to U(0, 1).
        let tg = TruncatedGaussian::new(0.5, 100.0, 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(tg.expected_value(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(tg.variance(), 1.0 / 12.0, epsilon = 1e-4);
    }

    #[test]
    fn sample_mean_matches_expected_value() {
        let tg = TruncatedGaussian::new(0.1, 0.3, 0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let sum: f64 = (0..n)
            .map(|_| tg.map_standard_normal(StandardNormal.sample(&mut rng)))
            .sum();
        assert_abs_diff_eq!(sum / n as f64, tg.expected_value(), epsilon = 0.01);
        assert!(tg.expected_value() > 0.1, "truncation at 0 shifts the mean up");
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(TruncatedGaussian::new(0.5, -0.1, 0.0, 1.0).is_err());
        assert!(TruncatedGaussian::new(0.5, 0.1, 1.0, 1.0).is_err());
        assert!(TruncatedGaussian::new(f64::NAN, 0.1, 0.0, 1.0).is_err());
        assert!(TruncatedGaussian::new(0.5, f64::INFINITY, 0.0, 1.0).is_err());
    }
}
