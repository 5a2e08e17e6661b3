//! Damped Wiener process (continuous-time mean-reverting random walk).
//!
//! Given the state `x` at time `t`, a constant input `u` and damping `d`, the
//! state after an elapsed time `Δt` is Gaussian with
//!
//! ```text
//! mean       = (1 − e^(−d·Δt)) / d · u + e^(−d·Δt) · x
//! covariance = (1 − e^(−2·d·Δt)) / (2·d) · Q
//! ```
//!
//! where `Q` is the noise covariance.  When `d·Δt` is below machine epsilon,
//! or either expression stops being finite, the `d → 0` limit is used instead
//! (`mean = x + Δt · u`, `covariance = Δt · Q`), so the process degrades to a
//! plain random walk.
//!
//! # Example
//!
//! ```rust
//! use kinetrack_models::DampedWienerProcess;
//! use nalgebra::{DMatrix, DVector};
//!
//! let process = DampedWienerProcess::new(1.0, DMatrix::identity(1, 1)).unwrap();
//! let next = process
//!     .condition(1.0, &DVector::from_element(1, 0.0), &DVector::from_element(1, 2.0))
//!     .unwrap();
//! assert!((next.mean()[0] - 1.264).abs() < 1e-3);
//! assert!((next.covariance()[(0, 0)] - 0.432).abs() < 1e-3);
//! ```

use kinetrack_types::{Result, TrackError};
use nalgebra::{DMatrix, DVector};
use tracing::trace;

use crate::check_delta_time;
use crate::gaussian::{Gaussian, check_covariance};

/// Stationary damped Wiener process with fixed damping and noise covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct DampedWienerProcess {
    damping: f64,
    noise_covariance: DMatrix<f64>,
}

impl DampedWienerProcess {
    /// Create a process.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidParameter`] when `damping` is negative or
    /// not finite or the noise covariance is not symmetric positive
    /// semi-definite, and [`TrackError::DimensionMismatch`] when the noise
    /// covariance is not square.
    pub fn new(damping: f64, noise_covariance: DMatrix<f64>) -> Result<Self> {
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(TrackError::invalid_parameter(
                "damping",
                format!("{damping} is not a finite non-negative number"),
            ));
        }
        if !noise_covariance.is_square() {
            return Err(TrackError::DimensionMismatch {
                what: "noise covariance columns".to_string(),
                expected: noise_covariance.nrows(),
                actual: noise_covariance.ncols(),
            });
        }
        check_covariance("noise_covariance", &noise_covariance)?;
        Ok(Self {
            damping,
            noise_covariance,
        })
    }

    /// Create a process whose noise covariance is `diag(sigma²)`.
    pub fn from_noise_sigmas(damping: f64, noise_sigmas: &[f64]) -> Result<Self> {
        let variances = DVector::from_iterator(noise_sigmas.len(), noise_sigmas.iter().map(|s| s * s));
        Self::new(damping, DMatrix::from_diagonal(&variances))
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn noise_covariance(&self) -> &DMatrix<f64> {
        &self.noise_covariance
    }

    /// State, input and noise dimension (all equal).
    pub fn dimension(&self) -> usize {
        self.noise_covariance.nrows()
    }

    /// Conditional mean of the state after `delta_time`.
    pub fn mean(
        &self,
        delta_time: f64,
        state: &DVector<f64>,
        input: &DVector<f64>,
    ) -> Result<DVector<f64>> {
        check_delta_time(delta_time)?;
        self.check_dimension("state", state.len())?;
        self.check_dimension("input", input.len())?;

        if self.is_random_walk(delta_time) {
            return Ok(state + input * delta_time);
        }
        let decay = (-self.damping * delta_time).exp();
        // (1 − e^(−d·Δt)) / d, via expm1 to keep precision for small d·Δt.
        let gain = -(-self.damping * delta_time).exp_m1() / self.damping;
        let mean = input * gain + state * decay;

        if mean.iter().all(|v| v.is_finite()) {
            Ok(mean)
        } else {
            trace!(damping = self.damping, delta_time, "non-finite mean; using random-walk limit");
            Ok(state + input * delta_time)
        }
    }

    /// Scalar factor `(1 − e^(−2·d·Δt)) / (2·d)` applied to the noise
    /// covariance, or `Δt` in the random-walk limit.
    pub fn covariance_factor(&self, delta_time: f64) -> f64 {
        if self.is_random_walk(2.0 * delta_time) {
            return delta_time;
        }
        let factor = -(-2.0 * self.damping * delta_time).exp_m1() / (2.0 * self.damping);
        if factor.is_finite() {
            factor
        } else {
            trace!(damping = self.damping, delta_time, "non-finite covariance factor; using random-walk limit");
            delta_time
        }
    }

    /// Conditional covariance of the state after `delta_time`.
    pub fn covariance(&self, delta_time: f64) -> Result<DMatrix<f64>> {
        check_delta_time(delta_time)?;
        Ok(&self.noise_covariance * self.covariance_factor(delta_time))
    }

    /// Condition the process on the current state and input.
    ///
    /// Returns the Gaussian over the state after `delta_time`.  The process is
    /// not modified, so concurrent callers can share one instance.
    pub fn condition(
        &self,
        delta_time: f64,
        state: &DVector<f64>,
        input: &DVector<f64>,
    ) -> Result<Gaussian> {
        let mean = self.mean(delta_time, state, input)?;
        let covariance = self.covariance(delta_time)?;
        Gaussian::new(mean, covariance)
    }

    /// Condition and map a standard-normal `sample` in one call.
    pub fn map_gaussian(
        &self,
        delta_time: f64,
        state: &DVector<f64>,
        input: &DVector<f64>,
        sample: &DVector<f64>,
    ) -> Result<DVector<f64>> {
        self.condition(delta_time, state, input)?
            .map_standard_normal(sample)
    }

    // Below machine epsilon d·Δt no longer resolves the exponential (and with
    // subnormal d it is rounded to a multiple of the smallest subnormal), while
    // the random walk is exact to first order.
    fn is_random_walk(&self, delta_time: f64) -> bool {
        self.damping * delta_time < f64::EPSILON
    }

    fn check_dimension(&self, what: &str, actual: usize) -> Result<()> {
        if actual == self.dimension() {
            Ok(())
        } else {
            Err(TrackError::DimensionMismatch {
                what: what.to_string(),
                expected: self.dimension(),
                actual,
            })
        }
    }
}
