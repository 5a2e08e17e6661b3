//! `kinetrack-models` – stochastic process models for robot tracking.
//!
//! Every model here is immutable once built.  Conditioning returns a new
//! distribution value instead of storing it, so a single model instance can be
//! shared by all particles and worker threads of the outer filter.
//!
//! # Modules
//!
//! - [`probability`] – logit/sigmoid bijection between (0, 1) and ℝ.
//! - [`gaussian`] – [`Gaussian`][gaussian::Gaussian]: multivariate normal
//!   that maps standard-normal samples through a covariance square root.
//! - [`truncated_gaussian`] – [`TruncatedGaussian`][truncated_gaussian::TruncatedGaussian]:
//!   normal distribution restricted to an interval.
//! - [`damped_wiener`] – [`DampedWienerProcess`][damped_wiener::DampedWienerProcess]:
//!   continuous-time mean-reverting process for pose and velocity.
//! - [`occlusion`] – two-state occlusion chain and its continuous
//!   logit-space counterpart.
//! - [`linear_gaussian`] – [`LinearGaussianModel`][linear_gaussian::LinearGaussianModel]:
//!   `x' = A x + B w + C u` transition used per joint.

pub mod damped_wiener;
pub mod gaussian;
pub mod linear_gaussian;
pub mod occlusion;
pub mod probability;
pub mod truncated_gaussian;

pub use damped_wiener::DampedWienerProcess;
pub use gaussian::Gaussian;
pub use linear_gaussian::LinearGaussianModel;
pub use occlusion::{ContinuousOcclusionModel, OcclusionDistribution, OcclusionMeanModel};
pub use probability::{LogitTransform, logit, sigmoid};
pub use truncated_gaussian::TruncatedGaussian;

/// Elapsed times must be finite and non-negative.
pub(crate) fn check_delta_time(delta_time: f64) -> kinetrack_types::Result<()> {
    if delta_time.is_finite() && delta_time >= 0.0 {
        Ok(())
    } else {
        Err(kinetrack_types::TrackError::invalid_parameter(
            "delta_time",
            format!("{delta_time} is not a finite non-negative number"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn models_can_be_shared_across_threads() {
        assert_send_sync::<DampedWienerProcess>();
        assert_send_sync::<Gaussian>();
        assert_send_sync::<LinearGaussianModel>();
        assert_send_sync::<OcclusionMeanModel>();
        assert_send_sync::<ContinuousOcclusionModel>();
        assert_send_sync::<OcclusionDistribution>();
        assert_send_sync::<TruncatedGaussian>();
    }
}
