//! Occlusion process models.
//!
//! A tracked point is either *visible* or *occluded*.  [`OcclusionMeanModel`]
//! is the two-state Markov chain over that hidden flag, parameterised by the
//! one-time-unit transition probabilities and extended to real-valued elapsed
//! times.  [`ContinuousOcclusionModel`] turns the chain into a process over an
//! unconstrained score: the score is mapped to a probability with
//! [`sigmoid`], advanced through the chain, diffused with a
//! [`TruncatedGaussian`] on `[0, 1]`, and mapped back with [`logit`].
//!
//! ```text
//!   score ──sigmoid──▶ p ──chain(Δt)──▶ mean ──N(mean, σ²Δt) on [0,1]──▶ p' ──logit──▶ score'
//! ```
//!
//! # Example
//!
//! ```rust
//! use kinetrack_models::ContinuousOcclusionModel;
//!
//! let model = ContinuousOcclusionModel::new(0.1, 0.7, 0.2).unwrap();
//! let score = model.initial_score(0.1);
//! let next = model.condition(0.5, score).unwrap();
//! let p = kinetrack_models::sigmoid(next.map_standard_normal(0.3));
//! assert!((0.0..=1.0).contains(&p));
//! ```
//!
//! [`sigmoid`]: crate::probability::sigmoid
//! [`logit`]: crate::probability::logit

use kinetrack_types::{OcclusionParameters, Result, TrackError};
use tracing::debug;

use crate::check_delta_time;
use crate::probability::LogitTransform;
use crate::truncated_gaussian::TruncatedGaussian;

// ─────────────────────────────────────────────────────────────────────────────
// OcclusionMeanModel
// ─────────────────────────────────────────────────────────────────────────────

/// Two-state visible/occluded Markov chain in continuous time.
///
/// With `c = p_oo − p_ov` the occlusion probability after `Δt` time units,
/// starting from `p`, is
///
/// ```text
/// p(Δt) = 1 − [c^Δt · (1 − p) + (1 − p_oo) · (c^Δt − 1) / (c − 1)]
/// ```
///
/// which equals `p_ov` at `Δt = 1, p = 0`, `p_oo` at `Δt = 1, p = 1`, and
/// relaxes towards the steady state `p_ov / (1 − c)` as `Δt` grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionMeanModel {
    p_occluded_visible: f64,
    p_occluded_occluded: f64,
}

impl OcclusionMeanModel {
    /// Create the chain.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidParameter`] when either rate lies outside
    /// `[0, 1]`, or when `p_oo < p_ov` (such a chain oscillates and has no
    /// continuous-time embedding).  `p_oo == p_ov` is the memoryless chain.
    pub fn new(p_occluded_visible: f64, p_occluded_occluded: f64) -> Result<Self> {
        check_probability("p_occluded_visible", p_occluded_visible)?;
        check_probability("p_occluded_occluded", p_occluded_occluded)?;
        if p_occluded_occluded < p_occluded_visible {
            return Err(TrackError::invalid_parameter(
                "p_occluded_occluded",
                format!(
                    "{p_occluded_occluded} must not be below p_occluded_visible ({p_occluded_visible})"
                ),
            ));
        }
        Ok(Self {
            p_occluded_visible,
            p_occluded_occluded,
        })
    }

    pub fn p_occluded_visible(&self) -> f64 {
        self.p_occluded_visible
    }

    pub fn p_occluded_occluded(&self) -> f64 {
        self.p_occluded_occluded
    }

    /// Per-time-unit eigenvalue `c = p_oo − p_ov` of the chain, in `[0, 1]`.
    pub fn decay(&self) -> f64 {
        self.p_occluded_occluded - self.p_occluded_visible
    }

    /// Occlusion probability the chain converges to, or `None` for the
    /// identity chain (`p_ov = 0, p_oo = 1`), which keeps every prior.
    pub fn steady_state(&self) -> Option<f64> {
        let c = self.decay();
        if c >= 1.0 {
            None
        } else {
            Some(self.p_occluded_visible / (1.0 - c))
        }
    }

    /// Occlusion probability after `delta_time`, starting from `probability`.
    ///
    /// The result is clamped to `[0, 1]`.
    pub fn transition(&self, delta_time: f64, probability: f64) -> Result<f64> {
        check_delta_time(delta_time)?;
        let c = self.decay();
        if c >= 1.0 {
            return Ok(probability.clamp(0.0, 1.0));
        }
        if c == 0.0 {
            // Memoryless chain: any positive elapsed time forgets the prior.
            return Ok(if delta_time == 0.0 {
                probability.clamp(0.0, 1.0)
            } else {
                self.p_occluded_visible
            });
        }
        let c_dt = c.powf(delta_time);
        // (c^Δt − 1) / (c − 1), written with expm1 so that c close to 1 stays
        // accurate.
        let ratio = (delta_time * c.ln()).exp_m1() / (c - 1.0);
        let visible = c_dt * (1.0 - probability) + (1.0 - self.p_occluded_occluded) * ratio;
        Ok((1.0 - visible).clamp(0.0, 1.0))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ContinuousOcclusionModel
// ─────────────────────────────────────────────────────────────────────────────

/// Occlusion process over logit scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousOcclusionModel {
    mean_model: OcclusionMeanModel,
    transform: LogitTransform,
    sigma: f64,
}

impl ContinuousOcclusionModel {
    /// Create the model from the chain rates and the diffusion `sigma`.
    pub fn new(p_occluded_visible: f64, p_occluded_occluded: f64, sigma: f64) -> Result<Self> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(TrackError::invalid_parameter(
                "occlusion.sigma",
                format!("{sigma} is not a finite non-negative number"),
            ));
        }
        let mean_model = OcclusionMeanModel::new(p_occluded_visible, p_occluded_occluded)?;
        debug!(
            p_occluded_visible,
            p_occluded_occluded,
            sigma,
            steady_state = ?mean_model.steady_state(),
            "occlusion model created"
        );
        Ok(Self {
            mean_model,
            transform: LogitTransform,
            sigma,
        })
    }

    /// Create the model from the `[occlusion]` configuration section.
    pub fn from_parameters(parameters: &OcclusionParameters) -> Result<Self> {
        Self::new(
            parameters.p_occluded_visible,
            parameters.p_occluded_occluded,
            parameters.sigma,
        )
    }

    pub fn mean_model(&self) -> &OcclusionMeanModel {
        &self.mean_model
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Score a particle starts from when its occlusion probability is
    /// `initial_occlusion_prob`.
    pub fn initial_score(&self, initial_occlusion_prob: f64) -> f64 {
        self.transform.to_score(initial_occlusion_prob)
    }

    /// Distribution of the score after `delta_time`, given the prior score.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidParameter`] for a negative or non-finite
    /// `delta_time`.
    pub fn condition(&self, delta_time: f64, prior_score: f64) -> Result<OcclusionDistribution> {
        let prior = self.transform.to_probability(prior_score);
        let mean = self.mean_model.transition(delta_time, prior)?;
        let probability = TruncatedGaussian::new(mean, self.sigma * delta_time.sqrt(), 0.0, 1.0)?;
        Ok(OcclusionDistribution {
            probability,
            transform: self.transform,
        })
    }
}

/// Conditioned occlusion distribution, returned by
/// [`ContinuousOcclusionModel::condition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionDistribution {
    probability: TruncatedGaussian,
    transform: LogitTransform,
}

impl OcclusionDistribution {
    /// Distribution of the occlusion probability itself.
    pub fn probability(&self) -> &TruncatedGaussian {
        &self.probability
    }

    /// Map a standard-normal sample to a new score.
    pub fn map_standard_normal(&self, sample: f64) -> f64 {
        self.transform
            .to_score(self.probability.map_standard_normal(sample))
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TrackError::invalid_parameter(
            name,
            format!("{value} is outside [0, 1]"),
        ))
    }
}
