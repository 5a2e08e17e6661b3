//! Tracker configuration as delivered by the configuration source.
//!
//! The structs in this module are plain data: the CLI deserialises them from
//! TOML, and [`TrackerConfig::validate`] rejects out-of-range values before any
//! model is built.  Each section falls back to its default when omitted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Result, SamplingBlocksDefinition, TrackError};

/// Top-level tracker configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackerConfig {
    /// Joint names in state-vector order.  Stands in for the kinematic tree
    /// when no URDF-backed kinematics are available.
    #[serde(default)]
    pub joints: Vec<String>,

    #[serde(default)]
    pub joint_transition: JointTransitionParameters,

    #[serde(default)]
    pub occlusion: OcclusionParameters,

    /// Damped Wiener process for the pose/velocity part of the state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_process: Option<PoseProcessParameters>,

    #[serde(default)]
    pub tracker: TrackerParameters,

    /// Joint sampling blocks.
    #[serde(default)]
    pub sampling_blocks: SamplingBlocksDefinition,

    #[serde(default)]
    pub camera_offset: CameraOffsetConfig,
}

/// Per-joint linear-Gaussian transition parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JointTransitionParameters {
    /// Noise scale of each joint, indexed by joint index.
    #[serde(default)]
    pub joint_sigmas: Vec<f64>,

    /// Number of joints.  Taken from the kinematics at build time, never from
    /// the configuration file.
    #[serde(skip)]
    pub joint_count: usize,
}

/// Two-state occlusion process parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OcclusionParameters {
    /// Probability of being occluded one time unit after being visible.
    #[serde(default = "default_p_occluded_visible")]
    pub p_occluded_visible: f64,
    /// Probability of staying occluded over one time unit.
    #[serde(default = "default_p_occluded_occluded")]
    pub p_occluded_occluded: f64,
    /// Occlusion probability every particle starts with.
    #[serde(default = "default_initial_occlusion_prob")]
    pub initial_occlusion_prob: f64,
    /// Diffusion of the occlusion probability per square-root time unit.
    #[serde(default = "default_occlusion_sigma")]
    pub sigma: f64,
}

fn default_p_occluded_visible() -> f64 {
    0.1
}
fn default_p_occluded_occluded() -> f64 {
    0.7
}
fn default_initial_occlusion_prob() -> f64 {
    0.1
}
fn default_occlusion_sigma() -> f64 {
    0.2
}

impl Default for OcclusionParameters {
    fn default() -> Self {
        Self {
            p_occluded_visible: default_p_occluded_visible(),
            p_occluded_occluded: default_p_occluded_occluded(),
            initial_occlusion_prob: default_initial_occlusion_prob(),
            sigma: default_occlusion_sigma(),
        }
    }
}

/// Damped Wiener process parameters with a diagonal noise covariance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoseProcessParameters {
    /// Mean-reversion rate (1/s).  Zero gives a pure random walk.
    pub damping: f64,
    /// Standard deviation of each state dimension; the noise covariance is
    /// `diag(noise_sigmas²)`.
    pub noise_sigmas: Vec<f64>,
}

/// Parameters handed through to the outer particle filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackerParameters {
    /// Number of likelihood evaluations (particles) per filter step.
    #[serde(default = "default_evaluation_count")]
    pub evaluation_count: usize,
    /// Update rate of the moving average over particle states, in `[0, 1]`.
    #[serde(default = "default_moving_average_update_rate")]
    pub moving_average_update_rate: f64,
    /// KL divergence threshold that triggers resampling.
    #[serde(default = "default_max_kl_divergence")]
    pub max_kl_divergence: f64,
}

fn default_evaluation_count() -> usize {
    100
}
fn default_moving_average_update_rate() -> f64 {
    0.1
}
fn default_max_kl_divergence() -> f64 {
    2.0
}

impl Default for TrackerParameters {
    fn default() -> Self {
        Self {
            evaluation_count: default_evaluation_count(),
            moving_average_update_rate: default_moving_average_update_rate(),
            max_kl_divergence: default_max_kl_divergence(),
        }
    }
}

/// Sampling blocks contributed by the camera-offset part of the state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CameraOffsetConfig {
    #[serde(default)]
    pub sampling_blocks: SamplingBlocksDefinition,
}

impl TrackerConfig {
    /// Check every value range that does not need the kinematics.
    ///
    /// Shape checks that depend on the joint count (sigma count, joint names)
    /// happen when the models are built.
    pub fn validate(&self) -> Result<()> {
        for (i, sigma) in self.joint_transition.joint_sigmas.iter().enumerate() {
            if !sigma.is_finite() {
                return Err(TrackError::invalid_parameter(
                    "joint_transition.joint_sigmas",
                    format!("entry {i} is not finite ({sigma})"),
                ));
            }
        }

        let occ = &self.occlusion;
        check_unit_interval("occlusion.p_occluded_visible", occ.p_occluded_visible)?;
        check_unit_interval("occlusion.p_occluded_occluded", occ.p_occluded_occluded)?;
        if !(occ.initial_occlusion_prob > 0.0 && occ.initial_occlusion_prob < 1.0) {
            return Err(TrackError::invalid_parameter(
                "occlusion.initial_occlusion_prob",
                format!("{} is not in (0, 1)", occ.initial_occlusion_prob),
            ));
        }
        check_non_negative("occlusion.sigma", occ.sigma)?;

        if let Some(pose) = &self.pose_process {
            check_non_negative("pose_process.damping", pose.damping)?;
            if pose.noise_sigmas.is_empty() {
                return Err(TrackError::invalid_parameter(
                    "pose_process.noise_sigmas",
                    "at least one dimension is required",
                ));
            }
            for sigma in &pose.noise_sigmas {
                check_non_negative("pose_process.noise_sigmas", *sigma)?;
            }
        }

        let tracker = &self.tracker;
        if tracker.evaluation_count == 0 {
            return Err(TrackError::invalid_parameter(
                "tracker.evaluation_count",
                "must be positive",
            ));
        }
        check_unit_interval(
            "tracker.moving_average_update_rate",
            tracker.moving_average_update_rate,
        )?;
        if !(tracker.max_kl_divergence.is_finite() && tracker.max_kl_divergence > 0.0) {
            return Err(TrackError::invalid_parameter(
                "tracker.max_kl_divergence",
                format!("{} is not a positive number", tracker.max_kl_divergence),
            ));
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TrackError::invalid_parameter(name, format!("{value} is not in [0, 1]")))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TrackError::invalid_parameter(
            name,
            format!("{value} is not a finite non-negative number"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
joints = ["shoulder", "elbow", "wrist"]

[joint_transition]
joint_sigmas = [0.1, 0.1, 0.2]

[occlusion]
p_occluded_visible = 0.1
p_occluded_occluded = 0.7
initial_occlusion_prob = 0.1
sigma = 0.2

[pose_process]
damping = 1.0
noise_sigmas = [0.01, 0.01, 0.01]

[tracker]
evaluation_count = 200
moving_average_update_rate = 0.1
max_kl_divergence = 2.0

[[sampling_blocks]]
name = "arm"
joints = ["shoulder", "elbow"]

[[camera_offset.sampling_blocks]]
name = "offset"
joints = ["wrist"]
"#;

    #[test]
    fn sample_config_parses_and_validates() {
        let cfg: TrackerConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.joints.len(), 3);
        assert_eq!(cfg.joint_transition.joint_sigmas, [0.1, 0.1, 0.2]);
        assert_eq!(cfg.joint_transition.joint_count, 0);
        assert_eq!(cfg.tracker.evaluation_count, 200);
        assert_eq!(cfg.sampling_blocks.blocks()[0].name, "arm");
        assert_eq!(cfg.camera_offset.sampling_blocks.blocks()[0].joints, ["wrist"]);
        assert!(cfg.pose_process.is_some());
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: TrackerConfig = toml::from_str(r#"joints = ["j1"]"#).unwrap();
        assert_eq!(cfg.occlusion, OcclusionParameters::default());
        assert_eq!(cfg.tracker, TrackerParameters::default());
        assert!(cfg.pose_process.is_none());
        assert!(cfg.sampling_blocks.is_empty());
        cfg.validate().unwrap();
    }

    #[test]
    fn toml_roundtrip() {
        let cfg: TrackerConfig = toml::from_str(SAMPLE).unwrap();
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let back: TrackerConfig = toml::from_str(&raw).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut cfg = TrackerConfig::default();
        cfg.occlusion.p_occluded_visible = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(TrackError::InvalidParameter { ref name, .. }) if name == "occlusion.p_occluded_visible"
        ));

        let mut cfg = TrackerConfig::default();
        cfg.occlusion.initial_occlusion_prob = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrackerConfig::default();
        cfg.tracker.max_kl_divergence = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrackerConfig::default();
        cfg.tracker.evaluation_count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrackerConfig::default();
        cfg.joint_transition.joint_sigmas = vec![0.1, f64::NAN];
        assert!(cfg.validate().is_err());

        let mut cfg = TrackerConfig::default();
        cfg.pose_process = Some(PoseProcessParameters {
            damping: -1.0,
            noise_sigmas: vec![0.1],
        });
        assert!(cfg.validate().is_err());
    }
}
