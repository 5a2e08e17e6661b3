//! [`ModelSet`] – every model a [`TrackerConfig`] describes, built at once.

use kinetrack_models::{ContinuousOcclusionModel, DampedWienerProcess, LinearGaussianModel};
use kinetrack_types::{
    JointTransitionParameters, Kinematics, Result, SamplingBlock, SamplingBlocksDefinition,
    TrackerConfig, TrackerParameters,
};
use tracing::{info, warn};

use crate::joint_transition::JointTransitionModelBuilder;
use crate::sampling_blocks::{merge, resolve};

/// Immutable models and sampling schedule for one tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSet {
    /// One transition model per joint, in joint index order.
    pub joint_models: Vec<LinearGaussianModel>,
    /// Joint index blocks in sweep order.
    pub sampling_blocks: Vec<SamplingBlock>,
    pub occlusion: ContinuousOcclusionModel,
    /// Logit score new particles start from.
    pub initial_occlusion_score: f64,
    pub pose_process: Option<DampedWienerProcess>,
    pub tracker: TrackerParameters,
}

impl ModelSet {
    /// Validate `config` and build every model against `kinematics`.
    ///
    /// The joint count always comes from `kinematics`.  The sampling schedule
    /// is the main sampling-block definition merged with the camera-offset
    /// one.
    ///
    /// # Errors
    ///
    /// Any validation or construction error, e.g.
    /// [`TrackError::InvalidJointSigmaCount`][kinetrack_types::TrackError::InvalidJointSigmaCount]
    /// or [`TrackError::UnknownJoint`][kinetrack_types::TrackError::UnknownJoint].
    pub fn from_config(config: &TrackerConfig, kinematics: &dyn Kinematics) -> Result<Self> {
        config.validate()?;

        let builder = JointTransitionModelBuilder::new(JointTransitionParameters {
            joint_sigmas: config.joint_transition.joint_sigmas.clone(),
            joint_count: kinematics.num_joints(),
        });
        let joint_models = builder.build_all()?;
        for (index, sigma) in config.joint_transition.joint_sigmas.iter().enumerate() {
            if *sigma == 0.0 {
                warn!(joint_index = index, "joint sigma is zero; joint will never move");
            }
        }

        let sampling_blocks = resolve(&schedule_definition(config), kinematics)?;

        let occlusion = ContinuousOcclusionModel::from_parameters(&config.occlusion)?;
        let initial_occlusion_score = occlusion.initial_score(config.occlusion.initial_occlusion_prob);

        let pose_process = config
            .pose_process
            .as_ref()
            .map(|pose| DampedWienerProcess::from_noise_sigmas(pose.damping, &pose.noise_sigmas))
            .transpose()?;

        info!(
            joints = joint_models.len(),
            blocks = sampling_blocks.len(),
            pose_process = pose_process.is_some(),
            "model set assembled"
        );

        Ok(Self {
            joint_models,
            sampling_blocks,
            occlusion,
            initial_occlusion_score,
            pose_process,
            tracker: config.tracker.clone(),
        })
    }
}

/// Joint sampling blocks merged with the camera-offset ones.
pub fn schedule_definition(config: &TrackerConfig) -> SamplingBlocksDefinition {
    merge(&config.sampling_blocks, &config.camera_offset.sampling_blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::JointMap;
    use approx::assert_abs_diff_eq;
    use kinetrack_models::sigmoid;
    use kinetrack_types::TrackError;

    const SAMPLE: &str = r#"
joints = ["shoulder", "elbow", "wrist", "cam_x"]

[joint_transition]
joint_sigmas = [0.1, 0.1, 0.2, 0.0]

[occlusion]
initial_occlusion_prob = 0.25

[pose_process]
damping = 1.0
noise_sigmas = [0.01, 0.02]

[[sampling_blocks]]
name = "arm"
joints = ["shoulder", "elbow"]

[[sampling_blocks]]
name = "hand"
joints = ["wrist"]

[[camera_offset.sampling_blocks]]
name = "arm"
joints = ["cam_x"]
"#;

    fn sample() -> (TrackerConfig, JointMap) {
        let config: TrackerConfig = toml::from_str(SAMPLE).unwrap();
        let joints = JointMap::new(config.joints.clone()).unwrap();
        (config, joints)
    }

    #[test]
    fn assembles_sample_config() {
        let (config, joints) = sample();
        let set = ModelSet::from_config(&config, &joints).unwrap();

        assert_eq!(set.joint_models.len(), 4);
        assert_abs_diff_eq!(set.joint_models[2].noise_matrix()[(0, 0)], 0.2);
        assert_eq!(set.sampling_blocks, vec![vec![0, 1, 3], vec![2]]);
        assert_abs_diff_eq!(sigmoid(set.initial_occlusion_score), 0.25, epsilon = 1e-12);
        assert_eq!(set.pose_process.as_ref().unwrap().dimension(), 2);
        assert_eq!(set.tracker, TrackerParameters::default());
    }

    #[test]
    fn joint_count_comes_from_kinematics() {
        let (config, _) = sample();
        let fewer = JointMap::new(["shoulder", "elbow", "wrist"]).unwrap();
        assert_eq!(
            ModelSet::from_config(&config, &fewer).unwrap_err(),
            TrackError::InvalidJointSigmaCount {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn unknown_block_joint_is_reported() {
        let (mut config, joints) = sample();
        config
            .camera_offset
            .sampling_blocks
            .push(kinetrack_types::BlockDefinition::new("offset", ["cam_y"]));
        assert_eq!(
            ModelSet::from_config(&config, &joints).unwrap_err(),
            TrackError::UnknownJoint("cam_y".to_string())
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let (mut config, joints) = sample();
        config.occlusion.p_occluded_occluded = 2.0;
        assert!(matches!(
            ModelSet::from_config(&config, &joints),
            Err(TrackError::InvalidParameter { .. })
        ));
    }
}
