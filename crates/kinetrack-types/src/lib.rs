//! `kinetrack-types` – shared vocabulary for the kinetrack workspace.
//!
//! Holds the error type, the kinematics collaborator trait, the sampling-block
//! definitions consumed by the assembler, and the [`config`] structs that the
//! CLI deserialises from TOML.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::{
    CameraOffsetConfig, JointTransitionParameters, OcclusionParameters, PoseProcessParameters,
    TrackerConfig, TrackerParameters,
};

/// Ordered list of joint indices that are resampled together in one sweep of
/// the blocked particle filter.
pub type SamplingBlock = Vec<usize>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors raised while validating configuration or conditioning a model.
///
/// Numeric edge cases (vanishing damping, zero elapsed time) are not errors;
/// the models substitute their limiting values instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("Invalid joint sigma count: expected {expected}, got {actual}")]
    InvalidJointSigmaCount { expected: usize, actual: usize },

    #[error("Joint index {index} out of bounds for {joint_count} joints")]
    JointIndexOutOfBounds { index: isize, joint_count: usize },

    #[error("Unknown joint: {0}")]
    UnknownJoint(String),

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter {name}: {details}")]
    InvalidParameter { name: String, details: String },
}

impl TrackError {
    pub fn invalid_parameter(name: &str, details: impl Into<String>) -> Self {
        TrackError::InvalidParameter {
            name: name.to_string(),
            details: details.into(),
        }
    }
}

/// Kinematic description of the tracked robot.
///
/// Only the joint-indexing part of the kinematics is needed here; link poses
/// and mesh data live with the renderer.
pub trait Kinematics: Send + Sync {
    /// Number of joints in the state vector.
    fn num_joints(&self) -> usize;

    /// Resolve a joint name to its index in the state vector.
    ///
    /// Fails when the name does not belong to the kinematic tree.
    fn name_to_index(&self, joint_name: &str) -> Result<usize>;
}

/// A named group of joints, e.g. `"arm" → ["shoulder", "elbow"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BlockDefinition {
    pub name: String,
    pub joints: Vec<String>,
}

impl BlockDefinition {
    pub fn new<S: Into<String>>(name: &str, joints: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.to_string(),
            joints: joints.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered sequence of [`BlockDefinition`]s.
///
/// Group order is the block-sampling sweep order, so it is preserved by every
/// operation on this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SamplingBlocksDefinition(Vec<BlockDefinition>);

impl SamplingBlocksDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group at the end of the definition.
    pub fn push(&mut self, block: BlockDefinition) {
        self.0.push(block);
    }

    /// Builder-style variant of [`push`][Self::push].
    pub fn with_block<S: Into<String>>(
        mut self,
        name: &str,
        joints: impl IntoIterator<Item = S>,
    ) -> Self {
        self.push(BlockDefinition::new(name, joints));
        self
    }

    pub fn blocks(&self) -> &[BlockDefinition] {
        &self.0
    }

    pub fn blocks_mut(&mut self) -> &mut [BlockDefinition] {
        &mut self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockDefinition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<BlockDefinition>> for SamplingBlocksDefinition {
    fn from(blocks: Vec<BlockDefinition>) -> Self {
        Self(blocks)
    }
}

impl<'a> IntoIterator for &'a SamplingBlocksDefinition {
    type Item = &'a BlockDefinition;
    type IntoIter = std::slice::Iter<'a, BlockDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
