//! Per-joint transition model construction.
//!
//! Every joint evolves as an independent one-dimensional random walk
//! `x' = x + σᵢ·w + u` with its own noise scale `σᵢ`.  The builder owns the
//! configured sigmas and the joint count taken from the kinematics, and
//! re-checks that they agree on every [`build`][JointTransitionModelBuilder::build]
//! call so that a mismatch surfaces at the point of use.

use kinetrack_models::LinearGaussianModel;
use kinetrack_types::{JointTransitionParameters, Result, TrackError};
use nalgebra::DMatrix;
use tracing::debug;

/// Builds one [`LinearGaussianModel`] per joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTransitionModelBuilder {
    parameters: JointTransitionParameters,
}

impl JointTransitionModelBuilder {
    pub fn new(parameters: JointTransitionParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &JointTransitionParameters {
        &self.parameters
    }

    pub fn joint_count(&self) -> usize {
        self.parameters.joint_count
    }

    /// Build the transition model of the joint at `joint_index`.
    ///
    /// The index is signed so that callers passing through sentinel values
    /// such as `-1` get a range error instead of a wrap-around.
    ///
    /// # Errors
    ///
    /// - [`TrackError::InvalidJointSigmaCount`] when the number of sigmas
    ///   differs from the joint count (checked first, for any index).
    /// - [`TrackError::JointIndexOutOfBounds`] when `joint_index` is negative
    ///   or not below the joint count.
    pub fn build(&self, joint_index: isize) -> Result<LinearGaussianModel> {
        let joint_count = self.parameters.joint_count;
        let sigmas = &self.parameters.joint_sigmas;
        if sigmas.len() != joint_count {
            return Err(TrackError::InvalidJointSigmaCount {
                expected: joint_count,
                actual: sigmas.len(),
            });
        }
        let index = usize::try_from(joint_index)
            .ok()
            .filter(|&i| i < joint_count)
            .ok_or(TrackError::JointIndexOutOfBounds {
                index: joint_index,
                joint_count,
            })?;

        let sigma = sigmas[index];
        debug!(joint_index = index, sigma, "building joint transition model");
        LinearGaussianModel::new(
            DMatrix::identity(1, 1),
            DMatrix::from_element(1, 1, sigma),
            DMatrix::identity(1, 1),
        )
    }

    /// Build the models of all joints, in index order.
    pub fn build_all(&self) -> Result<Vec<LinearGaussianModel>> {
        (0..self.parameters.joint_count)
            .map(|i| self.build(i as isize))
            .collect()
    }
}
