//! [`JointMap`] – minimal [`Kinematics`] backed by an ordered joint list.
//!
//! The position of a name in the list is its index in the joint state
//! vector.  This covers trackers configured with an explicit joint list; a
//! full kinematic tree only needs to implement the same trait.

use std::collections::{BTreeMap, HashMap};

use kinetrack_types::{Kinematics, Result, TrackError};
use nalgebra::DVector;

/// Name ↔ index table over a flat list of joints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointMap {
    names: Vec<String>,
    indices: HashMap<String, usize>,
}

impl JointMap {
    /// Create a map from joint names in state order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidParameter`] when a name appears twice.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut map = Self::default();
        for name in names {
            let name = name.into();
            if map.indices.contains_key(&name) {
                return Err(TrackError::invalid_parameter(
                    "joints",
                    format!("duplicate joint name '{name}'"),
                ));
            }
            map.indices.insert(name.clone(), map.names.len());
            map.names.push(name);
        }
        Ok(map)
    }

    /// Joint names in state order.
    pub fn joint_names(&self) -> &[String] {
        &self.names
    }

    /// Pair each joint name with its entry of `state`.
    pub fn joint_positions(&self, state: &DVector<f64>) -> Result<BTreeMap<String, f64>> {
        if state.len() != self.names.len() {
            return Err(TrackError::DimensionMismatch {
                what: "joint state".to_string(),
                expected: self.names.len(),
                actual: state.len(),
            });
        }
        Ok(self
            .names
            .iter()
            .cloned()
            .zip(state.iter().copied())
            .collect())
    }
}

impl Kinematics for JointMap {
    fn num_joints(&self) -> usize {
        self.names.len()
    }

    fn name_to_index(&self, joint_name: &str) -> Result<usize> {
        self.indices
            .get(joint_name)
            .copied()
            .ok_or_else(|| TrackError::UnknownJoint(joint_name.to_string()))
    }
}
