//! Sampling-block assembly.
//!
//! The particle filter resamples the joint state one block at a time.  Each
//! part of the tracker (the robot joints, the camera offset, ...) contributes
//! named joint groups, and groups with the same name from different sources
//! are sampled together.  [`merge`] combines two definitions by name and
//! [`resolve`] turns the result into index blocks:
//!
//! ```text
//! A = { arm: [j1, j2] }                         merge        resolve
//! B = { arm: [j3], offset: [j4] }   ──────▶  { arm: [j1, j2, j3],   ──────▶  [[0, 1, 2], [3]]
//!                                              offset: [j4] }
//! ```

use kinetrack_types::{Kinematics, Result, SamplingBlock, SamplingBlocksDefinition};
use tracing::info;

/// Merge `b` into a copy of `a`.
///
/// For each group of `b`, in order, the first group of the merged result with
/// the same name is extended with `b`'s joints; a group without a match is
/// appended.  Groups of `a` keep their order and groups appended from `b` take
/// part in later matches, so duplicate names inside `b` end up in one group.
pub fn merge(a: &SamplingBlocksDefinition, b: &SamplingBlocksDefinition) -> SamplingBlocksDefinition {
    let mut merged = a.clone();
    for block in b {
        match merged
            .blocks_mut()
            .iter_mut()
            .find(|existing| existing.name == block.name)
        {
            Some(existing) => existing.joints.extend(block.joints.iter().cloned()),
            None => merged.push(block.clone()),
        }
    }
    merged
}

/// Map every joint name of `definition` to its state index.
///
/// Group order and the name order inside each group are preserved.
///
/// # Errors
///
/// The first joint name `kinematics` cannot resolve aborts the whole call
/// with the error it reports.
pub fn resolve(
    definition: &SamplingBlocksDefinition,
    kinematics: &dyn Kinematics,
) -> Result<Vec<SamplingBlock>> {
    let blocks = definition
        .iter()
        .map(|block| {
            block
                .joints
                .iter()
                .map(|joint| kinematics.name_to_index(joint))
                .collect::<Result<SamplingBlock>>()
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        groups = blocks.len(),
        joints = blocks.iter().map(Vec::len).sum::<usize>(),
        "resolved sampling blocks"
    );
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::JointMap;
    use kinetrack_types::{BlockDefinition, TrackError};

    fn joints() -> JointMap {
        JointMap::new(["j1", "j2", "j3", "j4"]).unwrap()
    }

    #[test]
    fn merges_by_name_and_resolves_to_indices() {
        let a = SamplingBlocksDefinition::new().with_block("arm", ["j1", "j2"]);
        let b = SamplingBlocksDefinition::new()
            .with_block("arm", ["j3"])
            .with_block("offset", ["j4"]);

        let merged = merge(&a, &b);
        assert_eq!(
            merged.blocks(),
            &[
                BlockDefinition::new("arm", ["j1", "j2", "j3"]),
                BlockDefinition::new("offset", ["j4"]),
            ]
        );
        assert_eq!(resolve(&merged, &joints()).unwrap(), vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn merging_empty_definition_is_identity() {
        let a = SamplingBlocksDefinition::new().with_block("arm", ["j1"]);
        let b = SamplingBlocksDefinition::new()
            .with_block("arm", ["j2"])
            .with_block("hand", ["j3"]);
        let merged = merge(&a, &b);
        let empty = SamplingBlocksDefinition::new();
        assert_eq!(merge(&merged, &empty), merged);
        assert_eq!(merge(&empty, &merged), merged);
    }

    #[test]
    fn first_definition_keeps_its_order() {
        let a = SamplingBlocksDefinition::new()
            .with_block("x", ["j1"])
            .with_block("y", ["j2"])
            .with_block("z", ["j3"]);
        let b = SamplingBlocksDefinition::new()
            .with_block("w", ["j4"])
            .with_block("y", Vec::<String>::new());
        let names: Vec<_> = merge(&a, &b).iter().map(|g| g.name.clone()).collect();
        assert_eq!(names, vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn duplicate_names_in_second_definition_collapse() {
        let a = SamplingBlocksDefinition::new().with_block("arm", ["j1"]);
        let b = SamplingBlocksDefinition::new()
            .with_block("hand", ["j2"])
            .with_block("hand", ["j3"])
            .with_block("arm", ["j4"]);
        let merged = merge(&a, &b);
        assert_eq!(merged.len(), 2);
        assert_eq!(resolve(&merged, &joints()).unwrap(), vec![vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn group_count_equals_distinct_names() {
        let a = SamplingBlocksDefinition::new()
            .with_block("a", ["j1"])
            .with_block("b", ["j2"]);
        let b = SamplingBlocksDefinition::new()
            .with_block("c", ["j3"])
            .with_block("a", ["j4"])
            .with_block("c", Vec::<String>::new());
        assert_eq!(resolve(&merge(&a, &b), &joints()).unwrap().len(), 3);
    }

    #[test]
    fn unknown_joint_aborts_resolution() {
        let def = SamplingBlocksDefinition::new()
            .with_block("arm", ["j1"])
            .with_block("ghost", ["nope"]);
        assert_eq!(
            resolve(&def, &joints()).unwrap_err(),
            TrackError::UnknownJoint("nope".to_string())
        );
    }

    /// Kinematics whose lookup always fails with its own error kind.
    struct MockKinematics;

    impl Kinematics for MockKinematics {
        fn num_joints(&self) -> usize {
            0
        }

        fn name_to_index(&self, joint_name: &str) -> Result<usize> {
            Err(TrackError::invalid_parameter("urdf", format!("no link for {joint_name}")))
        }
    }

    #[test]
    fn collaborator_error_is_propagated_unchanged() {
        let def = SamplingBlocksDefinition::new().with_block("arm", ["j1"]);
        assert_eq!(
            resolve(&def, &MockKinematics).unwrap_err(),
            TrackError::invalid_parameter("urdf", "no link for j1")
        );
        // Definitions without joints never consult the collaborator.
        let empty = SamplingBlocksDefinition::new();
        assert!(resolve(&empty, &MockKinematics).unwrap().is_empty());
    }

    #[test]
    fn empty_groups_resolve_to_empty_blocks() {
        let def = SamplingBlocksDefinition::new().with_block("idle", Vec::<String>::new());
        assert_eq!(resolve(&def, &joints()).unwrap(), vec![Vec::<usize>::new()]);
    }
}
