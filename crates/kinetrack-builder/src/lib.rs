//! `kinetrack-builder` – construction-time assembly of the tracker models.
//!
//! Nothing in this crate runs per filter step.  It turns validated
//! configuration and a [`Kinematics`][kinetrack_types::Kinematics] description
//! into the immutable models of `kinetrack-models` and the index-based
//! sampling schedule the particle filter sweeps over.
//!
//! # Modules
//!
//! - [`joint_transition`] – [`JointTransitionModelBuilder`][joint_transition::JointTransitionModelBuilder]:
//!   checks the per-joint sigmas against the joint count and builds one
//!   [`LinearGaussianModel`][kinetrack_models::LinearGaussianModel] per joint.
//! - [`sampling_blocks`] – [`merge`][sampling_blocks::merge] and
//!   [`resolve`][sampling_blocks::resolve]: combine named joint groups from
//!   several configuration sources and map them to state indices.
//! - [`kinematics`] – [`JointMap`][kinematics::JointMap]: name ↔ index table
//!   for a flat list of joints.
//! - [`model_set`] – [`ModelSet`][model_set::ModelSet]: every model of a
//!   [`TrackerConfig`][kinetrack_types::TrackerConfig] built in one call.

pub mod joint_transition;
pub mod kinematics;
pub mod model_set;
pub mod sampling_blocks;

pub use joint_transition::JointTransitionModelBuilder;
pub use kinematics::JointMap;
pub use model_set::ModelSet;
pub use sampling_blocks::{merge, resolve};
