//! Open-loop particle propagation through the assembled models.
//!
//! No measurements are involved: every particle starts from the zero joint
//! state and the configured initial occlusion score, and is pushed through
//! the transition models one sampling block at a time.  The resulting spread
//! shows what the configured noise does to a cloud before any observation
//! pulls it back.

use kinetrack_builder::ModelSet;
use kinetrack_types::Result;
use nalgebra::DVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

/// Propagation settings from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagateOptions {
    pub particles: usize,
    pub steps: usize,
    pub delta_time: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct Particle {
    joints: DVector<f64>,
    occlusion_score: f64,
    pose: Option<DVector<f64>>,
}

/// Sample statistics of the cloud after propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudSummary {
    /// `(mean, std)` of each joint, in joint index order.
    pub joints: Vec<(f64, f64)>,
    pub mean_occlusion_probability: f64,
    /// Per-dimension standard deviation of the pose process, if configured.
    pub pose_std: Option<Vec<f64>>,
}

/// Propagate a particle cloud for `options.steps` steps.
///
/// Joints outside every sampling block are never resampled and keep their
/// initial value.
pub fn propagate(models: &ModelSet, options: &PropagateOptions) -> Result<CloudSummary> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let joint_count = models.joint_models.len();
    let pose_dimension = models.pose_process.as_ref().map(|p| p.dimension());

    let mut cloud: Vec<Particle> = (0..options.particles)
        .map(|_| Particle {
            joints: DVector::zeros(joint_count),
            occlusion_score: models.initial_occlusion_score,
            pose: pose_dimension.map(DVector::zeros),
        })
        .collect();

    let zero = DVector::zeros(1);
    for step in 0..options.steps {
        for block in &models.sampling_blocks {
            for &joint in block {
                let model = &models.joint_models[joint];
                for particle in &mut cloud {
                    let state = DVector::from_element(1, particle.joints[joint]);
                    let w: f64 = StandardNormal.sample(&mut rng);
                    let noise = DVector::from_element(1, w);
                    particle.joints[joint] = model.state(&state, &noise, &zero)?[0];
                }
            }
        }

        for particle in &mut cloud {
            let distribution = models
                .occlusion
                .condition(options.delta_time, particle.occlusion_score)?;
            let z: f64 = StandardNormal.sample(&mut rng);
            particle.occlusion_score = distribution.map_standard_normal(z);

            if let (Some(process), Some(pose)) = (&models.pose_process, &mut particle.pose) {
                let sample: DVector<f64> =
                    DVector::from_fn(pose.len(), |_, _| StandardNormal.sample(&mut rng));
                let input = DVector::zeros(pose.len());
                *pose = process.map_gaussian(options.delta_time, pose, &input, &sample)?;
            }
        }
        debug!(step, particles = cloud.len(), "propagated cloud");
    }

    Ok(summarize(&cloud, joint_count))
}

fn summarize(cloud: &[Particle], joint_count: usize) -> CloudSummary {
    let joints = (0..joint_count)
        .map(|j| mean_and_std(cloud.iter().map(|p| p.joints[j])))
        .collect();
    let (mean_occlusion_probability, _) = mean_and_std(
        cloud
            .iter()
            .map(|p| kinetrack_models::sigmoid(p.occlusion_score)),
    );
    let pose_std = cloud.first().and_then(|p| p.pose.as_ref()).map(|first| {
        (0..first.len())
            .map(|d| {
                mean_and_std(cloud.iter().filter_map(|p| p.pose.as_ref().map(|x| x[d]))).1
            })
            .collect()
    });
    CloudSummary {
        joints,
        mean_occlusion_probability,
        pose_std,
    }
}

fn mean_and_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use kinetrack_builder::JointMap;
    use kinetrack_types::TrackerConfig;

    const CONFIG: &str = r#"
joints = ["a", "b", "c"]

[joint_transition]
joint_sigmas = [0.1, 0.0, 0.3]

[pose_process]
damping = 0.5
noise_sigmas = [0.2]

[[sampling_blocks]]
name = "ab"
joints = ["a", "b"]
"#;

    fn models() -> ModelSet {
        let config: TrackerConfig = toml::from_str(CONFIG).unwrap();
        let joints = JointMap::new(config.joints.clone()).unwrap();
        ModelSet::from_config(&config, &joints).unwrap()
    }

    fn options(seed: u64) -> PropagateOptions {
        PropagateOptions {
            particles: 4000,
            steps: 9,
            delta_time: 0.1,
            seed,
        }
    }

    #[test]
    fn same_seed_gives_same_cloud() {
        let m = models();
        assert_eq!(propagate(&m, &options(3)).unwrap(), propagate(&m, &options(3)).unwrap());
    }

    #[test]
    fn joint_spread_follows_random_walk() {
        let summary = propagate(&models(), &options(11)).unwrap();
        // Nine unit steps of sigma 0.1 give a std of 0.3.
        let (mean, std) = summary.joints[0];
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.02);
        assert_abs_diff_eq!(std, 0.3, epsilon = 0.02);
    }

    #[test]
    fn zero_sigma_and_unscheduled_joints_stay_put() {
        let summary = propagate(&models(), &options(5)).unwrap();
        assert_eq!(summary.joints[1], (0.0, 0.0));
        // "c" is in no sampling block.
        assert_eq!(summary.joints[2], (0.0, 0.0));
    }

    #[test]
    fn occlusion_probability_stays_in_unit_interval() {
        let summary = propagate(&models(), &options(9)).unwrap();
        assert!((0.0..=1.0).contains(&summary.mean_occlusion_probability));
        let pose_std = summary.pose_std.unwrap();
        assert_eq!(pose_std.len(), 1);
        assert!(pose_std[0] > 0.0);
    }

    #[test]
    fn empty_cloud_summarises_to_zeros() {
        let mut opts = options(1);
        opts.particles = 0;
        let summary = propagate(&models(), &opts).unwrap();
        assert_eq!(summary.joints, vec![(0.0, 0.0); 3]);
        assert!(summary.pose_std.is_none());
    }
}
