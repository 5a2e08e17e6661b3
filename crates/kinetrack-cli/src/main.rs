//! `kinetrack-cli` – command line front-end for the tracker models.
//!
//! The binary loads a tracker configuration, builds every model from it and
//! reports what it built.  Subcommands:
//!
//! 1. `check <config>` validates the file, assembles the [`ModelSet`] and
//!    prints the joint models and the resolved sampling schedule.
//! 2. `schema` prints the JSON schema of the configuration file.
//! 3. `propagate <config>` pushes a seeded particle cloud through the models
//!    and prints the resulting spread.

mod config;
mod propagate;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use kinetrack_builder::{JointMap, ModelSet};
use kinetrack_types::TrackerConfig;
use nalgebra::DVector;
use tracing::info;

use crate::propagate::{PropagateOptions, propagate};

#[derive(Parser, Debug)]
#[command(name = "kinetrack")]
#[command(about = "Build and inspect articulated-object tracker models", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration and print the assembled models
    Check {
        /// Path to the tracker TOML file
        config: PathBuf,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// Propagate a particle cloud through the configured models
    Propagate {
        /// Path to the tracker TOML file
        config: PathBuf,

        /// Number of particles
        #[arg(long, default_value = "1000")]
        particles: usize,

        /// Number of propagation steps
        #[arg(long, default_value = "10")]
        steps: usize,

        /// Elapsed time per step in seconds
        #[arg(long, default_value = "0.033")]
        dt: f64,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info").  KINETRACK_LOG_FORMAT=json
    // switches to newline-delimited JSON; user-facing output stays on stdout.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("KINETRACK_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let args = Args::parse();
    let result = match args.command {
        Command::Check { config } => run_check(&config),
        Command::Schema => run_schema(),
        Command::Propagate {
            config,
            particles,
            steps,
            dt,
            seed,
        } => run_propagate(
            &config,
            &PropagateOptions {
                particles,
                steps,
                delta_time: dt,
                seed,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

fn run_check(path: &Path) -> Result<(), String> {
    let (cfg, _, models) = load_models(path)?;

    println!();
    println!("  {} {}", "Config".bold(), path.display().to_string().dimmed());
    println!("  {}", "Joint models".bold().cyan());
    for (name, (model, sigma)) in cfg.joints.iter().zip(
        models
            .joint_models
            .iter()
            .zip(&cfg.joint_transition.joint_sigmas),
    ) {
        println!(
            "    • {:<20} sigma {:<8} variance {:.6}",
            name,
            sigma,
            model.covariance()[(0, 0)]
        );
    }

    println!("  {}", "Sampling schedule".bold().cyan());
    let definition = kinetrack_builder::model_set::schedule_definition(&cfg);
    for (group, block) in definition.iter().zip(&models.sampling_blocks) {
        println!("    • {:<20} {:?}", group.name, block);
    }

    let occlusion = models.occlusion.mean_model();
    println!("  {}", "Occlusion".bold().cyan());
    println!(
        "    p_ov {}  p_oo {}  sigma {}  steady state {}",
        occlusion.p_occluded_visible(),
        occlusion.p_occluded_occluded(),
        models.occlusion.sigma(),
        occlusion
            .steady_state()
            .map_or_else(|| "none".to_string(), |p| format!("{p:.4}"))
    );

    if let Some(pose) = &models.pose_process {
        println!("  {}", "Pose process".bold().cyan());
        println!(
            "    damping {}  dimension {}",
            pose.damping(),
            pose.dimension()
        );
    }

    println!();
    println!("  {} configuration is valid", "✓".green().bold());
    Ok(())
}

fn run_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(TrackerConfig);
    let raw = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("Failed to serialize schema: {}", e))?;
    println!("{raw}");
    Ok(())
}

fn run_propagate(path: &Path, options: &PropagateOptions) -> Result<(), String> {
    let (_, joints, models) = load_models(path)?;
    info!(
        particles = options.particles,
        steps = options.steps,
        dt = options.delta_time,
        seed = options.seed,
        "propagating particle cloud"
    );
    let summary = propagate(&models, options).map_err(|e| e.to_string())?;

    println!();
    println!(
        "  {} {} particles × {} steps (dt {})",
        "Propagated".bold(),
        options.particles,
        options.steps,
        options.delta_time
    );
    let means = DVector::from_iterator(summary.joints.len(), summary.joints.iter().map(|j| j.0));
    let stds = DVector::from_iterator(summary.joints.len(), summary.joints.iter().map(|j| j.1));
    let means = joints.joint_positions(&means).map_err(|e| e.to_string())?;
    let stds = joints.joint_positions(&stds).map_err(|e| e.to_string())?;
    for (name, mean) in &means {
        println!("    • {:<20} mean {:>9.5}  std {:>9.5}", name, mean, stds[name]);
    }
    println!(
        "    • {:<20} {:.4}",
        "occlusion (mean p)",
        summary.mean_occlusion_probability
    );
    if let Some(pose_std) = &summary.pose_std {
        println!("    • {:<20} {:?}", "pose std", pose_std);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_models(path: &Path) -> Result<(TrackerConfig, JointMap, ModelSet), String> {
    let cfg = config::load_from(path)?;
    let joints = JointMap::new(cfg.joints.iter().cloned()).map_err(|e| e.to_string())?;
    let models = ModelSet::from_config(&cfg, &joints).map_err(|e| e.to_string())?;
    Ok((cfg, joints, models))
}
