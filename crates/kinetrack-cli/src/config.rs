//! Tracker configuration loading – reads a TOML file and applies
//! `KINETRACK_*` environment overrides.

use std::fs;
use std::path::Path;

use kinetrack_types::TrackerConfig;

/// Load the config from `path`, then apply environment overrides.
pub fn load_from(path: &Path) -> Result<TrackerConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: TrackerConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `KINETRACK_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `KINETRACK_EVALUATION_COUNT` | `tracker.evaluation_count` |
/// | `KINETRACK_MAX_KL_DIVERGENCE` | `tracker.max_kl_divergence` |
/// | `KINETRACK_OCCLUSION_SIGMA` | `occlusion.sigma` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut TrackerConfig) {
    if let Ok(v) = std::env::var("KINETRACK_EVALUATION_COUNT")
        && let Ok(count) = v.parse::<usize>()
    {
        cfg.tracker.evaluation_count = count;
    }
    if let Ok(v) = std::env::var("KINETRACK_MAX_KL_DIVERGENCE")
        && let Ok(kl) = v.parse::<f64>()
    {
        cfg.tracker.max_kl_divergence = kl;
    }
    if let Ok(v) = std::env::var("KINETRACK_OCCLUSION_SIGMA")
        && let Ok(sigma) = v.parse::<f64>()
    {
        cfg.occlusion.sigma = sigma;
    }
}
