// Configuration loading and parsing (config/squad.toml).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level configuration assembled from squad.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roster: RosterRules,
    pub model: ModelParams,
    /// Scoring profiles, keyed by name. BTreeMap keeps profile iteration
    /// order deterministic across runs.
    pub profiles: BTreeMap<String, Profile>,
}

/// Hard constraints on the roster search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    pub budget: u32,
    pub roster_size: usize,
    pub max_per_team: usize,
    pub top_candidates: usize,
}

/// Parameters of the win-probability and strength models.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Elo sensitivity: larger scale means rating gaps matter less.
    pub elo_scale: f64,
    pub points_weight_a: f64,
    pub points_weight_b: f64,
}

/// A scoring profile: popularity penalty strength plus the weights of the
/// diagnostic heuristic score.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Popularity penalty strength (lambda in `1 - pick_rate * lambda`).
    pub lambda: f64,
    pub w_rating: f64,
    pub w_power: f64,
    pub w_winprob: f64,
    pub w_seed: f64,
    pub pick_penalty: f64,
    /// Seeds at or below this value count as "high seed" for the bonus term.
    pub high_seed_cutoff: u32,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            budget: 1000,
            roster_size: 5,
            max_per_team: 2,
            top_candidates: 10,
        }
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            elo_scale: 400.0,
            points_weight_a: 0.5,
            points_weight_b: 0.5,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            lambda: 0.5,
            w_rating: 0.4,
            w_power: 0.25,
            w_winprob: 0.25,
            w_seed: 0.1,
            pick_penalty: 0.2,
            high_seed_cutoff: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("balanced".to_string(), Profile::default());
        profiles.insert(
            "contrarian".to_string(),
            Profile {
                lambda: 1.0,
                w_rating: 0.35,
                w_power: 0.2,
                w_winprob: 0.2,
                w_seed: 0.05,
                pick_penalty: 0.5,
                high_seed_cutoff: 4,
            },
        );
        Self {
            roster: RosterRules::default(),
            model: ModelParams::default(),
            profiles,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/squad.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization
/// automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("squad.toml");
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;

    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure config files exist by copying missing `.toml` files from
/// `defaults/`. Returns the list of files that were copied. Existing files
/// in `config/` are never overwritten; `.example` templates are skipped.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".toml") || name.ends_with(".example") {
            continue;
        }

        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", path.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying defaults first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let roster = &config.roster;
    let roster_fields: &[(&str, usize)] = &[
        ("roster.roster_size", roster.roster_size),
        ("roster.max_per_team", roster.max_per_team),
        ("roster.top_candidates", roster.top_candidates),
    ];
    for (name, val) in roster_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }
    if roster.budget == 0 {
        return Err(ConfigError::ValidationError {
            field: "roster.budget".into(),
            message: "must be > 0".into(),
        });
    }

    let model = &config.model;
    if model.elo_scale <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "model.elo_scale".into(),
            message: format!("must be > 0, got {}", model.elo_scale),
        });
    }
    if model.points_weight_a < 0.0 || model.points_weight_b < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "model.points_weight_a/points_weight_b".into(),
            message: "must be >= 0".into(),
        });
    }
    if model.points_weight_a + model.points_weight_b <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "model.points_weight_a/points_weight_b".into(),
            message: "at least one weight must be > 0".into(),
        });
    }

    if config.profiles.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "profiles".into(),
            message: "at least one scoring profile is required".into(),
        });
    }
    for (name, profile) in &config.profiles {
        let weight_fields: &[(&str, f64)] = &[
            ("lambda", profile.lambda),
            ("w_rating", profile.w_rating),
            ("w_power", profile.w_power),
            ("w_winprob", profile.w_winprob),
            ("w_seed", profile.w_seed),
            ("pick_penalty", profile.pick_penalty),
        ];
        for (field, val) in weight_fields {
            if *val < 0.0 || !val.is_finite() {
                return Err(ConfigError::ValidationError {
                    field: format!("profiles.{name}.{field}"),
                    message: format!("must be a finite value >= 0, got {val}"),
                });
            }
        }
        if profile.high_seed_cutoff == 0 {
            return Err(ConfigError::ValidationError {
                field: format!("profiles.{name}.high_seed_cutoff"),
                message: "must be >= 1".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
