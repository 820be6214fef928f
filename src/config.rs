// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::position::Position;
use crate::roster::MAX_POSITION_COUNT;

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
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub weights: TradeWeights,
    pub data_paths: DataPaths,
    /// Directory the config was loaded from. Relative data paths resolve
    /// against it.
    pub base_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub season: u16,
    /// Target number of rostered players per position, keyed by
    /// abbreviation ("QB", "RB", ...).
    pub ideal_roster: HashMap<String, u32>,
    /// Team abbreviation -> bye week for the season.
    pub bye_weeks: HashMap<String, u8>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    weights: TradeWeights,
    data_paths: DataPaths,
}

/// Weights applied by the trade evaluator to each term of a player's value.
///
/// `bye_week_penalty` is added flat when the player's bye is still ahead;
/// `injury_risk` is scaled by the player's risk factor in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TradeWeights {
    pub projected_points: f64,
    pub prior_points: f64,
    pub bye_week_penalty: f64,
    pub injury_risk: f64,
    /// Applied to the projected term when a player has no prior production.
    pub rookie_multiplier: f64,
}

impl Default for TradeWeights {
    fn default() -> Self {
        TradeWeights {
            projected_points: 1.0,
            prior_points: 0.8,
            bye_week_penalty: -15.0,
            injury_risk: -50.0,
            rookie_multiplier: 2.0,
        }
    }
}

/// CSV locations for the per-position reference tables, keyed by position
/// abbreviation.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub projections: HashMap<String, String>,
    pub statistics: HashMap<String, String>,
}

impl DataPaths {
    /// Projection CSV for a position, resolved against `base_dir`.
    pub fn projection_path(&self, base_dir: &Path, pos: Position) -> Option<PathBuf> {
        lookup_path(&self.projections, base_dir, pos)
    }

    /// Statistics CSV for a position, resolved against `base_dir`.
    pub fn statistics_path(&self, base_dir: &Path, pos: Position) -> Option<PathBuf> {
        lookup_path(&self.statistics, base_dir, pos)
    }
}

fn lookup_path(
    table: &HashMap<String, String>,
    base_dir: &Path,
    pos: Position,
) -> Option<PathBuf> {
    table
        .iter()
        .find(|(key, _)| Position::from_str_pos(key) == Some(pos))
        .map(|(_, path)| base_dir.join(path))
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// This does not auto-copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        weights: strategy_file.weights,
        data_paths: strategy_file.data_paths,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Files `load_config_from` reads from `config/`.
const CONFIG_FILES: [&str; 2] = ["league.toml", "strategy.toml"];

/// Copy any of `CONFIG_FILES` missing from `config/` out of `defaults/`.
/// Existing files are never overwritten. Returns the files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        let source = defaults_dir.join(name);
        // A file missing from both places surfaces as FileNotFound on load.
        if target.exists() || !source.is_file() {
            continue;
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", config_dir.display()),
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        info!("Copied default {} into {}", name, config_dir.display());
        copied.push(target);
    }
    Ok(copied)
}

/// Load config relative to `base_dir`, copying default files first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validation_error(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

/// Every key must name a position and every position must be present.
fn validate_position_table<V>(
    section: &str,
    table: &HashMap<String, V>,
) -> Result<(), ConfigError> {
    for key in table.keys() {
        if Position::from_str_pos(key).is_none() {
            return Err(validation_error(
                format!("{section}.{key}"),
                "unknown position",
            ));
        }
    }
    for pos in Position::LOAD_ORDER {
        if !table.keys().any(|k| Position::from_str_pos(k) == Some(pos)) {
            return Err(validation_error(
                format!("{section}.{pos}"),
                "missing entry for position",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_position_table("league.ideal_roster", &config.league.ideal_roster)?;
    for (pos, &count) in &config.league.ideal_roster {
        if count > MAX_POSITION_COUNT {
            return Err(validation_error(
                format!("league.ideal_roster.{pos}"),
                format!("must be at most {MAX_POSITION_COUNT}, got {count}"),
            ));
        }
    }

    for (team, &week) in &config.league.bye_weeks {
        if !(1..=18).contains(&week) {
            return Err(validation_error(
                format!("league.bye_weeks.{team}"),
                format!("must be between 1 and 18, got {week}"),
            ));
        }
    }

    let w = &config.weights;
    let weight_fields: &[(&str, f64)] = &[
        ("weights.projected_points", w.projected_points),
        ("weights.prior_points", w.prior_points),
        ("weights.bye_week_penalty", w.bye_week_penalty),
        ("weights.injury_risk", w.injury_risk),
        ("weights.rookie_multiplier", w.rookie_multiplier),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() {
            return Err(validation_error(*name, format!("must be finite, got {val}")));
        }
    }
    if w.rookie_multiplier <= 0.0 {
        return Err(validation_error(
            "weights.rookie_multiplier",
            format!("must be > 0, got {}", w.rookie_multiplier),
        ));
    }

    validate_position_table("data_paths.projections", &config.data_paths.projections)?;
    validate_position_table("data_paths.statistics", &config.data_paths.statistics)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
