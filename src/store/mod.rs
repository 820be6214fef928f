// Reference data: season projections and prior-season statistics, indexed
// by player name.
//
// Built once at startup from per-position tables and read-only afterward.
// Tables are concatenated in `Position::LOAD_ORDER`, and name lookups return
// the first row in that order.

pub mod tables;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, DataPaths};
use crate::position::Position;

pub use tables::{strip_team_suffix, TableRow};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A player's projected season, tagged with position and bye week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRecord {
    pub name: String,
    pub position: Position,
    pub team: String,
    pub projected_points: f64,
    /// `None` when the team has no entry in the bye-week table.
    pub bye_week: Option<u8>,
}

/// A player's prior-season production.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub name: String,
    pub position: Position,
    pub team: String,
    pub prior_points: f64,
}

/// Which reference table a lookup ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Projections,
    Statistics,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Projections => f.write_str("projections"),
            Table::Statistics => f.write_str("statistics"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("player '{name}' not found in {table}")]
    PlayerNotFound { name: String, table: Table },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// ReferenceStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    projections: Vec<ProjectionRecord>,
    statistics: Vec<StatisticsRecord>,
    projection_index: HashMap<String, Vec<usize>>,
    statistics_index: HashMap<String, Vec<usize>>,
}

impl ReferenceStore {
    /// Build the store from already-parsed per-position tables.
    ///
    /// Projection rows get their bye week from `bye_weeks[team]`; a team
    /// missing from the map leaves the bye week empty. Statistics rows are
    /// expected to be name-normalized already (see `tables`).
    pub fn from_tables(
        projections: Vec<(Position, Vec<TableRow>)>,
        statistics: Vec<(Position, Vec<TableRow>)>,
        bye_weeks: &HashMap<String, u8>,
    ) -> Self {
        let projections: Vec<ProjectionRecord> = projections
            .into_iter()
            .flat_map(|(position, rows)| {
                rows.into_iter().map(move |row| ProjectionRecord {
                    bye_week: bye_weeks.get(&row.team).copied(),
                    name: row.player,
                    position,
                    team: row.team,
                    projected_points: row.fpts,
                })
            })
            .collect();

        let statistics: Vec<StatisticsRecord> = statistics
            .into_iter()
            .flat_map(|(position, rows)| {
                rows.into_iter().map(move |row| StatisticsRecord {
                    name: row.player,
                    position,
                    team: row.team,
                    prior_points: row.fpts,
                })
            })
            .collect();

        let projection_index = build_index(Table::Projections, projections.iter().map(|r| &r.name));
        let statistics_index = build_index(Table::Statistics, statistics.iter().map(|r| &r.name));

        ReferenceStore {
            projections,
            statistics,
            projection_index,
            statistics_index,
        }
    }

    /// Load every configured projection and statistics CSV.
    pub fn load(config: &Config) -> Result<Self, LoadError> {
        Self::load_from_paths(&config.data_paths, &config.base_dir, &config.league.bye_weeks)
    }

    /// Load from explicit paths. Exposed for testing and flexibility.
    pub fn load_from_paths(
        paths: &DataPaths,
        base_dir: &Path,
        bye_weeks: &HashMap<String, u8>,
    ) -> Result<Self, LoadError> {
        let mut projections = Vec::with_capacity(Position::LOAD_ORDER.len());
        let mut statistics = Vec::with_capacity(Position::LOAD_ORDER.len());

        for pos in Position::LOAD_ORDER {
            let path = paths.projection_path(base_dir, pos).ok_or_else(|| {
                LoadError::Validation(format!("no projections file configured for {pos}"))
            })?;
            let rows = tables::load_projection_rows(&path)?;
            if rows.is_empty() {
                warn!("{} projections file {} produced zero rows", pos, path.display());
            }
            projections.push((pos, rows));

            let path = paths.statistics_path(base_dir, pos).ok_or_else(|| {
                LoadError::Validation(format!("no statistics file configured for {pos}"))
            })?;
            let rows = tables::load_statistics_rows(&path)?;
            if rows.is_empty() {
                warn!("{} statistics file {} produced zero rows", pos, path.display());
            }
            statistics.push((pos, rows));
        }

        let store = Self::from_tables(projections, statistics, bye_weeks);

        if store.projections.is_empty() {
            return Err(LoadError::Validation(
                "projection files produced zero valid rows".into(),
            ));
        }
        if store.statistics.is_empty() {
            return Err(LoadError::Validation(
                "statistics files produced zero valid rows".into(),
            ));
        }

        let unmapped = store
            .projections
            .iter()
            .filter(|r| r.bye_week.is_none())
            .count();
        if unmapped > 0 {
            warn!("{} projection rows have no bye week for their team", unmapped);
        }
        info!(
            "Reference store loaded: {} projections, {} statistics",
            store.projections.len(),
            store.statistics.len()
        );

        Ok(store)
    }

    /// First projection row whose name matches exactly.
    pub fn get_projection(&self, name: &str) -> Result<&ProjectionRecord, LookupError> {
        first_match(&self.projection_index, name)
            .map(|i| &self.projections[i])
            .ok_or_else(|| not_found(name, Table::Projections))
    }

    /// First statistics row whose name matches exactly.
    pub fn get_statistics(&self, name: &str) -> Result<&StatisticsRecord, LookupError> {
        first_match(&self.statistics_index, name)
            .map(|i| &self.statistics[i])
            .ok_or_else(|| not_found(name, Table::Statistics))
    }

    /// Projection lookup disambiguated by position.
    pub fn get_projection_at(
        &self,
        name: &str,
        position: Position,
    ) -> Result<&ProjectionRecord, LookupError> {
        self.projection_index
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.projections[i])
            .find(|r| r.position == position)
            .ok_or_else(|| not_found(name, Table::Projections))
    }

    /// Statistics lookup disambiguated by position.
    pub fn get_statistics_at(
        &self,
        name: &str,
        position: Position,
    ) -> Result<&StatisticsRecord, LookupError> {
        self.statistics_index
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.statistics[i])
            .find(|r| r.position == position)
            .ok_or_else(|| not_found(name, Table::Statistics))
    }

    pub fn contains_projection(&self, name: &str) -> bool {
        self.projection_index.contains_key(name)
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    pub fn statistics_count(&self) -> usize {
        self.statistics.len()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map each name to every row index carrying it, in table order.
fn build_index<'a>(
    table: Table,
    names: impl Iterator<Item = &'a String>,
) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, name) in names.enumerate() {
        index.entry(name.clone()).or_default().push(i);
    }
    for (name, rows) in &index {
        if rows.len() > 1 {
            warn!(
                "duplicate name '{}' appears {} times in {}; lookups return the first",
                name,
                rows.len(),
                table
            );
        }
    }
    index
}

fn first_match(index: &HashMap<String, Vec<usize>>, name: &str) -> Option<usize> {
    index.get(name).and_then(|rows| rows.first().copied())
}

fn not_found(name: &str, table: Table) -> LookupError {
    LookupError::PlayerNotFound {
        name: name.to_string(),
        table,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
