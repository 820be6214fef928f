// CSV reading for FantasyPros-style projection and statistics exports.
//
// Both table kinds share the columns the evaluator needs: `Player`, `Team`
// and `FPTS`. Every other column is ignored.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use super::LoadError;

/// One parsed row of a per-position table, before it is tagged with a
/// position and attached to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub player: String,
    pub team: String,
    pub fpts: f64,
}

impl TableRow {
    pub fn new(player: &str, team: &str, fpts: f64) -> Self {
        TableRow {
            player: player.to_string(),
            team: team.to_string(),
            fpts,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// FPTS is read as text because exports format large totals with thousands
/// separators ("1,204.5").
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRow {
    Player: String,
    #[serde(default)]
    Team: String,
    FPTS: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a points cell, tolerating thousands separators. Returns `None` for
/// blank, malformed or non-finite values.
pub(crate) fn parse_points(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Remove a trailing team abbreviation such as `" (KC)"` from a statistics
/// name. Only a single whitespace character followed by one or more ASCII
/// uppercase letters in parentheses at the very end is stripped; anything
/// else is returned unchanged.
pub fn strip_team_suffix(name: &str) -> &str {
    let Some(body) = name.strip_suffix(')') else {
        return name;
    };
    let Some(open) = body.rfind('(') else {
        return name;
    };
    let abbrev = &body[open + 1..];
    if abbrev.is_empty() || !abbrev.chars().all(|c| c.is_ascii_uppercase()) {
        return name;
    }
    let before = &body[..open];
    match before.chars().next_back() {
        Some(ws) if ws.is_whitespace() => &before[..before.len() - ws.len_utf8()],
        _ => name,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

fn read_rows<R: Read>(rdr: R) -> Result<Vec<TableRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawRow>() {
        match result {
            Ok(raw) => {
                let player = raw.Player.trim();
                if player.is_empty() {
                    debug!("skipping row with empty Player cell");
                    continue;
                }
                let Some(fpts) = parse_points(&raw.FPTS) else {
                    warn!("skipping '{}': unparseable FPTS value '{}'", player, raw.FPTS);
                    continue;
                };
                rows.push(TableRow {
                    player: player.to_string(),
                    team: raw.Team.trim().to_string(),
                    fpts,
                });
            }
            Err(e) => {
                warn!("skipping malformed row: {}", e);
            }
        }
    }
    Ok(rows)
}

/// Read projection rows. Names are kept as written (trimmed).
pub fn projection_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<TableRow>, csv::Error> {
    read_rows(rdr)
}

/// Read statistics rows, stripping team suffixes from player names so they
/// line up with projection names.
pub fn statistics_rows_from_reader<R: Read>(rdr: R) -> Result<Vec<TableRow>, csv::Error> {
    let mut rows = read_rows(rdr)?;
    for row in &mut rows {
        let stripped = strip_team_suffix(&row.player);
        if stripped.len() != row.player.len() {
            row.player = stripped.to_string();
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a projections CSV file.
pub fn load_projection_rows(path: &Path) -> Result<Vec<TableRow>, LoadError> {
    projection_rows_from_reader(open(path)?).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a statistics CSV file.
pub fn load_statistics_rows(path: &Path) -> Result<Vec<TableRow>, LoadError> {
    statistics_rows_from_reader(open(path)?).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
