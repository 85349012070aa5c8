// Tabular record ingestion: player pool, booster tables, role tables.
//
// Player rows with a malformed or missing required field abort the run; bad
// values in optional columns are logged and defaulted instead.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One fantasy-pool player as read from the input table.
///
/// Optional numeric columns default to 0 before any computation; `seed` and
/// `first_opponent_seed` stay `None` when absent.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub team: String,
    pub cost: u32,
    pub rating: f64,
    pub team_rank: u32,
    pub points_a: f64,
    pub points_b: f64,
    /// Fraction of users who picked this player, in [0, 1].
    pub pick_rate: f64,
    pub seed: Option<u32>,
    pub first_opponent_seed: Option<u32>,
}

/// Per-agent success percentages for exclusive boosters.
///
/// Rows are boosters, columns are agents; cell values are percentages.
#[derive(Debug, Clone)]
pub struct BoosterTable {
    pub agents: Vec<String>,
    pub resources: Vec<String>,
    pub percents: Vec<Vec<f64>>,
}

/// Per-agent (big win, small win) percentage pairs for exclusive roles.
#[derive(Debug, Clone)]
pub struct RoleTable {
    pub agents: Vec<String>,
    pub resources: Vec<String>,
    pub percents: Vec<Vec<(f64, f64)>>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("malformed record at row {row}: {message}")]
    Row { row: usize, message: String },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Raw player row. Extra columns are silently absorbed via `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawPlayer {
    #[serde(alias = "player")]
    name: String,
    #[serde(alias = "squad")]
    team: String,
    #[serde(alias = "price")]
    cost: u32,
    rating: f64,
    #[serde(alias = "team_ranking")]
    team_rank: u32,
    #[serde(default)]
    points_a: Option<f64>,
    #[serde(default)]
    points_b: Option<f64>,
    #[serde(default)]
    pick_rate: Option<f64>,
    #[serde(default)]
    seed: Option<u32>,
    #[serde(default)]
    first_opponent_seed: Option<u32>,
    /// Absorb any extra columns the provider includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Default an optional numeric column, warning on non-finite values.
fn optional_value(name: &str, column: &str, value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        Some(_) => {
            warn!("player '{name}': non-finite {column}, defaulting to 0");
            0.0
        }
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, IngestError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for (i, result) in reader.deserialize::<RawPlayer>().enumerate() {
        // Row 1 is the header line.
        let row = i + 2;
        let raw = result.map_err(|e| IngestError::Row {
            row,
            message: e.to_string(),
        })?;

        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(IngestError::Row {
                row,
                message: "empty player name".into(),
            });
        }
        if !raw.rating.is_finite() {
            return Err(IngestError::Row {
                row,
                message: format!("non-finite rating for '{name}'"),
            });
        }
        if raw.team_rank == 0 {
            return Err(IngestError::Row {
                row,
                message: format!("team_rank must be >= 1 for '{name}'"),
            });
        }

        let mut pick_rate = optional_value(&name, "pick_rate", raw.pick_rate);
        if !(0.0..=1.0).contains(&pick_rate) {
            warn!("player '{name}': pick_rate {pick_rate} outside [0, 1], clamping");
            pick_rate = pick_rate.clamp(0.0, 1.0);
        }

        players.push(Player {
            points_a: optional_value(&name, "points_a", raw.points_a),
            points_b: optional_value(&name, "points_b", raw.points_b),
            pick_rate,
            name,
            team: raw.team.trim().to_string(),
            cost: raw.cost,
            rating: raw.rating,
            team_rank: raw.team_rank,
            seed: raw.seed,
            first_opponent_seed: raw.first_opponent_seed,
        });
    }

    if players.is_empty() {
        return Err(IngestError::Validation(
            "player CSV produced zero rows".into(),
        ));
    }

    Ok(players)
}

/// Read a wide matrix CSV: first header cell labels the resource column, the
/// remaining header cells name the agents; each data row is a resource name
/// followed by one cell per agent.
fn load_matrix_from_reader<R: Read>(
    rdr: R,
) -> Result<(Vec<String>, Vec<(String, Vec<String>)>), IngestError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| IngestError::Row {
            row: 1,
            message: e.to_string(),
        })?
        .clone();
    if headers.len() < 2 {
        return Err(IngestError::Validation(
            "matrix CSV needs a name column plus at least one agent column".into(),
        ));
    }
    let agents: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = result.map_err(|e| IngestError::Row {
            row,
            message: e.to_string(),
        })?;
        if record.len() != headers.len() {
            return Err(IngestError::Row {
                row,
                message: format!(
                    "expected {} cells, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }
        let name = record
            .get(0)
            .unwrap_or_default()
            .trim()
            .to_string();
        let cells = record
            .iter()
            .skip(1)
            .map(|c| c.trim().to_string())
            .collect();
        rows.push((name, cells));
    }

    if rows.is_empty() {
        return Err(IngestError::Validation("matrix CSV produced zero rows".into()));
    }

    Ok((agents, rows))
}

fn load_boosters_from_reader<R: Read>(rdr: R) -> Result<BoosterTable, IngestError> {
    let (agents, rows) = load_matrix_from_reader(rdr)?;
    let mut resources = Vec::with_capacity(rows.len());
    let mut percents = Vec::with_capacity(rows.len());
    for (i, (name, cells)) in rows.into_iter().enumerate() {
        let row = i + 2;
        let values = cells
            .iter()
            .map(|c| c.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| IngestError::Row {
                row,
                message: format!("booster '{name}': {e}"),
            })?;
        resources.push(name);
        percents.push(values);
    }
    Ok(BoosterTable {
        agents,
        resources,
        percents,
    })
}

fn load_roles_from_reader<R: Read>(rdr: R) -> Result<RoleTable, IngestError> {
    let (agents, rows) = load_matrix_from_reader(rdr)?;
    let mut resources = Vec::with_capacity(rows.len());
    let mut percents = Vec::with_capacity(rows.len());
    for (i, (name, cells)) in rows.into_iter().enumerate() {
        let row = i + 2;
        let mut pairs = Vec::with_capacity(cells.len());
        for cell in &cells {
            // Cells hold "big/small" percentage pairs, e.g. "40/25".
            let (big, small) = cell.split_once('/').ok_or_else(|| IngestError::Row {
                row,
                message: format!("role '{name}': expected big/small pair, got '{cell}'"),
            })?;
            let parse = |s: &str| {
                s.trim().parse::<f64>().map_err(|e| IngestError::Row {
                    row,
                    message: format!("role '{name}': {e}"),
                })
            };
            pairs.push((parse(big)?, parse(small)?));
        }
        resources.push(name);
        percents.push(pairs);
    }
    Ok(RoleTable {
        agents,
        resources,
        percents,
    })
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the player pool from a CSV file.
pub fn load_players(path: &Path) -> Result<Vec<Player>, IngestError> {
    load_players_from_reader(open(path)?)
}

/// Load a booster percentage table from a CSV file.
pub fn load_boosters(path: &Path) -> Result<BoosterTable, IngestError> {
    load_boosters_from_reader(open(path)?)
}

/// Load a role big/small percentage table from a CSV file.
pub fn load_roles(path: &Path) -> Result<RoleTable, IngestError> {
    load_roles_from_reader(open(path)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
