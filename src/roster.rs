// Roster composition tracking against an ideal position distribution.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::position::Position;
use crate::store::{LookupError, ReferenceStore};

/// Largest per-position count accepted from config or the prompt.
pub const MAX_POSITION_COUNT: u32 = 255;

/// Target number of rostered players per position. Informational only;
/// nothing is rejected for exceeding or missing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdealRoster {
    counts: HashMap<Position, u32>,
}

impl Default for IdealRoster {
    /// QB:2, RB:4, WR:6, TE:1, DST:2, K:1.
    fn default() -> Self {
        let counts = [
            (Position::Quarterback, 2),
            (Position::RunningBack, 4),
            (Position::WideReceiver, 6),
            (Position::TightEnd, 1),
            (Position::Defense, 2),
            (Position::Kicker, 1),
        ]
        .into_iter()
        .collect();
        IdealRoster { counts }
    }
}

impl IdealRoster {
    /// Build from the `[league.ideal_roster]` table. Unknown keys are
    /// ignored and missing positions target zero.
    pub fn from_config(roster_config: &HashMap<String, u32>) -> Self {
        let mut counts = HashMap::new();
        for (pos_str, &count) in roster_config {
            if let Some(pos) = Position::from_str_pos(pos_str) {
                counts.insert(pos, count);
            }
        }
        IdealRoster { counts }
    }

    pub fn get(&self, pos: Position) -> u32 {
        self.counts.get(&pos).copied().unwrap_or(0)
    }
}

/// How a position's count compares with its ideal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum RosterDelta {
    Surplus(u32),
    Shortfall(u32),
    Balanced,
}

impl RosterDelta {
    /// Counts past `u32::MAX` in either direction saturate.
    pub fn between(current: i32, ideal: u32) -> Self {
        let diff = i64::from(current) - i64::from(ideal);
        let magnitude = u32::try_from(diff.unsigned_abs()).unwrap_or(u32::MAX);
        if diff > 0 {
            RosterDelta::Surplus(magnitude)
        } else if diff < 0 {
            RosterDelta::Shortfall(magnitude)
        } else {
            RosterDelta::Balanced
        }
    }

    /// Feedback line for this delta, or `None` when balanced.
    pub fn message(&self, pos: Position) -> Option<String> {
        match self {
            RosterDelta::Surplus(n) => Some(format!("You will have {n} more {pos} than ideal.")),
            RosterDelta::Shortfall(n) => {
                Some(format!("You will have {n} fewer {pos} than ideal."))
            }
            RosterDelta::Balanced => None,
        }
    }
}

/// One line of the roster report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    pub position: Position,
    pub current: i32,
    pub ideal: u32,
    pub delta: RosterDelta,
}

/// The user's current per-position player counts.
#[derive(Debug, Clone)]
pub struct Roster {
    counts: HashMap<Position, i32>,
    ideal: IdealRoster,
}

impl Roster {
    /// Empty roster: every position starts at zero.
    pub fn new(ideal: IdealRoster) -> Self {
        let counts = Position::DISPLAY_ORDER.iter().map(|&p| (p, 0)).collect();
        Roster { counts, ideal }
    }

    pub fn count(&self, pos: Position) -> i32 {
        self.counts.get(&pos).copied().unwrap_or(0)
    }

    /// Overwrite one position's count. Not checked against the ideal.
    pub fn set_count(&mut self, pos: Position, count: i32) {
        self.counts.insert(pos, count);
    }

    /// Overwrite the counts for every position in `counts`.
    pub fn set_current_counts(&mut self, counts: &HashMap<Position, i32>) {
        for (&pos, &count) in counts {
            self.set_count(pos, count);
        }
    }

    /// Apply the net position change of a trade.
    ///
    /// Every name is resolved against the projections table before any
    /// count changes, so a missing player leaves the roster untouched.
    /// Counts saturate at the `i32` bounds.
    pub fn apply_trade<S: AsRef<str>>(
        &mut self,
        acquired: &[S],
        departed: &[S],
        store: &ReferenceStore,
    ) -> Result<(), LookupError> {
        let incoming = resolve_positions(acquired, store)?;
        let outgoing = resolve_positions(departed, store)?;

        for pos in incoming {
            let count = self.counts.entry(pos).or_insert(0);
            *count = count.saturating_add(1);
        }
        for pos in outgoing {
            let count = self.counts.entry(pos).or_insert(0);
            *count = count.saturating_sub(1);
        }
        debug!("roster after trade: {:?}", self.counts);
        Ok(())
    }

    /// Current vs. ideal for every position, in display order.
    pub fn report(&self) -> Vec<PositionReport> {
        Position::DISPLAY_ORDER
            .iter()
            .map(|&position| {
                let current = self.count(position);
                let ideal = self.ideal.get(position);
                PositionReport {
                    position,
                    current,
                    ideal,
                    delta: RosterDelta::between(current, ideal),
                }
            })
            .collect()
    }
}

fn resolve_positions<S: AsRef<str>>(
    names: &[S],
    store: &ReferenceStore,
) -> Result<Vec<Position>, LookupError> {
    names
        .iter()
        .map(|name| store.get_projection(name.as_ref()).map(|rec| rec.position))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
