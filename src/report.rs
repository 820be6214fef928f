// Trade report assembly and rendering.

use std::io::{self, Write};

use serde::Serialize;

use crate::evaluator::{InjuryRisks, PlayerValue, TradeEvaluator, TradeValue};
use crate::roster::{PositionReport, Roster};
use crate::store::{LookupError, ReferenceStore};

/// Everything the user sees after entering a trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeReport {
    pub current_week: u8,
    pub acquired: Vec<PlayerValue>,
    pub departed: Vec<PlayerValue>,
    pub value: TradeValue,
    pub favorable: bool,
    pub roster: Vec<PositionReport>,
}

/// One side of a trade as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct TradeSide {
    pub players: Vec<String>,
    pub risks: InjuryRisks,
}

impl TradeReport {
    /// Evaluate the trade, then apply it to `roster`.
    ///
    /// The roster is only touched once both sides have been valued, so a
    /// missing player leaves it as it was.
    pub fn build(
        evaluator: &TradeEvaluator<'_>,
        store: &ReferenceStore,
        roster: &mut Roster,
        acquired: &TradeSide,
        departed: &TradeSide,
    ) -> Result<Self, LookupError> {
        let acquired_values = evaluator.breakdown_side(&acquired.players, &acquired.risks)?;
        let departed_values = evaluator.breakdown_side(&departed.players, &departed.risks)?;
        let value = TradeValue::from_breakdowns(&acquired_values, &departed_values);

        roster.apply_trade(&acquired.players, &departed.players, store)?;

        Ok(TradeReport {
            current_week: evaluator.current_week(),
            acquired: acquired_values,
            departed: departed_values,
            value,
            favorable: value.is_favorable(),
            roster: roster.report(),
        })
    }

    pub fn verdict(&self) -> &'static str {
        if self.favorable {
            "Based off of projected points for this year, points scored last year, bye weeks, \
             and injury risk this trade may be beneficial for you!"
        } else {
            "Based off of projected points for this year, points scored last year, bye weeks, \
             and injury risk you may want to reconsider this trade."
        }
    }
}

/// Plain-text rendering for the terminal.
pub fn render<W: Write>(report: &TradeReport, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "New Roster Configuration:")?;
    for line in &report.roster {
        writeln!(out, "{}: {}", line.position, line.current)?;
        if let Some(msg) = line.delta.message(line.position) {
            writeln!(out, "{msg}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Player values (week {}):", report.current_week)?;
    for (label, side) in [("+", &report.acquired), ("-", &report.departed)] {
        for player in side {
            let rookie = if player.rookie { " (no prior points)" } else { "" };
            writeln!(out, "  {label} {}: {:.1}{rookie}", player.name, player.total)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Value of players you're getting: {:.1}", report.value.acquired)?;
    writeln!(out, "Value of players you're giving away: {:.1}", report.value.departed)?;
    writeln!(out, "{}", report.verdict())?;
    Ok(())
}

/// JSON rendering for scripting.
pub fn render_json<W: Write>(report: &TradeReport, out: &mut W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out).map_err(serde_json::Error::io)
}
