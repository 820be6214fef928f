// Interactive trade entry.
//
// Prompts for the current week, the user's roster counts and both sides of
// the trade, re-asking until each answer validates. Input and output are
// generic so the whole conversation can be driven from a byte slice in tests.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::evaluator::{InjuryRisks, TradeEvaluator};
use crate::input::{self, InputError};
use crate::position::Position;
use crate::report::{TradeReport, TradeSide};
use crate::roster::{IdealRoster, Roster};
use crate::store::{LookupError, ReferenceStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("input ended before the trade was complete")]
    InputClosed,

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub struct Session<'s, R, W> {
    store: &'s ReferenceStore,
    input: R,
    output: W,
}

impl<'s, R: BufRead, W: Write> Session<'s, R, W> {
    pub fn new(store: &'s ReferenceStore, input: R, output: W) -> Self {
        Session {
            store,
            input,
            output,
        }
    }

    /// Run the whole conversation and produce the report. `week` skips the
    /// week prompt when already known.
    pub fn run(&mut self, config: &Config, week: Option<u8>) -> Result<TradeReport, SessionError> {
        let current_week = match week {
            Some(w) => w,
            None => self.prompt_week()?,
        };
        let evaluator = TradeEvaluator::with_weights(self.store, current_week, config.weights);
        let mut roster = self.prompt_roster(IdealRoster::from_config(&config.league.ideal_roster))?;

        let mut taken = HashSet::new();
        writeln!(self.output, "\nEnter the players you are trading for:")?;
        let acquired = self.prompt_side(&mut taken)?;
        writeln!(self.output, "\nEnter the players you are trading away:")?;
        let departed = self.prompt_side(&mut taken)?;

        info!(
            "evaluating trade: {:?} for {:?} at week {}",
            acquired.players, departed.players, current_week
        );
        let report = TradeReport::build(&evaluator, self.store, &mut roster, &acquired, &departed)?;
        Ok(report)
    }

    pub fn prompt_week(&mut self) -> Result<u8, SessionError> {
        self.prompt("Enter the current week (1-17): ", input::parse_week)
    }

    /// Ask for the current count at every position, in display order.
    pub fn prompt_roster(&mut self, ideal: IdealRoster) -> Result<Roster, SessionError> {
        let mut roster = Roster::new(ideal);
        for pos in Position::DISPLAY_ORDER {
            let question = format!("How many {pos} players do you currently have? ");
            let count = self.prompt(&question, input::parse_roster_count)?;
            roster.set_count(pos, count);
        }
        Ok(roster)
    }

    /// Ask for one side of the trade. Names already in `taken` are refused
    /// and accepted names are added to it.
    pub fn prompt_side(&mut self, taken: &mut HashSet<String>) -> Result<TradeSide, SessionError> {
        let count = self.prompt(
            "How many players do you want to input? (Max 5) ",
            input::parse_player_count,
        )?;

        let store = self.store;
        let mut side = TradeSide {
            players: Vec::with_capacity(count),
            risks: InjuryRisks::new(),
        };
        for _ in 0..count {
            let name = self.prompt("Enter player's full name (First Last): ", |raw| {
                let name = input::validate_player_name(raw, store)?;
                if taken.contains(&name) {
                    return Err(InputError::DuplicatePlayer(name));
                }
                Ok(name)
            })?;
            let question = format!(
                "How likely do you think {name} will get injured? \
                 (1-10, where 10 means currently injured): "
            );
            let rating = self.prompt(&question, input::parse_injury_rating)?;

            taken.insert(name.clone());
            side.risks.insert_rating(name.clone(), rating);
            side.players.push(name);
        }
        Ok(side)
    }

    /// Ask `question` until `parse` accepts the answer.
    fn prompt<T>(
        &mut self,
        question: &str,
        mut parse: impl FnMut(&str) -> Result<T, InputError>,
    ) -> Result<T, SessionError> {
        loop {
            write!(self.output, "{question}")?;
            self.output.flush()?;
            let line = self.read_line()?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("rejected input {:?}: {}", line, e);
                    writeln!(self.output, "{e}")?;
                }
            }
        }
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SessionError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableRow;
    use std::collections::HashMap;

    fn store() -> ReferenceStore {
        ReferenceStore::from_tables(
            vec![
                (Position::Quarterback, vec![TableRow::new("Josh Allen", "BUF", 300.0)]),
                (Position::RunningBack, vec![TableRow::new("Saquon Barkley", "PHI", 250.0)]),
            ],
            vec![
                (Position::Quarterback, vec![TableRow::new("Josh Allen", "", 350.0)]),
                (Position::RunningBack, vec![TableRow::new("Saquon Barkley", "", 200.0)]),
            ],
            &HashMap::new(),
        )
    }

    fn run_prompt<T>(
        script: &str,
        f: impl FnOnce(&mut Session<'_, &[u8], &mut Vec<u8>>) -> Result<T, SessionError>,
    ) -> (Result<T, SessionError>, String) {
        let store = store();
        let mut out = Vec::new();
        let result = {
            let mut session = Session::new(&store, script.as_bytes(), &mut out);
            f(&mut session)
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn week_reprompts_until_valid() {
        let (result, out) = run_prompt("abc\n0\n18\n7\n", |s| s.prompt_week());
        assert_eq!(result.unwrap(), 7);
        assert!(out.contains("Please enter a valid number."));
        assert_eq!(out.matches("Please enter a number between 1 and 17.").count(), 2);
    }

    #[test]
    fn roster_prompts_every_position() {
        let (result, out) = run_prompt("2\n-1\n4\n6\n1\n2\n1\n", |s| {
            s.prompt_roster(IdealRoster::default())
        });
        let roster = result.unwrap();
        assert_eq!(roster.count(Position::Quarterback), 2);
        assert_eq!(roster.count(Position::RunningBack), 4);
        assert_eq!(roster.count(Position::Kicker), 1);
        assert!(out.contains("How many DST players do you currently have?"));
        assert!(out.contains("Please enter a number of at least 0."));
    }

    #[test]
    fn oversized_roster_count_reprompts() {
        let (result, out) = run_prompt("0\n2147483647\n5\n0\n0\n0\n0\n", |s| {
            s.prompt_roster(IdealRoster::default())
        });
        let mut roster = result.unwrap();
        assert_eq!(roster.count(Position::RunningBack), 5);
        assert!(out.contains("Please enter a number between 0 and 255."));

        roster.apply_trade(&["Saquon Barkley"], &[], &store()).unwrap();
        assert_eq!(roster.count(Position::RunningBack), 6);
    }

    #[test]
    fn side_normalizes_names_and_ratings() {
        let (result, out) = run_prompt("9\n2\ntom brady\njosh allen\n4\nSAQUON BARKLEY\n10\n", |s| {
            s.prompt_side(&mut HashSet::new())
        });
        let side = result.unwrap();
        assert_eq!(side.players, vec!["Josh Allen", "Saquon Barkley"]);
        assert!((side.risks.get("Josh Allen") - 0.4).abs() < 1e-9);
        assert!((side.risks.get("Saquon Barkley") - 1.0).abs() < 1e-9);
        assert!(out.contains("Please enter a number between 1 and 5."));
        assert!(out.contains("Tom Brady not found in the database."));
    }

    #[test]
    fn side_refuses_names_already_in_trade() {
        let mut taken = HashSet::new();
        taken.insert("Josh Allen".to_string());
        let (result, out) = run_prompt("1\njosh allen\nsaquon barkley\n3\n", |s| {
            s.prompt_side(&mut taken)
        });
        let side = result.unwrap();
        assert_eq!(side.players, vec!["Saquon Barkley"]);
        assert!(out.contains("Josh Allen is already part of this trade."));
        assert!(taken.contains("Saquon Barkley"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let (result, _) = run_prompt("", |s| s.prompt_week());
        assert!(matches!(result, Err(SessionError::InputClosed)));
    }

    #[test]
    fn crlf_line_endings_accepted() {
        let (result, _) = run_prompt("5\r\n", |s| s.prompt_week());
        assert_eq!(result.unwrap(), 5);
    }
}
