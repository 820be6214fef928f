// Validation of user-typed values.
//
// Every function here is pure: it takes the raw line and returns the parsed
// value or an `InputError` describing what to fix. Re-prompting is the
// caller's job (see `session`).

use thiserror::Error;

use crate::roster::MAX_POSITION_COUNT;
use crate::store::ReferenceStore;

pub const MIN_WEEK: u8 = 1;
pub const MAX_WEEK: u8 = 17;
pub const MAX_PLAYERS_PER_SIDE: usize = 5;
pub const MIN_INJURY_RATING: u8 = 1;
pub const MAX_INJURY_RATING: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a valid number.")]
    NotANumber,

    #[error("Please enter a number between {min} and {max}.")]
    OutOfRange { min: i64, max: i64 },

    #[error("Please enter a number of at least {min}.")]
    BelowMinimum { min: i64 },

    #[error("Invalid player name format. Please use 'First Last' format.")]
    BadNameFormat,

    #[error("{0} not found in the database.")]
    UnknownPlayer(String),

    #[error("{0} is already part of this trade.")]
    DuplicatePlayer(String),
}

fn parse_int(raw: &str) -> Result<i64, InputError> {
    raw.trim().parse::<i64>().map_err(|_| InputError::NotANumber)
}

fn parse_in_range(raw: &str, min: i64, max: i64) -> Result<i64, InputError> {
    let n = parse_int(raw)?;
    if (min..=max).contains(&n) {
        Ok(n)
    } else {
        Err(InputError::OutOfRange { min, max })
    }
}

/// Current NFL week, 1 through 17.
pub fn parse_week(raw: &str) -> Result<u8, InputError> {
    parse_in_range(raw, i64::from(MIN_WEEK), i64::from(MAX_WEEK)).map(|n| n as u8)
}

/// Number of players currently rostered at a position, 0 through
/// `MAX_POSITION_COUNT`.
pub fn parse_roster_count(raw: &str) -> Result<i32, InputError> {
    let n = parse_int(raw)?;
    if n < 0 {
        return Err(InputError::BelowMinimum { min: 0 });
    }
    if n > i64::from(MAX_POSITION_COUNT) {
        return Err(InputError::OutOfRange {
            min: 0,
            max: i64::from(MAX_POSITION_COUNT),
        });
    }
    Ok(n as i32)
}

/// How many players go on one side of the trade, 1 through 5.
pub fn parse_player_count(raw: &str) -> Result<usize, InputError> {
    parse_in_range(raw, 1, MAX_PLAYERS_PER_SIDE as i64).map(|n| n as usize)
}

/// Injury likelihood rating, 1 through 10 (10 = currently injured).
pub fn parse_injury_rating(raw: &str) -> Result<u8, InputError> {
    parse_in_range(
        raw,
        i64::from(MIN_INJURY_RATING),
        i64::from(MAX_INJURY_RATING),
    )
    .map(|n| n as u8)
}

/// Capitalize the first letter of every run of letters and lowercase the
/// rest: "jA'marr CHASE" -> "Ja'Marr Chase".
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// One or more words separated by single spaces, each an ASCII uppercase
/// letter followed by one or more ASCII lowercase letters.
pub fn is_valid_player_name(name: &str) -> bool {
    !name.is_empty()
        && name.split(' ').all(|word| {
            let mut chars = word.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
                && word.len() > 1
                && chars.all(|c| c.is_ascii_lowercase())
        })
}

/// Normalize a typed name and check it against the projections table.
/// Returns the name as stored.
pub fn validate_player_name(raw: &str, store: &ReferenceStore) -> Result<String, InputError> {
    let name = title_case(raw.trim());
    if !is_valid_player_name(&name) {
        return Err(InputError::BadNameFormat);
    }
    if !store.contains_projection(&name) {
        return Err(InputError::UnknownPlayer(name));
    }
    Ok(name)
}
