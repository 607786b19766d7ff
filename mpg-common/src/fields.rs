//! Player record vocabulary
//!
//! Field names and position codes understood by the `top_players` record
//! source. Both the filter layer and the projector speak in these types so an
//! unknown column can never reach a query or an axis.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record attribute holding the display name of a player
pub const PLAYER_FULL_NAME: &str = "playerFullName";

/// Numeric player attribute selectable as ranking criterion or plot axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerField {
    /// Goals scored over the season
    TotalGoals,
    /// Mean MPG points per match
    AveragePoints,
    /// Mean match rating
    AverageRating,
    /// Market quotation
    Quotation,
    /// Share of matches played, in percent
    Participation,
}

impl PlayerField {
    /// All selectable fields, in menu order
    pub const ALL: [PlayerField; 5] = [
        PlayerField::TotalGoals,
        PlayerField::AveragePoints,
        PlayerField::AverageRating,
        PlayerField::Quotation,
        PlayerField::Participation,
    ];

    /// Attribute name as it appears in records and queries
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerField::TotalGoals => "totalGoals",
            PlayerField::AveragePoints => "averagePoints",
            PlayerField::AverageRating => "averageRating",
            PlayerField::Quotation => "quotation",
            PlayerField::Participation => "participation",
        }
    }
}

impl fmt::Display for PlayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlayerField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown player field '{}'", s)))
    }
}

/// Playing position code
///
/// Declaration order is the canonical order used when positions are listed
/// in a query (A, M, D, G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    /// Forward ("A" for attaquant)
    #[serde(rename = "A")]
    Forward,
    /// Midfielder
    #[serde(rename = "M")]
    Midfielder,
    /// Defender
    #[serde(rename = "D")]
    Defender,
    /// Goalkeeper
    #[serde(rename = "G")]
    Goalkeeper,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Forward,
        Position::Midfielder,
        Position::Defender,
        Position::Goalkeeper,
    ];

    /// Single-letter code sent to the record source
    pub fn code(&self) -> &'static str {
        match self {
            Position::Forward => "A",
            Position::Midfielder => "M",
            Position::Defender => "D",
            Position::Goalkeeper => "G",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Position::ALL
            .iter()
            .copied()
            .find(|position| position.code() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown position code '{}'", s)))
    }
}
