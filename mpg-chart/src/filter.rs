//! Filter selection driving both the query and the plotted axes
//!
//! Updates are pure: each `set_*` consumes the current state and returns a
//! validated replacement, or an error leaving the caller's previous state
//! untouched.

use mpg_common::{PlayerField, Position};
use std::collections::BTreeSet;
use thiserror::Error;

/// Default number of top records requested
pub const DEFAULT_LIMIT: u32 = 10;

/// Rejected filter update
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFilterError {
    /// Field name outside the known field set
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Position code outside {A, M, D, G}
    #[error("Unknown position code: {0}")]
    UnknownPosition(String),

    /// Limit below 1 or beyond u32 range
    #[error("Invalid limit {0}: must be a positive integer")]
    InvalidLimit(i64),
}

/// Current user selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    positions: BTreeSet<Position>,
    ranking_criterion: PlayerField,
    axis_x: PlayerField,
    axis_y: PlayerField,
    limit: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            positions: BTreeSet::new(),
            ranking_criterion: PlayerField::AveragePoints,
            axis_x: PlayerField::TotalGoals,
            axis_y: PlayerField::AverageRating,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterState {
    /// State with the default selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected positions in canonical order; empty means all positions
    pub fn positions(&self) -> &BTreeSet<Position> {
        &self.positions
    }

    pub fn ranking_criterion(&self) -> PlayerField {
        self.ranking_criterion
    }

    pub fn axis_x(&self) -> PlayerField {
        self.axis_x
    }

    pub fn axis_y(&self) -> PlayerField {
        self.axis_y
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Replace the position selection
    ///
    /// Duplicate codes collapse. Fails on the first unknown code.
    pub fn set_positions<I, S>(self, codes: I) -> Result<Self, InvalidFilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = codes
            .into_iter()
            .map(|code| {
                let code = code.as_ref();
                code.parse::<Position>()
                    .map_err(|_| InvalidFilterError::UnknownPosition(code.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self { positions, ..self })
    }

    pub fn set_ranking_criterion(self, field: &str) -> Result<Self, InvalidFilterError> {
        Ok(Self {
            ranking_criterion: parse_field(field)?,
            ..self
        })
    }

    pub fn set_axis_x(self, field: &str) -> Result<Self, InvalidFilterError> {
        Ok(Self {
            axis_x: parse_field(field)?,
            ..self
        })
    }

    pub fn set_axis_y(self, field: &str) -> Result<Self, InvalidFilterError> {
        Ok(Self {
            axis_y: parse_field(field)?,
            ..self
        })
    }

    pub fn set_limit(self, n: i64) -> Result<Self, InvalidFilterError> {
        let limit = u32::try_from(n)
            .ok()
            .filter(|&limit| limit >= 1)
            .ok_or(InvalidFilterError::InvalidLimit(n))?;

        Ok(Self { limit, ..self })
    }

    /// True when `other` selects a different record set from the backend
    pub fn selects_different_records(&self, other: &FilterState) -> bool {
        self.positions != other.positions
            || self.ranking_criterion != other.ranking_criterion
            || self.limit != other.limit
    }

    /// True when `other` plots different attributes
    pub fn plots_different_axes(&self, other: &FilterState) -> bool {
        self.axis_x != other.axis_x || self.axis_y != other.axis_y
    }
}

fn parse_field(field: &str) -> Result<PlayerField, InvalidFilterError> {
    field
        .parse::<PlayerField>()
        .map_err(|_| InvalidFilterError::UnknownField(field.to_string()))
}
