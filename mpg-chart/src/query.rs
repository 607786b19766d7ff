//! Filter state → record source query
//!
//! The serialized form is canonical: positions are listed in A, M, D, G order
//! regardless of how they were selected, so identical selections always
//! produce identical queries.

use crate::filter::FilterState;
use std::fmt;

pub const POSITION_KEY: &str = "position";
pub const RANKING_CRITERIA_KEY: &str = "ranking_criteria";
pub const TOP_NUMBER_KEY: &str = "top_number";

/// Ordered key/value query parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `key=value` pairs joined by `&`
    ///
    /// Values are drawn from field names, position codes and digits, so no
    /// percent-encoding is applied here.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Build the query selecting the records for `state`
///
/// An empty position list means "all positions" to the record source.
pub fn serialize(state: &FilterState) -> QueryParams {
    let positions = state
        .positions()
        .iter()
        .map(|p| p.code())
        .collect::<Vec<_>>()
        .join(",");

    QueryParams {
        pairs: vec![
            (POSITION_KEY, positions),
            (RANKING_CRITERIA_KEY, state.ranking_criterion().as_str().to_string()),
            (TOP_NUMBER_KEY, state.limit().to_string()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_example_selection() {
        let state = FilterState::new()
            .set_positions(["A", "M"])
            .unwrap()
            .set_ranking_criterion("quotation")
            .unwrap()
            .set_limit(5)
            .unwrap();

        let query = serialize(&state);
        assert_eq!(
            query.to_query_string(),
            "position=A,M&ranking_criteria=quotation&top_number=5"
        );
    }

    #[test]
    fn test_serialize_defaults_has_empty_position() {
        let query = serialize(&FilterState::new());
        assert_eq!(query.get(POSITION_KEY), Some(""));
        assert_eq!(query.get(RANKING_CRITERIA_KEY), Some("averagePoints"));
        assert_eq!(query.get(TOP_NUMBER_KEY), Some("10"));
    }

    #[test]
    fn test_serialize_independent_of_selection_order() {
        let a = FilterState::new().set_positions(["G", "D", "A"]).unwrap();
        let b = FilterState::new().set_positions(["A", "G", "D", "A"]).unwrap();
        assert_eq!(serialize(&a), serialize(&b));
        assert_eq!(serialize(&a).get(POSITION_KEY), Some("A,D,G"));
    }

    #[test]
    fn test_axes_do_not_affect_query() {
        let base = FilterState::new();
        let moved = base
            .clone()
            .set_axis_x("participation")
            .unwrap()
            .set_axis_y("quotation")
            .unwrap();
        assert_eq!(serialize(&base), serialize(&moved));
    }
}
