//! Records → chart-ready scatter dataset
//!
//! Each record becomes one series holding a single point, so every player
//! gets its own legend entry and color. Records lacking a plotted attribute
//! are skipped individually; a projection never fails as a whole.

use crate::record::{FieldValue, Record};
use mpg_common::{ColorScheme, PlayerField};
use rand::Rng;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// 24-bit RGB color, rendered as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbHex(u32);

impl RgbHex {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
    }

    /// Uniformly sampled color over the full 24-bit range
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..=0xFF_FFFF))
    }

    /// Color fixed by the label text
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        Self::new(digest[0], digest[1], digest[2])
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RgbHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl Serialize for RgbHex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One plotted entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub label: String,
    pub color: RgbHex,
    pub point: Point,
}

/// Ordered series, in record order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Dataset(Vec<PlotSeries>);

impl Dataset {
    pub fn series(&self) -> &[PlotSeries] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlotSeries> {
        self.0.iter()
    }
}

impl FromIterator<PlotSeries> for Dataset {
    fn from_iter<I: IntoIterator<Item = PlotSeries>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// Attribute not present in the record
    Absent,
    /// Attribute present but holds text
    NotNumeric,
}

/// A record that could not be plotted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Record {index} has no numeric '{field}' ({reason:?})")]
pub struct MissingFieldError {
    /// Position of the record in the input
    pub index: usize,
    pub field: PlayerField,
    pub reason: MissingReason,
}

/// Result of one projection pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub dataset: Dataset,
    pub skipped: Vec<MissingFieldError>,
}

impl Projection {
    /// Every input record was dropped
    pub fn all_dropped(&self) -> bool {
        self.dataset.is_empty() && !self.skipped.is_empty()
    }
}

/// Dataset builder for a given color scheme
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    scheme: ColorScheme,
}

impl Projector {
    pub fn new(scheme: ColorScheme) -> Self {
        Self { scheme }
    }

    /// Project with the thread-local RNG
    pub fn project(&self, records: &[Record], axis_x: PlayerField, axis_y: PlayerField) -> Projection {
        self.project_with(records, axis_x, axis_y, &mut rand::thread_rng())
    }

    /// Project drawing random colors from `rng`
    pub fn project_with<R: Rng>(
        &self,
        records: &[Record],
        axis_x: PlayerField,
        axis_y: PlayerField,
        rng: &mut R,
    ) -> Projection {
        let mut projection = Projection::default();
        let mut series = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let point = read_axis(record, index, axis_x).and_then(|x| {
                read_axis(record, index, axis_y).map(|y| Point { x, y })
            });

            match point {
                Ok(point) => {
                    let label = record
                        .full_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("record {}", index + 1));
                    let color = match self.scheme {
                        ColorScheme::Random => RgbHex::random(rng),
                        ColorScheme::LabelHash => RgbHex::from_label(&label),
                    };
                    series.push(PlotSeries { label, color, point });
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping record");
                    projection.skipped.push(e);
                }
            }
        }

        projection.dataset = Dataset(series);
        projection
    }
}

/// Project with random colors
pub fn project(records: &[Record], axis_x: PlayerField, axis_y: PlayerField) -> Projection {
    Projector::default().project(records, axis_x, axis_y)
}

fn read_axis(record: &Record, index: usize, field: PlayerField) -> Result<f64, MissingFieldError> {
    match record.field(field) {
        Some(FieldValue::Number(n)) => Ok(*n),
        Some(FieldValue::Text(_)) => Err(MissingFieldError {
            index,
            field,
            reason: MissingReason::NotNumeric,
        }),
        None => Err(MissingFieldError {
            index,
            field,
            reason: MissingReason::Absent,
        }),
    }
}
