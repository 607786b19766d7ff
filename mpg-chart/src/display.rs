//! Static display configuration handed to the renderer with each dataset

use crate::projector::Dataset;
use mpg_common::PlayerField;
use serde::{Serialize, Serializer};
use std::sync::Arc;

pub const CHART_TITLE: &str = "Scatter Plot Example";
pub const POINT_RADIUS: u32 = 5;
pub const BORDER_WIDTH: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointStyle {
    Circle,
}

/// Renderer settings for the scatter plot
///
/// Axis titles follow the plotted fields; everything else is fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDisplay {
    pub title: &'static str,
    pub x_axis_title: PlayerField,
    pub y_axis_title: PlayerField,
    pub legend_visible: bool,
    pub point_style: PointStyle,
    pub point_radius: u32,
    pub border_width: u32,
}

impl ChartDisplay {
    pub fn for_axes(axis_x: PlayerField, axis_y: PlayerField) -> Self {
        Self {
            title: CHART_TITLE,
            x_axis_title: axis_x,
            y_axis_title: axis_y,
            legend_visible: true,
            point_style: PointStyle::Circle,
            point_radius: POINT_RADIUS,
            border_width: BORDER_WIDTH,
        }
    }
}

/// A published dataset together with how to draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    #[serde(serialize_with = "serialize_shared")]
    pub dataset: Arc<Dataset>,
    pub display: ChartDisplay,
}

fn serialize_shared<S: Serializer>(dataset: &Arc<Dataset>, serializer: S) -> Result<S::Ok, S::Error> {
    dataset.as_ref().serialize(serializer)
}
