use serde::Serialize;

use super::geometry::Point;

/// Drawable slice as seen by the label engine. Angles are in radians,
/// measured clockwise from the positive x axis (canvas orientation).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ArcElement {
    pub x: f32,
    pub y: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl ArcElement {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn mid_angle(&self) -> f32 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// Stable identifier of one chart session in the engine's side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChartId(pub u64);
