use serde::Serialize;

use super::geometry::Point;
use super::types::ArcElement;

/// Where a label hangs off its arc.
///
/// `anchor` sits on the outer edge at the bisecting angle, `copy` is the
/// connector's bend point `d` away from the arc center, and `(x, y)` starts
/// at `copy` but may be pushed horizontally by collision offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Center {
    pub x: f32,
    pub y: f32,
    pub d: f32,
    pub anchor: Point,
    pub copy: Point,
}

impl Center {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub fn center(arc: &ArcElement, stretch: f32) -> Center {
    let angle = arc.mid_angle();
    let (sin, cos) = angle.sin_cos();
    let d = arc.outer_radius;
    let stretched = d + stretch;
    let copy = Point::new(arc.x + cos * stretched, arc.y + sin * stretched);
    Center {
        x: copy.x,
        y: copy.y,
        d: stretched,
        anchor: Point::new(arc.x + cos * d, arc.y + sin * d),
        copy,
    }
}

/// Re-derive the center `distance` further along the same ray, keeping the anchor.
pub fn move_from_anchor(center: &Center, arc: &ArcElement, distance: f32) -> Center {
    let (sin, cos) = arc.mid_angle().sin_cos();
    let d = center.d + distance;
    let copy = Point::new(arc.x + cos * d, arc.y + sin * d);
    Center {
        x: copy.x,
        y: copy.y,
        d,
        anchor: center.anchor,
        copy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn arc(start: f32, end: f32) -> ArcElement {
        ArcElement {
            x: 100.0,
            y: 100.0,
            start_angle: start,
            end_angle: end,
            inner_radius: 0.0,
            outer_radius: 50.0,
        }
    }

    #[test]
    fn center_on_positive_x_axis() {
        let c = center(&arc(-0.5, 0.5), 10.0);
        assert!((c.anchor.x - 150.0).abs() < 1e-4);
        assert!((c.anchor.y - 100.0).abs() < 1e-4);
        assert!((c.x - 160.0).abs() < 1e-4);
        assert_eq!(c.copy, c.point());
        assert_eq!(c.d, 60.0);
    }

    #[test]
    fn center_points_down_for_quarter_turn() {
        let c = center(&arc(0.0, PI), 0.0);
        assert!((c.x - 100.0).abs() < 1e-3);
        assert!((c.y - 150.0).abs() < 1e-3);
    }

    #[test]
    fn move_from_anchor_keeps_anchor_and_extends_ray() {
        let slice = arc(-0.5, 0.5);
        let c = center(&slice, 10.0);
        let moved = move_from_anchor(&c, &slice, 15.0);
        assert_eq!(moved.anchor, c.anchor);
        assert_eq!(moved.d, 75.0);
        assert!((moved.x - 175.0).abs() < 1e-4);
    }
}
