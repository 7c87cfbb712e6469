use crate::figure::{Arc, Figure, Rgb, Shape};

pub const PENALTY_AREA_DEPTH: f64 = 16.5;
pub const GOAL_AREA_DEPTH: f64 = 5.5;
pub const GOAL_AREA_HALF_WIDTH: f64 = 5.5;
pub const CENTRE_CIRCLE_RADIUS: f64 = 9.15;
pub const PENALTY_SPOT_DISTANCE: f64 = 11.0;
pub const SPOT_RADIUS: f64 = 0.8;
pub const VIEW_PADDING: f64 = 5.0;

// Calibrated so only the part of each arc outside the penalty area is drawn.
pub const LEFT_ARC_DEGREES: (f64, f64) = (308.0, 52.0);
pub const RIGHT_ARC_DEGREES: (f64, f64) = (128.0, 232.0);

const LINE_COLOR: Rgb = Rgb::BLACK;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchDims {
    pub length: f64,
    pub width: f64,
}

impl Default for PitchDims {
    fn default() -> Self {
        Self {
            length: 105.0,
            width: 68.0,
        }
    }
}

impl PitchDims {
    pub fn x_bounds(&self) -> [f64; 2] {
        [-VIEW_PADDING, self.length + VIEW_PADDING]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        [-VIEW_PADDING, self.width + VIEW_PADDING]
    }
}

/// Rescales API percentages onto the pitch. Out-of-range input is passed through.
pub fn normalize(x_pct: f64, y_pct: f64, dims: PitchDims) -> (f64, f64) {
    (x_pct * dims.length / 100.0, y_pct * dims.width / 100.0)
}

pub fn draw_pitch(figure: &mut Figure, dims: PitchDims) {
    let length = dims.length;
    let width = dims.width;
    let mid_y = width / 2.0;

    figure.push(polyline(&[
        (0.0, 0.0),
        (0.0, width),
        (length, width),
        (length, 0.0),
        (0.0, 0.0),
    ]));

    let box_low = PENALTY_AREA_DEPTH;
    let box_high = width - PENALTY_AREA_DEPTH;
    figure.push(rectangle(0.0, PENALTY_AREA_DEPTH, box_low, box_high));
    figure.push(rectangle(
        length - PENALTY_AREA_DEPTH,
        length,
        box_low,
        box_high,
    ));

    let goal_low = mid_y - GOAL_AREA_HALF_WIDTH;
    let goal_high = mid_y + GOAL_AREA_HALF_WIDTH;
    figure.push(rectangle(0.0, GOAL_AREA_DEPTH, goal_low, goal_high));
    figure.push(rectangle(
        length - GOAL_AREA_DEPTH,
        length,
        goal_low,
        goal_high,
    ));

    let centre = (length / 2.0, mid_y);
    figure.push(Shape::Circle {
        center: centre,
        radius: CENTRE_CIRCLE_RADIUS,
        color: LINE_COLOR,
        filled: false,
    });
    figure.push(spot(centre));

    let left_spot = (PENALTY_SPOT_DISTANCE, mid_y);
    let right_spot = (length - PENALTY_SPOT_DISTANCE, mid_y);
    figure.push(spot(left_spot));
    figure.push(spot(right_spot));

    figure.push(Shape::Arc(Arc {
        center: left_spot,
        radius: CENTRE_CIRCLE_RADIUS,
        theta1: LEFT_ARC_DEGREES.0,
        theta2: LEFT_ARC_DEGREES.1,
        color: LINE_COLOR,
    }));
    figure.push(Shape::Arc(Arc {
        center: right_spot,
        radius: CENTRE_CIRCLE_RADIUS,
        theta1: RIGHT_ARC_DEGREES.0,
        theta2: RIGHT_ARC_DEGREES.1,
        color: LINE_COLOR,
    }));

    figure.x_bounds = dims.x_bounds();
    figure.y_bounds = dims.y_bounds();
    figure.background = Rgb::WHITE;
    figure.axes_visible = false;
}

fn polyline(points: &[(f64, f64)]) -> Shape {
    Shape::Polyline {
        points: points.to_vec(),
        color: LINE_COLOR,
    }
}

fn rectangle(x0: f64, x1: f64, y0: f64, y1: f64) -> Shape {
    polyline(&[(x1, y1), (x1, y0), (x0, y0), (x0, y1), (x1, y1)])
}

fn spot(center: (f64, f64)) -> Shape {
    Shape::Circle {
        center,
        radius: SPOT_RADIUS,
        color: LINE_COLOR,
        filled: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_stays_inside_padded_view() {
        let dims = PitchDims::default();
        let [x_min, x_max] = dims.x_bounds();
        let [y_min, y_max] = dims.y_bounds();
        for x in (0..=100).step_by(5) {
            for y in (0..=100).step_by(5) {
                let (px, py) = normalize(x as f64, y as f64, dims);
                assert!(px >= x_min && px <= x_max, "x={x} -> {px}");
                assert!(py >= y_min && py <= y_max, "y={y} -> {py}");
            }
        }
    }

    #[test]
    fn normalize_is_linear_and_unclamped() {
        let dims = PitchDims::default();
        assert_eq!(normalize(50.0, 50.0, dims), (52.5, 34.0));
        assert_eq!(normalize(100.0, 0.0, dims), (105.0, 0.0));
        let (x, y) = normalize(120.0, -10.0, dims);
        assert!((x - 126.0).abs() < 1e-9);
        assert!((y + 6.8).abs() < 1e-9);
    }

    #[test]
    fn draw_pitch_sets_view_and_markings() {
        let mut figure = Figure::default();
        draw_pitch(&mut figure, PitchDims::default());

        assert_eq!(figure.x_bounds, [-5.0, 110.0]);
        assert_eq!(figure.y_bounds, [-5.0, 73.0]);
        assert!(!figure.axes_visible);
        assert_eq!(figure.background, Rgb::WHITE);

        let polylines = figure
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Polyline { .. }))
            .count();
        let spots = figure
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle { filled: true, .. }))
            .count();
        let arcs: Vec<&Arc> = figure
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Arc(arc) => Some(arc),
                _ => None,
            })
            .collect();
        assert_eq!(polylines, 5);
        assert_eq!(spots, 3);
        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].center, (11.0, 34.0));
        assert_eq!(arcs[1].center, (94.0, 34.0));
        assert!(figure.markers().next().is_none());
    }

    #[test]
    fn penalty_arcs_stay_outside_the_box() {
        let mut figure = Figure::default();
        draw_pitch(&mut figure, PitchDims::default());
        for shape in &figure.shapes {
            let Shape::Arc(arc) = shape else {
                continue;
            };
            let left = arc.center.0 < 50.0;
            for (x, _) in arc.points(32) {
                if left {
                    assert!(x >= PENALTY_AREA_DEPTH - 0.2, "left arc point {x}");
                } else {
                    assert!(x <= 105.0 - PENALTY_AREA_DEPTH + 0.2, "right arc point {x}");
                }
            }
        }
    }
}
