use std::fmt::Write as _;

/// Figure width used to convert matplotlib-style marker areas (pt²) into pitch units.
const FIGURE_WIDTH_PT: f64 = 720.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    pub fn as_u32(self) -> u32 {
        (u32::from(self.0) << 16) | (u32::from(self.1) << 8) | u32::from(self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerFill {
    Filled,
    Hollow,
}

/// Circular arc drawn counter-clockwise from `theta1` to `theta2` (degrees).
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub center: (f64, f64),
    pub radius: f64,
    pub theta1: f64,
    pub theta2: f64,
    pub color: Rgb,
}

impl Arc {
    /// Counter-clockwise sweep in degrees, wrapping through 0°.
    pub fn sweep(&self) -> f64 {
        let sweep = (self.theta2 - self.theta1).rem_euclid(360.0);
        if sweep == 0.0 { 360.0 } else { sweep }
    }

    pub fn points(&self, segments: usize) -> Vec<(f64, f64)> {
        let segments = segments.max(1);
        let step = self.sweep() / segments as f64;
        (0..=segments)
            .map(|i| {
                let theta = (self.theta1 + step * i as f64).to_radians();
                (
                    self.center.0 + self.radius * theta.cos(),
                    self.center.1 + self.radius * theta.sin(),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polyline {
        points: Vec<(f64, f64)>,
        color: Rgb,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Rgb,
        filled: bool,
    },
    Arc(Arc),
    /// `size` is the marker area in pt², as in a matplotlib scatter.
    Marker {
        x: f64,
        y: f64,
        size: f64,
        color: Rgb,
        fill: MarkerFill,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub background: Rgb,
    pub axes_visible: bool,
    pub shapes: Vec<Shape>,
    pub legend: Vec<LegendEntry>,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            background: Rgb::WHITE,
            axes_visible: true,
            shapes: Vec::new(),
            legend: Vec::new(),
        }
    }
}

/// A marker as it was drawn, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerRef {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Rgb,
    pub fill: MarkerFill,
}

impl Figure {
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn markers(&self) -> impl Iterator<Item = MarkerRef> + '_ {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Marker {
                x,
                y,
                size,
                color,
                fill,
            } => Some(MarkerRef {
                x: *x,
                y: *y,
                size: *size,
                color: *color,
                fill: *fill,
            }),
            _ => None,
        })
    }

    fn units_per_point(&self) -> f64 {
        let span = self.x_bounds[1] - self.x_bounds[0];
        if span <= 0.0 { 0.0 } else { span / FIGURE_WIDTH_PT }
    }

    /// Radius in figure units of a marker whose area is `size` pt².
    pub fn marker_radius(&self, size: f64) -> f64 {
        let radius_pt = (size.max(0.0) / std::f64::consts::PI).sqrt();
        radius_pt * self.units_per_point()
    }

    pub fn to_svg(&self) -> String {
        const SCALE: f64 = 8.0;
        const TITLE_BAND: f64 = 36.0;

        let width = (self.x_bounds[1] - self.x_bounds[0]) * SCALE;
        let height = (self.y_bounds[1] - self.y_bounds[0]) * SCALE;
        let tx = |x: f64| (x - self.x_bounds[0]) * SCALE;
        let ty = |y: f64| TITLE_BAND + (self.y_bounds[1] - y) * SCALE;

        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.1} {h:.1}">"#,
            w = width,
            h = height + TITLE_BAND,
        );
        let _ = writeln!(
            out,
            r#"<rect x="0" y="{TITLE_BAND}" width="{width:.1}" height="{height:.1}" fill="{}"/>"#,
            self.background.hex()
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="24" text-anchor="middle" font-family="sans-serif" font-size="18">{}</text>"#,
            width / 2.0,
            escape_xml(&self.title)
        );

        for shape in &self.shapes {
            match shape {
                Shape::Polyline { points, color } => {
                    let _ = writeln!(
                        out,
                        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
                        svg_points(points, &tx, &ty),
                        color.hex()
                    );
                }
                Shape::Circle {
                    center,
                    radius,
                    color,
                    filled,
                } => {
                    let (fill, stroke) = if *filled {
                        (color.hex(), "none".to_string())
                    } else {
                        ("none".to_string(), color.hex())
                    };
                    let _ = writeln!(
                        out,
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{fill}" stroke="{stroke}" stroke-width="1.5"/>"#,
                        tx(center.0),
                        ty(center.1),
                        radius * SCALE
                    );
                }
                Shape::Arc(arc) => {
                    let _ = writeln!(
                        out,
                        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
                        svg_points(&arc.points(48), &tx, &ty),
                        arc.color.hex()
                    );
                }
                Shape::Marker {
                    x,
                    y,
                    size,
                    color,
                    fill,
                } => {
                    let (fill_attr, stroke) = match fill {
                        MarkerFill::Filled => (color.hex(), "none".to_string()),
                        MarkerFill::Hollow => ("none".to_string(), color.hex()),
                    };
                    let _ = writeln!(
                        out,
                        r#"<circle class="shot" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{fill_attr}" stroke="{stroke}" stroke-width="1.5"/>"#,
                        tx(*x),
                        ty(*y),
                        self.marker_radius(*size) * SCALE
                    );
                }
            }
        }

        for (idx, entry) in self.legend.iter().enumerate() {
            let y = TITLE_BAND + 16.0 + idx as f64 * 20.0;
            let x = width - 170.0;
            let _ = writeln!(
                out,
                r#"<circle cx="{:.1}" cy="{y:.1}" r="6" fill="{}"/><text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="13">{}</text>"#,
                x,
                entry.color.hex(),
                x + 12.0,
                y + 4.0,
                escape_xml(&entry.label)
            );
        }

        out.push_str("</svg>\n");
        out
    }
}

fn svg_points(
    points: &[(f64, f64)],
    tx: &impl Fn(f64) -> f64,
    ty: &impl Fn(f64) -> f64,
) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", tx(*x), ty(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Arc, Figure, LegendEntry, MarkerFill, Rgb, Shape};

    #[test]
    fn hex_formats_palette_colours() {
        assert_eq!(Rgb(0xFF, 0xA5, 0x00).hex(), "#FFA500");
        assert_eq!(Rgb(0x90, 0xEE, 0x90).hex(), "#90EE90");
        assert_eq!(Rgb(0x8A, 0x2B, 0xE2).as_u32(), 0x8A2BE2);
    }

    #[test]
    fn arc_sweep_wraps_through_zero() {
        let arc = Arc {
            center: (11.0, 34.0),
            radius: 9.15,
            theta1: 308.0,
            theta2: 52.0,
            color: Rgb::BLACK,
        };
        assert!((arc.sweep() - 104.0).abs() < 1e-9);

        let points = arc.points(8);
        assert_eq!(points.len(), 9);
        // Every sampled point sits right of the penalty spot.
        assert!(points.iter().all(|(x, _)| *x > 11.0));
    }

    #[test]
    fn svg_escapes_title_and_flips_y() {
        let mut figure = Figure {
            title: "A & B <live>".to_string(),
            x_bounds: [0.0, 10.0],
            y_bounds: [0.0, 10.0],
            ..Figure::default()
        };
        figure.push(Shape::Marker {
            x: 0.0,
            y: 10.0,
            size: 50.0,
            color: Rgb::BLACK,
            fill: MarkerFill::Hollow,
        });
        figure.legend.push(LegendEntry {
            label: "A".to_string(),
            color: Rgb::BLACK,
        });

        let svg = figure.to_svg();
        assert!(svg.contains("A &amp; B &lt;live&gt;"));
        // Top of the view maps to the top edge under the title band.
        assert!(svg.contains(r#"cx="0.00" cy="36.00""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn marker_radius_grows_with_area() {
        let figure = Figure {
            x_bounds: [-5.0, 110.0],
            ..Figure::default()
        };
        assert!(figure.marker_radius(400.0) > figure.marker_radius(50.0));
        assert_eq!(figure.marker_radius(0.0), 0.0);
    }
}
